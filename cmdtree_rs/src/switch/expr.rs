//! SwitchExpression - lexing and serialization of one `identifier[=value]` token.
//!
//! This is the shared lexer for runtime switch tokens (`--verbose`,
//! `--level=3`) and for the identifier/value halves of a route guard clause.
//! Parsing strips exactly one layer of matching surrounding quotes from the
//! value; `Display` is the inverse and re-quotes only when needed.

use std::fmt;

use crate::error::DefinitionError;

/// One lexed `identifier[=value]` token.
///
/// The distinction between a boolean token (`verbose`) and a valued token
/// with an empty value (`level=`) is preserved: the former has `value ==
/// None`, the latter `value == Some("")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchExpression {
    variable: String,
    value: Option<String>,
}

impl SwitchExpression {
    /// Lex one token. Splits at the first `=`; both halves are trimmed.
    ///
    /// Fails if the trimmed variable contains internal whitespace, which
    /// would make the token ambiguous to re-serialize.
    pub fn parse(input: &str) -> Result<Self, DefinitionError> {
        let (raw_var, raw_value) = match input.find('=') {
            Some(pos) => (&input[..pos], Some(&input[pos + 1..])),
            None => (input, None),
        };

        let variable = raw_var.trim().to_string();
        if variable.chars().any(char::is_whitespace) {
            return Err(DefinitionError::WhitespaceInVariable { variable });
        }

        let value = raw_value.map(|v| strip_quotes(v.trim()).to_string());
        Ok(Self { variable, value })
    }

    /// Build an expression directly, without lexing.
    pub(crate) fn new(variable: impl Into<String>, value: Option<String>) -> Self {
        Self {
            variable: variable.into(),
            value,
        }
    }

    /// The identifier before the `=`.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// The value after the `=`, quotes stripped. `None` when no `=` was present.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// True iff an `=` was present, even when the value is empty.
    pub fn is_valued_switch(&self) -> bool {
        self.value.is_some()
    }
}

impl fmt::Display for SwitchExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            None => write!(f, "{}", self.variable),
            Some(value) => write!(f, "{}={}", self.variable, quote_value(value)),
        }
    }
}

/// Strip exactly one layer of matching surrounding quotes.
///
/// Only applies when both ends carry the same quote character and the
/// string is longer than a single character, so `"` and `'` stay intact.
pub(crate) fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if value.len() > 1 {
        let first = bytes[0];
        let last = bytes[value.len() - 1];
        if first == last && (first == b'\'' || first == b'"') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Re-quote a value for serialization.
///
/// Quoting is needed when the value contains whitespace or would be
/// re-lexed differently (surrounding quote pair). Single quotes are
/// preferred; the other quote character is chosen when the value itself
/// contains single quotes.
fn quote_value(value: &str) -> String {
    let needs_quoting = value.chars().any(char::is_whitespace)
        || strip_quotes(value) != value;
    if !needs_quoting {
        return value.to_string();
    }
    let quote = if value.contains('\'') { '"' } else { '\'' };
    format!("{quote}{value}{quote}")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_variable_has_no_value() {
        let expr = SwitchExpression::parse("verbose").unwrap();
        assert_eq!(expr.variable(), "verbose");
        assert_eq!(expr.value(), None);
        assert!(!expr.is_valued_switch());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let expr = SwitchExpression::parse("  verbose  ").unwrap();
        assert_eq!(expr.variable(), "verbose");
        let expr = SwitchExpression::parse("  level = 3 ").unwrap();
        assert_eq!(expr.variable(), "level");
        assert_eq!(expr.value(), Some("3"));
    }

    #[test]
    fn internal_whitespace_in_variable_fails() {
        assert!(matches!(
            SwitchExpression::parse("two words"),
            Err(DefinitionError::WhitespaceInVariable { .. })
        ));
        // Also when a value is present
        assert!(SwitchExpression::parse("two words=1").is_err());
    }

    #[test]
    fn empty_value_is_still_valued() {
        let expr = SwitchExpression::parse("level=").unwrap();
        assert_eq!(expr.value(), Some(""));
        assert!(expr.is_valued_switch());
    }

    #[test]
    fn matching_quotes_are_stripped_once() {
        let expr = SwitchExpression::parse("msg='hello world'").unwrap();
        assert_eq!(expr.value(), Some("hello world"));
        let expr = SwitchExpression::parse("msg=\"hi\"").unwrap();
        assert_eq!(expr.value(), Some("hi"));
        // Only one layer
        let expr = SwitchExpression::parse("msg=''x''").unwrap();
        assert_eq!(expr.value(), Some("'x'"));
    }

    #[test]
    fn mismatched_or_lone_quotes_survive() {
        let expr = SwitchExpression::parse("msg='hello\"").unwrap();
        assert_eq!(expr.value(), Some("'hello\""));
        let expr = SwitchExpression::parse("msg='").unwrap();
        assert_eq!(expr.value(), Some("'"));
    }

    #[test]
    fn display_round_trips_canonical_forms() {
        for s in ["verbose", "level=3", "msg='hello world'"] {
            let expr = SwitchExpression::parse(s).unwrap();
            assert_eq!(expr.to_string(), s);
        }
    }

    #[test]
    fn reparse_preserves_value() {
        for s in ["a=b c", "a='b c'", "a=", "a=x", "flag"] {
            let first = SwitchExpression::parse(s).unwrap();
            let second = SwitchExpression::parse(&first.to_string()).unwrap();
            assert_eq!(first.value(), second.value());
            assert_eq!(first.variable(), second.variable());
        }
    }

    #[test]
    fn quoting_avoids_embedded_quote_character() {
        let expr = SwitchExpression::new("msg", Some("it's here".to_string()));
        assert_eq!(expr.to_string(), "msg=\"it's here\"");
    }
}
