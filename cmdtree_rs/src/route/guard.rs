//! Guards - per-registration predicates over the runtime switch tokens.
//!
//! A route definition may end in one bracketed clause, e.g.
//! `fetch/target[level > "2"]`. The clause attaches to that single handler
//! registration; at dispatch the registrations at the matched node are
//! scanned in registration order and the first whose guard holds wins.

use std::cmp::Ordering;

use crate::error::DefinitionError;
use crate::switch::expr::{SwitchExpression, strip_quotes};
use crate::switch::registry::SwitchScope;

/// Comparison operator inside a guard clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CompareOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Ge => ordering != Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
        }
    }
}

/// Predicate attached to one handler registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// No clause was given; matches every dispatch.
    Always,

    /// `identifier <op> value` - compares the runtime value of one switch
    /// token against a literal.
    Compare {
        variable: String,
        op: CompareOp,
        value: String,
    },
}

impl Guard {
    /// Parse the inside of a bracketed guard clause.
    ///
    /// The identifier obeys the same rules as a switch variable (no
    /// internal whitespace) and the literal gets the same one-layer quote
    /// stripping as a switch value.
    pub fn parse(clause: &str) -> Result<Self, DefinitionError> {
        let malformed = |reason: &str| DefinitionError::MalformedGuard {
            clause: clause.to_string(),
            reason: reason.to_string(),
        };

        let op_start = clause
            .find(['=', '!', '>', '<'])
            .ok_or_else(|| malformed("no comparison operator"))?;

        let rest = &clause[op_start..];
        let (op, op_len) = if rest.starts_with(">=") {
            (CompareOp::Ge, 2)
        } else if rest.starts_with("<=") {
            (CompareOp::Le, 2)
        } else if rest.starts_with("==") {
            (CompareOp::Eq, 2)
        } else if rest.starts_with("!=") {
            (CompareOp::Ne, 2)
        } else if rest.starts_with('>') {
            (CompareOp::Gt, 1)
        } else if rest.starts_with('<') {
            (CompareOp::Lt, 1)
        } else if rest.starts_with('=') {
            (CompareOp::Eq, 1)
        } else {
            return Err(malformed("unrecognized comparison operator"));
        };

        let variable = clause[..op_start].trim().to_string();
        if variable.is_empty() {
            return Err(malformed("missing switch identifier"));
        }
        if variable.chars().any(char::is_whitespace) {
            return Err(DefinitionError::WhitespaceInVariable { variable });
        }

        let value = strip_quotes(clause[op_start + op_len..].trim()).to_string();
        Ok(Guard::Compare {
            variable,
            op,
            value,
        })
    }

    /// Evaluate against the raw switch tokens of one dispatch.
    ///
    /// The guard's variable and each token name are resolved through the
    /// node's visible scope, so `-f` and `--force` denote the same switch
    /// to a guard written with either spelling; names outside the scope
    /// compare as plain text.
    ///
    /// A `Compare` over a switch that was never supplied is false. A bare
    /// token (`--flag`, no inline value) satisfies only the presence check
    /// `= "true"`; ordering comparisons need an inline value. When both
    /// sides parse as integers the comparison is numeric, otherwise
    /// byte-wise on characters.
    pub fn matches(&self, tokens: &[SwitchExpression], scope: &SwitchScope<'_>) -> bool {
        match self {
            Guard::Always => true,
            Guard::Compare {
                variable,
                op,
                value,
            } => {
                let canonical = |name: &str| {
                    scope
                        .resolve(name)
                        .map(|def| def.display_name().to_string())
                        .unwrap_or_else(|| name.to_string())
                };
                let wanted = canonical(variable);
                let Some(token) = tokens.iter().rev().find(|t| canonical(t.variable()) == wanted)
                else {
                    return false;
                };
                let Some(actual) = token.value() else {
                    return *op == CompareOp::Eq && value == "true";
                };
                op.holds(compare_values(actual, value))
            }
        }
    }
}

fn compare_values(left: &str, right: &str) -> Ordering {
    match (left.parse::<i64>(), right.parse::<i64>()) {
        (Ok(l), Ok(r)) => l.cmp(&r),
        _ => left.cmp(right),
    }
}

// ============================================================================
// Tests
// ============================================================================
