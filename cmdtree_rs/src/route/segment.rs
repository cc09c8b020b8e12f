//! Route-definition parsing: `fetch/target`, `pkg/:name`, `run/...args`.
//!
//! A route string is `/`-separated. Each piece is classified as a literal,
//! a `:name` parameter, or a `...name` rest capture (final piece only). An
//! optional trailing bracketed clause on the final piece is extracted and
//! handed to the guard grammar instead of being treated as path text.

use crate::error::DefinitionError;
use crate::route::guard::Guard;

/// One classified piece of a route definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matched by string equality against one path token.
    Literal(String),

    /// Matches any single path token and binds it under the given name.
    Param(String),

    /// Matches all remaining path tokens as an ordered sequence.
    /// Legal only as the final segment of a route.
    Rest(String),
}

impl Segment {
    /// The binding name for parametric segments, the text for literals.
    pub fn name(&self) -> &str {
        match self {
            Segment::Literal(text) => text,
            Segment::Param(name) | Segment::Rest(name) => name,
        }
    }
}

/// A fully parsed route definition: ordered segments plus the optional
/// trailing guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRoute {
    pub segments: Vec<Segment>,
    pub guard: Guard,
}

/// Parse one route-definition string.
///
/// A single leading `/` is tolerated; any other empty piece (doubled
/// separator, trailing `/`) is a definition error.
pub fn parse_route(route: &str) -> Result<ParsedRoute, DefinitionError> {
    let (path_part, guard) = split_guard(route)?;

    let trimmed = path_part.strip_prefix('/').unwrap_or(path_part);
    let pieces: Vec<&str> = trimmed.split('/').collect();
    let last = pieces.len() - 1;

    let mut segments = Vec::with_capacity(pieces.len());
    for (i, piece) in pieces.iter().enumerate() {
        segments.push(classify_piece(route, piece, i == last)?);
    }

    Ok(ParsedRoute { segments, guard })
}

/// Split off a trailing `[clause]` from the route string, if present.
fn split_guard(route: &str) -> Result<(&str, Guard), DefinitionError> {
    if !route.ends_with(']') {
        return Ok((route, Guard::Always));
    }
    let Some(open) = route.rfind('[') else {
        return Err(DefinitionError::MalformedGuard {
            clause: route.to_string(),
            reason: "unmatched ']'".to_string(),
        });
    };
    let clause = &route[open + 1..route.len() - 1];
    Ok((&route[..open], Guard::parse(clause)?))
}

fn classify_piece(route: &str, piece: &str, is_last: bool) -> Result<Segment, DefinitionError> {
    if let Some(name) = piece.strip_prefix("...") {
        if name.is_empty() {
            return Err(DefinitionError::UnnamedSegment {
                route: route.to_string(),
                piece: piece.to_string(),
            });
        }
        if !is_last {
            return Err(DefinitionError::RestNotLast {
                route: route.to_string(),
                name: name.to_string(),
            });
        }
        return Ok(Segment::Rest(name.to_string()));
    }

    if let Some(name) = piece.strip_prefix(':') {
        if name.is_empty() {
            return Err(DefinitionError::UnnamedSegment {
                route: route.to_string(),
                piece: piece.to_string(),
            });
        }
        return Ok(Segment::Param(name.to_string()));
    }

    if piece.is_empty() {
        return Err(DefinitionError::EmptySegment {
            route: route.to_string(),
        });
    }
    Ok(Segment::Literal(piece.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::guard::CompareOp;

    #[test]
    fn classifies_literal_param_and_rest() {
        let parsed = parse_route("pkg/:name/...files").unwrap();
        assert_eq!(
            parsed.segments,
            vec![
                Segment::Literal("pkg".to_string()),
                Segment::Param("name".to_string()),
                Segment::Rest("files".to_string()),
            ]
        );
        assert_eq!(parsed.guard, Guard::Always);
    }

    #[test]
    fn tolerates_one_leading_slash() {
        let parsed = parse_route("/fetch/target").unwrap();
        assert_eq!(parsed.segments.len(), 2);
    }

    #[test]
    fn rejects_doubled_separator() {
        assert!(matches!(
            parse_route("a//b"),
            Err(DefinitionError::EmptySegment { .. })
        ));
        assert!(matches!(
            parse_route("a/b/"),
            Err(DefinitionError::EmptySegment { .. })
        ));
    }

    #[test]
    fn rejects_rest_before_end() {
        assert!(matches!(
            parse_route("run/...args/more"),
            Err(DefinitionError::RestNotLast { .. })
        ));
    }

    #[test]
    fn rejects_unnamed_markers() {
        assert!(matches!(
            parse_route("a/:"),
            Err(DefinitionError::UnnamedSegment { .. })
        ));
        assert!(matches!(
            parse_route("a/..."),
            Err(DefinitionError::UnnamedSegment { .. })
        ));
    }

    #[test]
    fn extracts_trailing_guard_clause() {
        let parsed = parse_route("fetch/target[a > \"1\"]").unwrap();
        assert_eq!(
            parsed.segments,
            vec![
                Segment::Literal("fetch".to_string()),
                Segment::Literal("target".to_string()),
            ]
        );
        assert_eq!(
            parsed.guard,
            Guard::Compare {
                variable: "a".to_string(),
                op: CompareOp::Gt,
                value: "1".to_string(),
            }
        );
    }

    #[test]
    fn guard_clause_is_not_a_path_segment() {
        // The bracketed clause must not leak into the segment list even
        // when it contains a slash-free literal that looks like a piece.
        let parsed = parse_route("a[m = \"x\"]").unwrap();
        assert_eq!(parsed.segments, vec![Segment::Literal("a".to_string())]);
    }

    #[test]
    fn unmatched_bracket_is_malformed() {
        assert!(matches!(
            parse_route("a/b]"),
            Err(DefinitionError::MalformedGuard { .. })
        ));
    }
}
