//! Switch declarations, visible-scope computation, and runtime binding.
//!
//! Every tree node owns a `SwitchRegistry`. A node's *visible scope* is its
//! own declarations plus every ancestor declaration marked `common`; the
//! scope is what runtime tokens resolve against and what the required-switch
//! check runs over.

use std::collections::BTreeMap;

use serde::Serialize;
use strsim::levenshtein;

use crate::error::{BindingError, DefinitionError, RouteConflictError};
use crate::switch::expr::SwitchExpression;

/// Declaration of one CLI switch.
///
/// An empty `value_names` list makes the switch boolean (present/absent).
/// A non-empty list makes it valued: binding consumes exactly that many
/// values, inline (`--name=value`, single value name only) or from the
/// tokens following the switch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SwitchDefinition {
    pub short: Option<String>,
    pub long: Option<String>,
    pub value_names: Vec<String>,
    pub required: bool,
    pub common: bool,
    pub default: Option<String>,
    pub description: Option<String>,
}

impl SwitchDefinition {
    /// Start a declaration from its short and/or long name.
    pub fn named(short: Option<&str>, long: Option<&str>) -> Self {
        Self {
            short: short.map(str::to_string),
            long: long.map(str::to_string),
            ..Self::default()
        }
    }

    /// Add one value name, turning the switch into (or extending) a valued one.
    pub fn value_name(mut self, name: &str) -> Self {
        self.value_names.push(name.to_string());
        self
    }

    /// Binding fails if the switch is absent at dispatch.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Merge this switch into every descendant node's visible scope.
    pub fn common(mut self) -> Self {
        self.common = true;
        self
    }

    /// Value bound when the switch is absent at dispatch.
    pub fn default_value(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    /// True when the switch takes no value.
    pub fn is_boolean(&self) -> bool {
        self.value_names.is_empty()
    }

    /// Canonical name used in bindings and error messages: long, else short.
    pub fn display_name(&self) -> &str {
        self.long
            .as_deref()
            .or(self.short.as_deref())
            .unwrap_or_default()
    }

    /// Check internal consistency of the declaration itself. A boolean
    /// switch binds `Bool`, so its default must spell a boolean.
    pub(crate) fn validate(&self) -> Result<(), DefinitionError> {
        if let Some(default) = &self.default {
            if self.is_boolean() && default != "true" && default != "false" {
                return Err(DefinitionError::InvalidDefault {
                    name: self.display_name().to_string(),
                    value: default.clone(),
                });
            }
        }
        Ok(())
    }

    fn answers_to(&self, name: &str) -> bool {
        self.short.as_deref() == Some(name) || self.long.as_deref() == Some(name)
    }

    fn collides_with(&self, other: &SwitchDefinition) -> Option<String> {
        for name in [&self.short, &self.long].into_iter().flatten() {
            if other.answers_to(name) {
                return Some(name.clone());
            }
        }
        None
    }
}

/// Per-node table of declared switches, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SwitchRegistry {
    entries: Vec<SwitchDefinition>,
}

impl SwitchRegistry {
    /// Append a declaration. Collisions against the rest of the visible
    /// scope are checked by the tree, which knows the ancestors.
    pub(crate) fn declare(&mut self, def: SwitchDefinition) -> Result<(), RouteConflictError> {
        for existing in &self.entries {
            if let Some(name) = def.collides_with(existing) {
                return Err(RouteConflictError::DuplicateSwitch { name });
            }
        }
        self.entries.push(def);
        Ok(())
    }

    pub fn entries(&self) -> &[SwitchDefinition] {
        &self.entries
    }

    /// The declarations descendants inherit.
    pub(crate) fn common_entries(&self) -> impl Iterator<Item = &SwitchDefinition> {
        self.entries.iter().filter(|d| d.common)
    }
}

/// The switches one node can bind: its own plus inherited `common` ones.
///
/// Built per dispatch (or per declaration check) by walking the ancestor
/// chain; entries are ordered ancestors-first so diagnostics read top-down.
#[derive(Debug, Clone, Default)]
pub struct SwitchScope<'a> {
    entries: Vec<&'a SwitchDefinition>,
}

impl<'a> SwitchScope<'a> {
    pub(crate) fn push(&mut self, def: &'a SwitchDefinition) {
        self.entries.push(def);
    }

    pub fn entries(&self) -> &[&'a SwitchDefinition] {
        &self.entries
    }

    pub fn resolve(&self, name: &str) -> Option<&'a SwitchDefinition> {
        self.entries.iter().copied().find(|d| d.answers_to(name))
    }

    /// Did-you-mean lookup over every short and long name in scope
    /// (Levenshtein distance at most 2).
    pub fn suggest(&self, input: &str) -> Option<String> {
        let mut best: Option<(&str, usize)> = None;
        for def in &self.entries {
            for name in [def.short.as_deref(), def.long.as_deref()]
                .into_iter()
                .flatten()
            {
                let distance = levenshtein(input, name);
                if distance <= 2 && best.is_none_or(|(_, d)| distance < d) {
                    best = Some((name, distance));
                }
            }
        }
        best.map(|(name, _)| name.to_string())
    }

    /// Check a new declaration against everything already visible.
    pub(crate) fn check_collision(&self, def: &SwitchDefinition) -> Result<(), RouteConflictError> {
        for existing in &self.entries {
            if let Some(name) = def.collides_with(existing) {
                return Err(RouteConflictError::DuplicateSwitch { name });
            }
        }
        Ok(())
    }
}

/// One token of the switch region of an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchRegionToken {
    /// A flag-prefixed token, lexed (`--level=3` → `level=3`).
    Switch(SwitchExpression),

    /// A positional token following a switch; candidate value for it.
    Value(String),
}

/// The value bound to one switch after a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SwitchValue {
    Bool(bool),
    One(String),
    Many(Vec<String>),
}

/// Resolved switch bindings, keyed by each switch's display name.
pub type SwitchBindings = BTreeMap<String, SwitchValue>;

/// Bind the switch region of one dispatch against a visible scope.
///
/// Each switch token resolves by short or long name. A valued switch
/// consumes its declared number of values; a boolean is present/absent.
/// After consumption, defaults fill in, then every `required` switch must
/// be bound.
pub fn bind_switches(
    scope: &SwitchScope<'_>,
    region: &[SwitchRegionToken],
) -> Result<SwitchBindings, BindingError> {
    let mut bindings = SwitchBindings::new();

    let mut i = 0;
    while i < region.len() {
        match &region[i] {
            SwitchRegionToken::Value(value) => {
                return Err(BindingError::UnexpectedValue {
                    value: value.clone(),
                });
            }
            SwitchRegionToken::Switch(token) => {
                let name = token.variable();
                let Some(def) = scope.resolve(name) else {
                    return Err(BindingError::UnknownSwitch {
                        name: name.to_string(),
                        suggestion: scope.suggest(name),
                    });
                };
                i += 1;

                let arity = def.value_names.len();
                let key = def.display_name().to_string();

                if def.is_boolean() {
                    if token.is_valued_switch() {
                        return Err(BindingError::ArityMismatch {
                            name: key,
                            expected: 0,
                            found: 1,
                        });
                    }
                    bindings.insert(key, SwitchValue::Bool(true));
                    continue;
                }

                if let Some(inline) = token.value() {
                    if arity != 1 {
                        return Err(BindingError::ArityMismatch {
                            name: key,
                            expected: arity,
                            found: 1,
                        });
                    }
                    bindings.insert(key, SwitchValue::One(inline.to_string()));
                    continue;
                }

                let mut values = Vec::with_capacity(arity);
                while values.len() < arity {
                    match region.get(i) {
                        Some(SwitchRegionToken::Value(v)) => {
                            values.push(v.clone());
                            i += 1;
                        }
                        _ => {
                            return Err(BindingError::ArityMismatch {
                                name: key,
                                expected: arity,
                                found: values.len(),
                            });
                        }
                    }
                }
                let value = if arity == 1 {
                    SwitchValue::One(values.pop().unwrap_or_default())
                } else {
                    SwitchValue::Many(values)
                };
                bindings.insert(key, value);
            }
        }
    }

    for def in scope.entries() {
        let key = def.display_name();
        if bindings.contains_key(key) {
            continue;
        }
        if let Some(default) = &def.default {
            let value = if def.is_boolean() {
                SwitchValue::Bool(default == "true")
            } else {
                SwitchValue::One(default.clone())
            };
            bindings.insert(key.to_string(), value);
        } else if def.required {
            return Err(BindingError::MissingRequiredSwitch {
                name: key.to_string(),
            });
        }
    }

    Ok(bindings)
}

// ============================================================================
// Tests
// ============================================================================
