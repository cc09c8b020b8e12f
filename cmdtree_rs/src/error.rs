//! Error types for route definition, tree construction, and dispatch.
//!
//! Build-time errors (`DefinitionError`, `RouteConflictError`) are fatal:
//! the builder aborts and no partial tree is handed out. Dispatch-time
//! errors (`LookupFailure`, `BindingError`) are plain values returned to
//! the caller; a dispatch failure never terminates the process.

use thiserror::Error;

/// A malformed route or switch definition, detected while building the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// A switch or guard variable contains internal whitespace.
    #[error("switch variable '{variable}' must not contain whitespace")]
    WhitespaceInVariable { variable: String },

    /// A route piece between two separators is empty (doubled `/`).
    #[error("empty segment in route '{route}'")]
    EmptySegment { route: String },

    /// A `:param` or `...rest` marker with no name after it.
    #[error("segment '{piece}' in route '{route}' is missing a name")]
    UnnamedSegment { route: String, piece: String },

    /// A `...rest` segment that is not the final segment of the route.
    #[error("rest segment '...{name}' must be the last segment of route '{route}'")]
    RestNotLast { route: String, name: String },

    /// Two differently named parametric (or rest) segments at one tree position.
    #[error("parametric segment ':{incoming}' conflicts with existing ':{existing}' at the same position")]
    ParamConflict { existing: String, incoming: String },

    /// A guard clause that doesn't parse as `identifier <op> value`.
    #[error("malformed guard clause '[{clause}]': {reason}")]
    MalformedGuard { clause: String, reason: String },

    /// A default value incompatible with its switch declaration, e.g. a
    /// boolean switch defaulting to something other than `true`/`false`.
    #[error("switch '{name}' takes no value, so its default must be 'true' or 'false', not '{value}'")]
    InvalidDefault { name: String, value: String },
}

/// A structural collision while building the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteConflictError {
    /// An alias name already points at a different child of the same parent.
    #[error("alias '{name}' collides with an existing route segment")]
    AliasCollision { name: String },

    /// An alias was requested for the root node, which has no parent to
    /// carry the extra name.
    #[error("the root node cannot be aliased as '{name}'")]
    RootAlias { name: String },

    /// A short or long switch name already declared in the node's visible scope.
    #[error("switch name '{name}' is already declared in this scope")]
    DuplicateSwitch { name: String },
}

/// Path resolution failed for one dispatch. Recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupFailure {
    /// No literal/param/rest chain consumes every token while reaching a
    /// node with at least one registration.
    #[error("no command matches '{path}'")]
    NotFound { path: String },

    /// The path resolved to a node, but every registration's guard was false.
    #[error("no handler accepted '{path}' with the given switches")]
    NoHandlerMatched { path: String },
}

/// Switch binding failed for one dispatch. Recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// Token names a switch not declared anywhere in the node's visible scope.
    #[error("unknown switch '{name}'{}", .suggestion.as_ref().map(|s| format!(". Did you mean: {s}?")).unwrap_or_default())]
    UnknownSwitch {
        name: String,
        suggestion: Option<String>,
    },

    /// A `required` switch in scope was never bound.
    #[error("required switch '{name}' was not supplied")]
    MissingRequiredSwitch { name: String },

    /// A valued switch did not receive the number of values it declares.
    #[error("switch '{name}' expects {expected} value(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A positional token in the switch region that no valued switch consumes.
    #[error("unexpected value '{value}' after switches")]
    UnexpectedValue { value: String },
}

/// Any failure raised during the build phase. Fatal: the builder is
/// abandoned and no tree is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Conflict(#[from] RouteConflictError),
}

/// Any failure surfaced by one dispatch, before the handler runs.
///
/// Handler errors are never wrapped here; `Resolution::invoke` returns the
/// handler's own `Result` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A runtime switch token failed to lex (e.g. whitespace in the variable).
    #[error("bad switch token: {0}")]
    Token(#[from] DefinitionError),

    #[error(transparent)]
    Lookup(#[from] LookupFailure),

    #[error(transparent)]
    Binding(#[from] BindingError),
}
