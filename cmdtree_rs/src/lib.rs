//! # cmdtree
//!
//! Path-tree command router. A program declares a hierarchy of command
//! routes - `/`-separated strings with literal, `:param`, and `...rest`
//! segments - attaches CLI switches to any route node, and at run time
//! resolves a raw argument vector to exactly one registered handler.
//!
//! ## Quick start
//!
//! ```rust
//! use cmdtree::{Dispatcher, Invocation, SwitchDefinition, TreeBuilder};
//!
//! fn install(inv: &Invocation) -> Result<String, String> {
//!     Ok(format!("installing {:?}", inv.params.get("name")))
//! }
//!
//! let mut builder: TreeBuilder<fn(&Invocation) -> Result<String, String>> =
//!     TreeBuilder::new();
//! let node = builder.route("pkg/install/:name", install).unwrap();
//! builder
//!     .switch(node, SwitchDefinition::named(Some("v"), Some("verbose")))
//!     .unwrap();
//! let tree = builder.build();
//!
//! let argv: Vec<String> = ["pkg", "install", "serde", "-v"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let out = Dispatcher::new(&tree).dispatch::<String, String>(&argv).unwrap();
//! assert!(out.contains("serde"));
//! ```
//!
//! ## Model
//!
//! - Routes may end in one bracketed guard clause
//!   (`fetch/target[level > "2"]`); multiple registrations at one path are
//!   disambiguated by evaluating guards in registration order.
//! - A switch declared `common` on a node joins every descendant's visible
//!   scope; `required` switches must be bound (or carry a default) at every
//!   dispatch that reaches their scope.
//! - Build-time errors are fatal and leave no tree behind; dispatch-time
//!   errors are plain values, and handler errors pass through untouched.
//!
//! Construction is a one-shot build phase; the produced [`PathTree`] is
//! read-only at dispatch time, so repeated dispatches are independent.

pub mod builder;
pub mod dispatch;
pub mod error;
pub mod route;
pub mod switch;
pub mod tree;

// Re-export the main surface for convenience
pub use builder::TreeBuilder;
pub use dispatch::{
    DispatchConfig, DispatchFailure, DispatchPhase, Dispatcher, Invocation, Resolution,
};
pub use error::{
    BindingError, BuildError, DefinitionError, DispatchError, LookupFailure, RouteConflictError,
};
pub use route::{Guard, ParsedRoute, Segment, parse_route};
pub use switch::{SwitchBindings, SwitchDefinition, SwitchExpression, SwitchValue};
pub use tree::{NodeId, ParamValue, PathTree, RouteMatch, RouteParams, TreeSummary};
