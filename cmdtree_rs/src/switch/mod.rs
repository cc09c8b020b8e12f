//! Switch model: token lexing, declarations, scopes, and binding.
//!
//! - [`expr`] - `identifier[=value]` lexing shared by argv tokens and guards
//! - [`registry`] - declarations, visible-scope computation, runtime binding

pub mod expr;
pub mod registry;

pub use expr::SwitchExpression;
pub use registry::{
    SwitchBindings, SwitchDefinition, SwitchRegistry, SwitchScope, SwitchValue, bind_switches,
};
