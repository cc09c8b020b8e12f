//! Route definitions: segment parsing and guard predicates.

pub mod guard;
pub mod segment;

pub use guard::{CompareOp, Guard};
pub use segment::{ParsedRoute, Segment, parse_route};
