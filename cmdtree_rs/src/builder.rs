//! TreeBuilder - the build-phase API over `PathTree`.
//!
//! Declaration happens in one explicit phase: register routes (getting back
//! immutable node handles), attach switches and aliases to those handles,
//! then call [`TreeBuilder::build`] to freeze the tree. Every method returns
//! `Result`, so a definition or conflict error aborts the build before any
//! tree is handed out; nothing dispatches against a half-built tree.

use crate::error::BuildError;
use crate::route::segment::parse_route;
use crate::switch::registry::SwitchDefinition;
use crate::tree::{NodeId, PathTree};

/// Accumulates route, switch, and alias declarations.
#[derive(Debug)]
pub struct TreeBuilder<H> {
    tree: PathTree<H>,
}

impl<H> Default for TreeBuilder<H> {
    fn default() -> Self {
        Self {
            tree: PathTree::new(),
        }
    }
}

impl<H> TreeBuilder<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler at a route. The route string may carry `:param`
    /// segments, one trailing `...rest` segment, and one trailing
    /// `[identifier <op> "value"]` guard clause.
    ///
    /// Registering the same path twice appends a second registration to the
    /// same node; dispatch picks the first whose guard holds, in
    /// registration order.
    pub fn route(&mut self, route: &str, handler: H) -> Result<NodeId, BuildError> {
        let parsed = parse_route(route)?;
        Ok(self.tree.insert(&parsed.segments, parsed.guard, handler)?)
    }

    /// Create (or find) a path without registering a handler, e.g. a pure
    /// grouping node that only carries `common` switches.
    pub fn path(&mut self, route: &str) -> Result<NodeId, BuildError> {
        let parsed = parse_route(route)?;
        Ok(self.tree.ensure_path(&parsed.segments)?)
    }

    /// Declare a switch on a node.
    pub fn switch(&mut self, node: NodeId, def: SwitchDefinition) -> Result<(), BuildError> {
        self.tree.declare_switch(node, def)
    }

    /// Add an extra literal name for a node on its parent.
    pub fn alias(&mut self, node: NodeId, name: &str) -> Result<(), BuildError> {
        Ok(self.tree.alias(node, name)?)
    }

    /// Freeze the declarations into an immutable tree.
    pub fn build(self) -> PathTree<H> {
        self.tree
    }
}

// ============================================================================
// Tests
// ============================================================================
