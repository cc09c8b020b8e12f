//! PathTree - arena-backed trie of route nodes.
//!
//! Nodes live in one owning `Vec` and refer to each other by integer
//! `NodeId` handles. Literal children sit in a name → id map, so an alias
//! is just an extra map entry pointing at the same id; parent links are
//! non-owning back-references used for scope computation and diagnostics.
//!
//! Lookup prefers, at every node, an exact literal child, then the param
//! child, then the rest child, and backtracks across that order so a match
//! is found whenever any literal/param/rest chain consumes every token and
//! ends on a node with at least one registration.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{BuildError, DefinitionError, LookupFailure, RouteConflictError};
use crate::route::guard::Guard;
use crate::route::segment::Segment;
use crate::switch::registry::{SwitchDefinition, SwitchRegistry, SwitchScope};

/// Integer handle into the tree's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

/// One `(guard, handler)` pair registered at a node.
///
/// Multiple registrations at an identical path are permitted; dispatch
/// selects the first, in registration order, whose guard holds.
#[derive(Debug)]
pub struct Registration<H> {
    pub guard: Guard,
    pub handler: H,
}

#[derive(Debug)]
struct PathNode<H> {
    parent: Option<NodeId>,
    segment: Option<Segment>,
    literals: BTreeMap<String, NodeId>,
    param: Option<NodeId>,
    rest: Option<NodeId>,
    registrations: Vec<Registration<H>>,
    switches: SwitchRegistry,
}

impl<H> PathNode<H> {
    fn new(parent: Option<NodeId>, segment: Option<Segment>) -> Self {
        Self {
            parent,
            segment,
            literals: BTreeMap::new(),
            param: None,
            rest: None,
            registrations: Vec::new(),
            switches: SwitchRegistry::default(),
        }
    }
}

/// The value bound to one route parameter during lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Bound by a `:name` segment.
    One(String),

    /// Bound by a `...name` segment: all remaining tokens, in order.
    Many(Vec<String>),
}

/// Parameter bindings of one successful lookup, keyed by segment name.
pub type RouteParams = BTreeMap<String, ParamValue>;

/// Result of a successful lookup: the terminal node plus bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub node: NodeId,
    pub params: RouteParams,
}

/// Trie of route nodes with ordered handler registrations.
#[derive(Debug)]
pub struct PathTree<H> {
    nodes: Vec<PathNode<H>>,
}

impl<H> Default for PathTree<H> {
    fn default() -> Self {
        Self {
            nodes: vec![PathNode::new(None, None)],
        }
    }
}

impl<H> PathTree<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub const ROOT: NodeId = NodeId(0);

    /// Walk/create nodes for `segments` and append `(guard, handler)` to
    /// the terminal node's registration list. Returns the terminal node.
    pub fn insert(
        &mut self,
        segments: &[Segment],
        guard: Guard,
        handler: H,
    ) -> Result<NodeId, DefinitionError> {
        let node = self.ensure_path(segments)?;
        self.nodes[node.0].registrations.push(Registration { guard, handler });
        Ok(node)
    }

    /// Walk/create nodes for `segments` without registering a handler.
    pub fn ensure_path(&mut self, segments: &[Segment]) -> Result<NodeId, DefinitionError> {
        let mut current = Self::ROOT;
        for segment in segments {
            current = self.ensure_child(current, segment)?;
        }
        Ok(current)
    }

    fn ensure_child(&mut self, parent: NodeId, segment: &Segment) -> Result<NodeId, DefinitionError> {
        match segment {
            Segment::Literal(text) => {
                if let Some(&child) = self.nodes[parent.0].literals.get(text) {
                    return Ok(child);
                }
                let child = self.push_node(parent, segment.clone());
                self.nodes[parent.0].literals.insert(text.clone(), child);
                Ok(child)
            }
            Segment::Param(name) => {
                self.ensure_parametric(parent, segment, name, |n| n.param)
                    .map(|(child, created)| {
                        if created {
                            self.nodes[parent.0].param = Some(child);
                        }
                        child
                    })
            }
            Segment::Rest(name) => {
                self.ensure_parametric(parent, segment, name, |n| n.rest)
                    .map(|(child, created)| {
                        if created {
                            self.nodes[parent.0].rest = Some(child);
                        }
                        child
                    })
            }
        }
    }

    /// Reuse the designated param/rest child when the name agrees; a
    /// differently named parametric segment at the same position is a
    /// definition conflict.
    fn ensure_parametric(
        &mut self,
        parent: NodeId,
        segment: &Segment,
        name: &str,
        slot: impl Fn(&PathNode<H>) -> Option<NodeId>,
    ) -> Result<(NodeId, bool), DefinitionError> {
        if let Some(child) = slot(&self.nodes[parent.0]) {
            let existing = self.nodes[child.0]
                .segment
                .as_ref()
                .map(Segment::name)
                .unwrap_or_default();
            if existing != name {
                return Err(DefinitionError::ParamConflict {
                    existing: existing.to_string(),
                    incoming: name.to_string(),
                });
            }
            return Ok((child, false));
        }
        Ok((self.push_node(parent, segment.clone()), true))
    }

    fn push_node(&mut self, parent: NodeId, segment: Segment) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(PathNode::new(Some(parent), Some(segment)));
        id
    }

    /// Add `name` as an additional literal key on the node's parent.
    ///
    /// Idempotent when `name` already points at this node; a collision with
    /// a different child is a conflict. Aliases do not propagate to
    /// descendants. The root has no parent and cannot be aliased.
    pub fn alias(&mut self, node: NodeId, name: &str) -> Result<(), RouteConflictError> {
        let Some(parent) = self.nodes[node.0].parent else {
            return Err(RouteConflictError::RootAlias {
                name: name.to_string(),
            });
        };
        match self.nodes[parent.0].literals.get(name) {
            Some(&existing) if existing == node => Ok(()),
            Some(_) => Err(RouteConflictError::AliasCollision {
                name: name.to_string(),
            }),
            None => {
                self.nodes[parent.0].literals.insert(name.to_string(), node);
                Ok(())
            }
        }
    }

    /// Declare a switch on a node, checking the declaration's own
    /// consistency, uniqueness across the node's visible scope, and - for
    /// `common` switches - across descendants.
    pub fn declare_switch(
        &mut self,
        node: NodeId,
        def: SwitchDefinition,
    ) -> Result<(), BuildError> {
        def.validate()?;

        // Ancestors' common switches already visible here.
        self.inherited_scope(node).check_collision(&def)?;

        // A common switch also joins every descendant's scope.
        if def.common {
            for id in (0..self.nodes.len()).map(NodeId) {
                if id != node && self.is_descendant(id, node) {
                    let mut scope = SwitchScope::default();
                    for d in self.nodes[id.0].switches.entries() {
                        scope.push(d);
                    }
                    scope.check_collision(&def)?;
                }
            }
        }

        Ok(self.nodes[node.0].switches.declare(def)?)
    }

    /// The node's visible scope: every ancestor's `common` switches
    /// (root-first) plus all of its own declarations.
    pub fn scope_of(&self, node: NodeId) -> SwitchScope<'_> {
        let mut scope = self.inherited_scope(node);
        for def in self.nodes[node.0].switches.entries() {
            scope.push(def);
        }
        scope
    }

    fn inherited_scope(&self, node: NodeId) -> SwitchScope<'_> {
        let mut chain = Vec::new();
        let mut current = self.nodes[node.0].parent;
        while let Some(id) = current {
            chain.push(id);
            current = self.nodes[id.0].parent;
        }

        let mut scope = SwitchScope::default();
        for id in chain.into_iter().rev() {
            for def in self.nodes[id.0].switches.common_entries() {
                scope.push(def);
            }
        }
        scope
    }

    fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.nodes[node.0].parent;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    /// Resolve a token sequence to a terminal node with bound parameters.
    pub fn lookup(&self, tokens: &[String]) -> Result<RouteMatch, LookupFailure> {
        self.walk(Self::ROOT, tokens, RouteParams::new())
            .ok_or_else(|| LookupFailure::NotFound {
                path: tokens.join("/"),
            })
    }

    fn walk(&self, node: NodeId, tokens: &[String], params: RouteParams) -> Option<RouteMatch> {
        let entry = &self.nodes[node.0];

        let Some((head, tail)) = tokens.split_first() else {
            if !entry.registrations.is_empty() {
                return Some(RouteMatch { node, params });
            }
            // A trailing rest segment may match zero tokens.
            if let Some(rest) = entry.rest {
                return self.finish_rest(rest, &[], params);
            }
            return None;
        };

        if let Some(&child) = entry.literals.get(head) {
            if let Some(found) = self.walk(child, tail, params.clone()) {
                return Some(found);
            }
        }

        if let Some(child) = entry.param {
            let name = self.segment_name(child);
            let mut bound = params.clone();
            bound.insert(name.to_string(), ParamValue::One(head.clone()));
            if let Some(found) = self.walk(child, tail, bound) {
                return Some(found);
            }
        }

        if let Some(child) = entry.rest {
            return self.finish_rest(child, tokens, params);
        }

        None
    }

    fn finish_rest(&self, child: NodeId, tokens: &[String], mut params: RouteParams) -> Option<RouteMatch> {
        if self.nodes[child.0].registrations.is_empty() {
            return None;
        }
        let name = self.segment_name(child);
        params.insert(name.to_string(), ParamValue::Many(tokens.to_vec()));
        Some(RouteMatch { node: child, params })
    }

    fn segment_name(&self, node: NodeId) -> &str {
        self.nodes[node.0]
            .segment
            .as_ref()
            .map(Segment::name)
            .unwrap_or_default()
    }

    /// The node's registrations, in registration order.
    pub fn registrations(&self, node: NodeId) -> &[Registration<H>] {
        &self.nodes[node.0].registrations
    }

    /// Segment path from the root to a node, for diagnostics.
    pub fn path_of(&self, node: NodeId) -> String {
        let mut pieces = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(segment) = &self.nodes[id.0].segment {
                pieces.push(display_segment(segment));
            }
            current = self.nodes[id.0].parent;
        }
        pieces.reverse();
        pieces.join("/")
    }

    /// Serializable summary of the resolved tree - node paths, aliases,
    /// and visible switches. This is the surface a completion or tracing
    /// plugin consumes; the core itself does nothing further with it.
    pub fn describe(&self) -> TreeSummary {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (index, entry) in self.nodes.iter().enumerate() {
            let id = NodeId(index);
            let primary = entry.segment.as_ref().map(display_segment);

            let aliases = entry
                .parent
                .map(|parent| {
                    self.nodes[parent.0]
                        .literals
                        .iter()
                        .filter(|&(name, &child)| {
                            child == id && Some(name.as_str()) != primary.as_deref()
                        })
                        .map(|(name, _)| name.clone())
                        .collect()
                })
                .unwrap_or_default();

            nodes.push(NodeSummary {
                path: self.path_of(id),
                aliases,
                registrations: entry.registrations.len(),
                switches: self
                    .scope_of(id)
                    .entries()
                    .iter()
                    .map(|&d| d.clone())
                    .collect(),
            });
        }
        TreeSummary { nodes }
    }
}

fn display_segment(segment: &Segment) -> String {
    match segment {
        Segment::Literal(text) => text.clone(),
        Segment::Param(name) => format!(":{name}"),
        Segment::Rest(name) => format!("...{name}"),
    }
}

/// Flat, serializable view of the tree for external plugins.
#[derive(Debug, Clone, Serialize)]
pub struct TreeSummary {
    pub nodes: Vec<NodeSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeSummary {
    pub path: String,
    pub aliases: Vec<String>,
    pub registrations: usize,
    pub switches: Vec<SwitchDefinition>,
}

// ============================================================================
// Tests
// ============================================================================
