//! Nodes and hyperarcs of an AND-OR graph.
//!
//! A `Node` is a unit of work. Each of its `HyperArc`s is one OR-alternative
//! for carrying it out, and the children of a hyperarc form an AND-group that
//! must be completed before the node becomes feasible through that arc.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable index of a node inside its graph's arena.
///
/// Ids are assigned in declaration order when the graph is built and never
/// change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the arena position of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One OR-alternative of a node: an AND-group of children plus the cost of
/// choosing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperArc {
    children: Vec<NodeId>,
    cost: u32,
}

impl HyperArc {
    /// Creates a hyperarc to `children` with the given cost.
    pub fn new(children: Vec<NodeId>, cost: u32) -> Self {
        Self { children, cost }
    }

    /// The AND-group reached through this arc, in declared order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The cost of choosing this alternative.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Returns `true` if `node` belongs to this arc's AND-group.
    pub fn contains(&self, node: NodeId) -> bool {
        self.children.contains(&node)
    }

    pub(crate) fn set_cost(&mut self, cost: u32) {
        self.cost = cost;
    }
}

/// A decomposable unit of work.
///
/// `solved` only ever goes from `false` to `true`. `feasible` is derived
/// state owned by the graph and is sticky once set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    name: String,
    cost: u32,
    solved: bool,
    feasible: bool,
    arcs: Vec<HyperArc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<serde_json::Value>,
}

impl Node {
    /// Creates an unsolved, infeasible node without hyperarcs.
    pub fn new(name: impl Into<String>, cost: u32) -> Self {
        Self {
            name: name.into(),
            cost,
            solved: false,
            feasible: false,
            arcs: Vec::new(),
            payload: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's own cost, paid whichever alternative is chosen.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    /// The OR-alternatives of this node, in declared order.
    pub fn arcs(&self) -> &[HyperArc] {
        &self.arcs
    }

    /// A node without hyperarcs is terminal and always feasible.
    pub fn is_terminal(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Application data attached to the node, if any.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        self.payload.as_ref()
    }

    /// Returns `true` if some hyperarc has every child solved, according to `solved`.
    pub fn has_solved_arc(&self, solved: impl Fn(NodeId) -> bool) -> bool {
        self.arcs
            .iter()
            .any(|arc| arc.children.iter().all(|&child| solved(child)))
    }

    pub(crate) fn add_arc(&mut self, arc: HyperArc) {
        self.arcs.push(arc);
    }

    pub(crate) fn arc_mut(&mut self, index: usize) -> Option<&mut HyperArc> {
        self.arcs.get_mut(index)
    }

    pub(crate) fn mark_solved(&mut self) {
        self.solved = true;
    }

    pub(crate) fn set_feasible(&mut self, feasible: bool) {
        // sticky: feasibility is never withdrawn
        self.feasible = self.feasible || feasible;
    }

    pub(crate) fn set_payload(&mut self, payload: serde_json::Value) {
        self.payload = Some(payload);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (cost {}, feasible: {}, solved: {}, {} hyperarcs)",
            self.name,
            self.cost,
            self.feasible,
            self.solved,
            self.arcs.len()
        )
    }
}
