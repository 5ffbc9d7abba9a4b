//! A single strategy through the graph.

use serde::Serialize;

use crate::graph::AoGraph;
use crate::node::NodeId;

/// One complete strategy: the node sequence obtained by picking exactly one
/// hyperarc at every OR-branching node, in depth-first expansion order.
///
/// `checked` runs parallel to `nodes`. While paths are being generated it
/// marks positions that have been expanded; afterwards it marks nodes that
/// have been solved along this path. `choices` records the hyperarc taken at
/// each expanded position and `origins` the position each node was reached from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    index: usize,
    cost: i64,
    complete: bool,
    nodes: Vec<NodeId>,
    checked: Vec<bool>,
    choices: Vec<Option<usize>>,
    origins: Vec<Option<usize>>,
}

impl Path {
    /// Creates an empty path with the given index.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            cost: 0,
            complete: false,
            nodes: Vec::new(),
            checked: Vec::new(),
            choices: Vec::new(),
            origins: Vec::new(),
        }
    }

    /// Copies this path under a new index. The copy is never complete.
    pub fn fork(&self, index: usize) -> Self {
        Self {
            index,
            complete: false,
            ..self.clone()
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Running cost of the path.
    pub fn cost(&self) -> i64 {
        self.cost
    }

    /// `true` once every position has been expanded during generation.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn is_checked(&self, position: usize) -> bool {
        self.checked[position]
    }

    /// The hyperarc chosen at `position`, if that node was expanded through one.
    pub fn choice(&self, position: usize) -> Option<usize> {
        self.choices[position]
    }

    /// Returns `true` if `node` appears anywhere on the path.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Appends an unchecked root node. Its cost is added once it is expanded.
    pub fn add_node(&mut self, node: NodeId) {
        self.push(node, None);
    }

    /// Appends an unchecked child of the node at `parent`.
    pub fn add_child(&mut self, node: NodeId, parent: usize) {
        self.push(node, Some(parent));
    }

    fn push(&mut self, node: NodeId, origin: Option<usize>) {
        self.nodes.push(node);
        self.checked.push(false);
        self.choices.push(None);
        self.origins.push(origin);
    }

    /// Positions at which `node` occurs.
    pub fn positions(&self, node: NodeId) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |&(_, &current)| current == node)
            .map(|(position, _)| position)
    }

    /// First position not yet checked.
    pub fn first_unchecked(&self) -> Option<usize> {
        self.checked.iter().position(|checked| !checked)
    }

    /// The position that expanded into `position`, and the hyperarc it took.
    ///
    /// `None` for the root of the path.
    pub fn upstream_arc(&self, position: usize) -> Option<(usize, usize)> {
        let parent = self.origins[position]?;
        Some((parent, self.choices[parent]?))
    }

    /// Walks the path from the leaves to the head and returns the first node
    /// that is neither solved along this path nor infeasible.
    pub fn suggest_node(&self, graph: &AoGraph) -> Option<NodeId> {
        self.nodes
            .iter()
            .zip(&self.checked)
            .rev()
            .find(|&(&node, &checked)| !checked && graph.node(node).is_feasible())
            .map(|(&node, _)| node)
    }

    pub(crate) fn expand(&mut self, position: usize, choice: Option<usize>, cost: i64) {
        self.checked[position] = true;
        self.choices[position] = choice;
        self.cost += cost;
    }

    pub(crate) fn set_complete(&mut self) {
        self.complete = true;
    }

    pub(crate) fn reset_checked(&mut self) {
        self.checked.iter_mut().for_each(|checked| *checked = false);
    }

    /// Marks every occurrence of `node` as solved and lowers the cost by
    /// `amount`, the total charged over all occurrences.
    pub(crate) fn record_solved(&mut self, node: NodeId, amount: i64) {
        for (current, checked) in self.nodes.iter().zip(self.checked.iter_mut()) {
            if *current == node {
                *checked = true;
            }
        }
        self.cost -= amount;
    }

    pub(crate) fn adjust_cost(&mut self, delta: i64) {
        self.cost += delta;
    }
}
