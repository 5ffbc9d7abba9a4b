//! The AND-OR graph: node arena, head designation and node-state mutation.

use indexmap::IndexMap;
use log::{debug, info, trace};

use crate::description::GraphDescription;
use crate::error::{Error, Result};
use crate::node::{HyperArc, Node, NodeId};

/// Computes the feasibility flag of every node from the current `solved` flags.
///
/// A node is feasible if it already was, if it is terminal, or if at least
/// one of its hyperarcs has every child solved. The rule reads only `solved`
/// flags of other nodes, so one pass in any order is enough.
pub fn compute_feasibility(nodes: &[Node]) -> Vec<bool> {
    nodes
        .iter()
        .map(|node| {
            node.is_feasible()
                || node.is_terminal()
                || node.has_solved_arc(|child| nodes[child.0].is_solved())
        })
        .collect()
}

/// An AND-OR graph rooted at a single head node.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. Parent
/// back-references are derived once, when the graph is built.
#[derive(Debug, Clone)]
pub struct AoGraph {
    name: String,
    head: Option<NodeId>,
    nodes: Vec<Node>,
    index: IndexMap<String, NodeId>,
    parents: Vec<Vec<NodeId>>,
}

impl AoGraph {
    /// Builds a graph from a parsed description.
    ///
    /// Node names must be unique, every name used by a hyperarc or as the
    /// head must be declared, and the hyperarcs must not form a cycle.
    /// Feasibility is computed before returning, so terminal nodes are
    /// feasible right away.
    pub fn from_description(description: &GraphDescription) -> Result<Self> {
        let mut graph = Self {
            name: description.name.clone(),
            head: None,
            nodes: Vec::with_capacity(description.nodes.len()),
            index: IndexMap::with_capacity(description.nodes.len()),
            parents: Vec::new(),
        };

        for spec in &description.nodes {
            if graph.index.contains_key(&spec.name) {
                return Err(Error::DuplicateNode(spec.name.clone()));
            }
            let id = NodeId(graph.nodes.len());
            graph.index.insert(spec.name.clone(), id);
            graph.nodes.push(Node::new(spec.name.clone(), spec.cost));
        }

        for spec in &description.arcs {
            let parent = graph.find_by_name(&spec.parent)?;
            let children = spec
                .children
                .iter()
                .map(|child| graph.find_by_name(child))
                .collect::<Result<Vec<_>>>()?;
            graph.nodes[parent.0].add_arc(HyperArc::new(children, spec.cost));
        }

        graph.head = match &description.head {
            Some(head) => Some(graph.find_by_name(head)?),
            None => None,
        };

        graph.parents = derive_parents(&graph.nodes);
        graph.check_acyclic()?;
        graph.recompute_feasibility();

        info!(
            "Loaded graph '{}': {} nodes, head {}",
            graph.name,
            graph.nodes.len(),
            graph.head.map(|h| graph.nodes[h.0].name()).unwrap_or("<none>")
        );
        Ok(graph)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The head node: the whole task.
    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this graph.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Iterates over all nodes with their ids, in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i), node))
    }

    /// Looks a node up by name.
    pub fn find_by_name(&self, name: &str) -> Result<NodeId> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))
    }

    /// Nodes that reference `id` through at least one of their hyperarcs.
    pub fn parents(&self, id: NodeId) -> &[NodeId] {
        &self.parents[id.0]
    }

    /// Returns `true` once the head node is solved.
    pub fn is_solved(&self) -> bool {
        self.head
            .map(|head| self.nodes[head.0].is_solved())
            .unwrap_or(false)
    }

    /// Re-evaluates feasibility for every node. See [`compute_feasibility`].
    pub fn recompute_feasibility(&mut self) {
        let feasibility = compute_feasibility(&self.nodes);
        for (node, feasible) in self.nodes.iter_mut().zip(feasibility) {
            node.set_feasible(feasible);
        }
    }

    /// Marks a node as solved and refreshes feasibility.
    ///
    /// Only feasible, not yet solved nodes can be solved; otherwise nothing
    /// changes.
    pub fn solve_node(&mut self, id: NodeId) -> Result<()> {
        let node = &self.nodes[id.0];
        if node.is_solved() {
            return Err(Error::AlreadySolved(node.name().to_string()));
        }
        if !node.is_feasible() {
            return Err(Error::InfeasibleSolve(node.name().to_string()));
        }

        self.nodes[id.0].mark_solved();
        self.recompute_feasibility();
        debug!("Node '{}' solved", self.nodes[id.0].name());
        Ok(())
    }

    /// The cost of the most expensive hyperarc, over all parents, that leads to `id`.
    ///
    /// Returns `None` when no hyperarc references the node.
    pub fn overall_update(&self, id: NodeId) -> Option<u32> {
        self.parents[id.0]
            .iter()
            .flat_map(|parent| self.nodes[parent.0].arcs())
            .filter(|arc| arc.contains(id))
            .map(HyperArc::cost)
            .max()
    }

    /// Changes the cost of one hyperarc and returns the previous cost.
    pub fn update_arc_cost(&mut self, id: NodeId, arc: usize, cost: u32) -> Result<u32> {
        let node = &mut self.nodes[id.0];
        let name = node.name().to_string();
        let hyperarc = node
            .arc_mut(arc)
            .ok_or(Error::ArcNotFound { node: name, index: arc })?;
        let previous = hyperarc.cost();
        hyperarc.set_cost(cost);
        trace!("Hyperarc {} of {} cost {} -> {}", arc, id, previous, cost);
        Ok(previous)
    }

    /// Attaches application data to a node.
    pub fn set_payload(&mut self, id: NodeId, payload: serde_json::Value) {
        self.nodes[id.0].set_payload(payload);
    }

    fn check_acyclic(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        for start in 0..self.nodes.len() {
            if marks[start] != Mark::Unvisited {
                continue;
            }
            // (node, next child to visit), children flattened over all arcs
            let mut stack = vec![(start, 0usize)];
            marks[start] = Mark::InProgress;
            while let Some(top) = stack.last_mut() {
                let (current, next) = *top;
                top.1 += 1;
                let child = self.nodes[current]
                    .arcs()
                    .iter()
                    .flat_map(HyperArc::children)
                    .nth(next);
                match child {
                    Some(child) => match marks[child.0] {
                        Mark::InProgress => {
                            return Err(Error::CycleDetected(
                                self.nodes[child.0].name().to_string(),
                            ))
                        }
                        Mark::Unvisited => {
                            marks[child.0] = Mark::InProgress;
                            stack.push((child.0, 0));
                        }
                        Mark::Done => {}
                    },
                    None => {
                        marks[current] = Mark::Done;
                        stack.pop();
                    }
                }
            }
        }
        Ok(())
    }
}

fn derive_parents(nodes: &[Node]) -> Vec<Vec<NodeId>> {
    let mut parents: Vec<Vec<NodeId>> = vec![Vec::new(); nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        for child in node.arcs().iter().flat_map(HyperArc::children) {
            let entry = &mut parents[child.0];
            if !entry.contains(&NodeId(i)) {
                entry.push(NodeId(i));
            }
        }
    }
    parents
}
