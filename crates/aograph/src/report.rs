//! Human-readable and serializable snapshots of a planning session.

use serde::Serialize;
use std::fmt;

use crate::graph::AoGraph;
use crate::node::NodeId;
use crate::planner::Planner;

/// One hyperarc as shown in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcReport {
    pub cost: u32,
    pub children: Vec<String>,
}

/// One node as shown in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeReport {
    pub name: String,
    pub cost: u32,
    pub feasible: bool,
    pub solved: bool,
    pub arcs: Vec<ArcReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

/// One position on a path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub name: String,
    pub done: bool,
}

/// One path as shown in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathReport {
    pub index: usize,
    pub cost: i64,
    pub complete: bool,
    pub steps: Vec<StepReport>,
}

/// The state of a graph and its paths at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub graph: String,
    pub head: Option<String>,
    pub solved: bool,
    pub nodes: Vec<NodeReport>,
    pub paths: Vec<PathReport>,
}

impl Snapshot {
    /// Captures the current state of `graph` and `planner`.
    pub fn capture(graph: &AoGraph, planner: &Planner) -> Self {
        let name_of = |id: NodeId| graph.node(id).name().to_string();

        let nodes = graph
            .nodes()
            .map(|(_, node)| NodeReport {
                name: node.name().to_string(),
                cost: node.cost(),
                feasible: node.is_feasible(),
                solved: node.is_solved(),
                arcs: node
                    .arcs()
                    .iter()
                    .map(|arc| ArcReport {
                        cost: arc.cost(),
                        children: arc.children().iter().map(|&c| name_of(c)).collect(),
                    })
                    .collect(),
                payload: node.payload().cloned(),
            })
            .collect();

        let paths = planner
            .paths()
            .iter()
            .map(|path| PathReport {
                index: path.index(),
                cost: path.cost(),
                complete: path.is_complete(),
                steps: path
                    .nodes()
                    .iter()
                    .enumerate()
                    .map(|(i, &id)| StepReport {
                        name: name_of(id),
                        done: path.is_checked(i),
                    })
                    .collect(),
            })
            .collect();

        Self {
            graph: graph.name().to_string(),
            head: graph.head().map(name_of),
            solved: graph.is_solved(),
            nodes,
            paths,
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Graph: {}", self.graph)?;
        writeln!(f, "Number of nodes: {}", self.nodes.len())?;
        writeln!(f, "Head node: {}", self.head.as_deref().unwrap_or("<none>"))?;
        if self.solved {
            writeln!(f, "The graph is solved.")?;
        }

        for node in &self.nodes {
            writeln!(
                f,
                "  {} (cost {}) feasible: {} solved: {}",
                node.name, node.cost, node.feasible, node.solved
            )?;
            for (i, arc) in node.arcs.iter().enumerate() {
                writeln!(
                    f,
                    "    hyperarc {} (cost {}): {}",
                    i,
                    arc.cost,
                    arc.children.join(" ")
                )?;
            }
            if let Some(payload) = &node.payload {
                writeln!(f, "    payload: {}", payload)?;
            }
        }

        for path in &self.paths {
            writeln!(f, "Path {} - total cost: {}", path.index, path.cost)?;
            for step in &path.steps {
                if step.done {
                    writeln!(f, "  {} - done", step.name)?;
                } else {
                    writeln!(f, "  {}", step.name)?;
                }
            }
        }
        Ok(())
    }
}
