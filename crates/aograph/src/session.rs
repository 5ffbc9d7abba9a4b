//! A planning session: the command surface over one graph and its paths.
//!
//! Every operation either completes fully or fails without changing state.
//! In particular, solving a node, refreshing feasibility and repropagating
//! path costs happen within a single call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path as FsPath;

use log::{info, warn};

use crate::config::PlannerConfig;
use crate::description::GraphDescription;
use crate::error::{Error, Result};
use crate::graph::AoGraph;
use crate::planner::{PathUpdate, Planner, Strategy, Suggestion};
use crate::report::Snapshot;

/// What happened when a node was solved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SolveOutcome {
    /// The node was solved; these paths had their costs lowered.
    Solved { updates: Vec<PathUpdate> },
    /// The head node was solved: the whole task is done.
    GraphComplete,
}

/// A solved node, as recorded in the session history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveEvent {
    pub node: String,
    pub at: DateTime<Utc>,
    pub outcome: SolveOutcome,
}

/// Owns one graph, its paths and the history of solved nodes.
#[derive(Debug, Default)]
pub struct Session {
    config: PlannerConfig,
    graph: Option<AoGraph>,
    planner: Planner,
    history: Vec<SolveEvent>,
}

impl Session {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The loaded graph, if any.
    pub fn graph(&self) -> Option<&AoGraph> {
        self.graph.as_ref()
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    /// Solved nodes in the order they were solved.
    pub fn history(&self) -> &[SolveEvent] {
        &self.history
    }

    /// Builds the graph, computes feasibility and generates every path.
    ///
    /// Returns the number of generated paths. A session holds a single
    /// graph; call [`reset`](Self::reset) before loading another one.
    pub fn load(&mut self, description: &GraphDescription) -> Result<usize> {
        if let Some(graph) = &self.graph {
            return Err(Error::AlreadyLoaded(graph.name().to_string()));
        }

        let graph = AoGraph::from_description(description)?;
        let mut planner = Planner::new().with_max_paths(self.config.max_paths);
        let count = planner.generate_paths(&graph)?;

        self.graph = Some(graph);
        self.planner = planner;
        self.history.clear();
        Ok(count)
    }

    /// Reads a description from `path` and loads it.
    pub fn load_file(&mut self, path: impl AsRef<FsPath>) -> Result<usize> {
        if let Some(graph) = &self.graph {
            return Err(Error::AlreadyLoaded(graph.name().to_string()));
        }
        let description = GraphDescription::from_file(path)?;
        self.load(&description)
    }

    /// Drops the loaded graph, its paths and the history.
    pub fn reset(&mut self) {
        self.graph = None;
        self.planner = Planner::new();
        self.history.clear();
    }

    /// Marks the named node as solved and brings path costs up to date.
    pub fn solve(&mut self, name: &str) -> Result<SolveOutcome> {
        let graph = self.graph.as_mut().ok_or(Error::NotLoaded)?;
        let id = graph.find_by_name(name)?;
        graph.solve_node(id)?;

        let outcome = if graph.is_solved() {
            info!("The graph '{}' is solved (head node solved)", graph.name());
            SolveOutcome::GraphComplete
        } else {
            SolveOutcome::Solved {
                updates: self.planner.update_paths(graph, id),
            }
        };

        self.history.push(SolveEvent {
            node: name.to_string(),
            at: Utc::now(),
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    /// Recommends the next node to solve, using the configured strategy
    /// when `strategy` is `None`.
    pub fn suggest(&self, strategy: Option<Strategy>) -> Result<Suggestion> {
        let graph = self.graph.as_ref().ok_or(Error::NotLoaded)?;
        let strategy = strategy.unwrap_or(self.config.default_strategy);
        self.planner.suggest_next(graph, strategy).map_err(|e| {
            if e.is_advisory() {
                warn!("{}", e);
            }
            e
        })
    }

    /// Changes the cost of hyperarc `arc` of the named node and shifts the
    /// cost of every path that uses it. Returns the number of adjusted path
    /// positions.
    pub fn update_arc_cost(&mut self, name: &str, arc: usize, cost: u32) -> Result<usize> {
        let graph = self.graph.as_mut().ok_or(Error::NotLoaded)?;
        let id = graph.find_by_name(name)?;
        let previous = graph.update_arc_cost(id, arc, cost)?;
        let delta = i64::from(cost) - i64::from(previous);
        Ok(self.planner.apply_arc_cost_change(id, arc, delta))
    }

    /// Attaches application data to the named node.
    pub fn attach_payload(&mut self, name: &str, payload: serde_json::Value) -> Result<()> {
        let graph = self.graph.as_mut().ok_or(Error::NotLoaded)?;
        let id = graph.find_by_name(name)?;
        graph.set_payload(id, payload);
        Ok(())
    }

    /// A snapshot of every node and path.
    pub fn describe(&self) -> Result<Snapshot> {
        let graph = self.graph.as_ref().ok_or(Error::NotLoaded)?;
        Ok(Snapshot::capture(graph, &self.planner))
    }
}
