//! Path enumeration, cost repropagation and next-step suggestion.
//!
//! The planner owns the set of all paths through an [`AoGraph`]. Paths are
//! generated once, right after the graph is loaded; from then on solving a
//! node only lowers path costs and marks positions as done, and the planner
//! answers "what should be done next" with one of two strategies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use log::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::graph::AoGraph;
use crate::node::NodeId;
use crate::path::Path;

/// How the path to take the next suggestion from is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Follow the complete path with the lowest running cost.
    #[default]
    LongSighted,
    /// Follow the path that benefited most from the last solved node.
    ShortSighted,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::LongSighted => write!(f, "long-sighted"),
            Strategy::ShortSighted => write!(f, "short-sighted"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "long" | "long-sighted" | "long_sighted" | "optimal" => Ok(Strategy::LongSighted),
            "short" | "short-sighted" | "short_sighted" | "greedy" => Ok(Strategy::ShortSighted),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// How much a path's cost dropped when a node was solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathUpdate {
    pub path: usize,
    pub benefit: i64,
}

/// A recommended next step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub node: NodeId,
    pub name: String,
    /// The path the suggestion was taken from.
    pub path: usize,
    pub strategy: Strategy,
}

/// The set of paths through a graph and the algorithms that maintain it.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    paths: Vec<Path>,
    last_updates: Vec<PathUpdate>,
    generated: bool,
    max_paths: Option<usize>,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of paths generation may produce.
    pub fn with_max_paths(mut self, max_paths: Option<usize>) -> Self {
        self.max_paths = max_paths;
        self
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn path(&self, index: usize) -> Option<&Path> {
        self.paths.get(index)
    }

    /// `true` once [`generate_paths`](Self::generate_paths) has run successfully.
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Benefits recorded by the most recent [`update_paths`](Self::update_paths).
    pub fn last_updates(&self) -> &[PathUpdate] {
        &self.last_updates
    }

    /// Enumerates every path from the head node down to the terminal nodes.
    ///
    /// The first incomplete path is expanded at its first unchecked position
    /// until every path is complete. A node with several hyperarcs forks the
    /// path: the original keeps the first arc and each fork, indexed by the
    /// path count at its creation, takes one of the remaining arcs in order.
    ///
    /// Once generation is done every checked marker is cleared; from then on
    /// they record solved nodes. Returns the number of paths.
    pub fn generate_paths(&mut self, graph: &AoGraph) -> Result<usize> {
        self.paths.clear();
        self.last_updates.clear();
        self.generated = false;

        let Some(head) = graph.head() else {
            warn!("There is no graph to navigate: '{}' has no head", graph.name());
            self.generated = true;
            return Ok(0);
        };

        if self.max_paths == Some(0) {
            return Err(Error::PathLimitExceeded { limit: 0 });
        }

        let mut first = Path::new(0);
        first.add_node(head);
        self.paths.push(first);

        // paths before `current` are complete; forks are only ever appended
        let mut current = 0;
        while current < self.paths.len() {
            let Some(position) = self.paths[current].first_unchecked() else {
                self.paths[current].set_complete();
                trace!("Path {} complete", current);
                current += 1;
                continue;
            };

            let id = self.paths[current].nodes()[position];
            let node = graph.node(id);
            let node_cost = i64::from(node.cost());
            let arcs = node.arcs();

            if arcs.is_empty() {
                self.paths[current].expand(position, None, node_cost);
                continue;
            }

            if let Some(limit) = self.max_paths {
                if self.paths.len() + arcs.len() - 1 > limit {
                    self.paths.clear();
                    return Err(Error::PathLimitExceeded { limit });
                }
            }

            for (arc_index, arc) in arcs.iter().enumerate().skip(1) {
                let mut fork = self.paths[current].fork(self.paths.len());
                fork.expand(position, Some(arc_index), node_cost + i64::from(arc.cost()));
                for &child in arc.children() {
                    fork.add_child(child, position);
                }
                trace!(
                    "Node '{}' forks path {} into path {} (hyperarc {})",
                    node.name(),
                    current,
                    fork.index(),
                    arc_index
                );
                self.paths.push(fork);
            }

            let path = &mut self.paths[current];
            path.expand(position, Some(0), node_cost + i64::from(arcs[0].cost()));
            for &child in arcs[0].children() {
                path.add_child(child, position);
            }
        }

        for path in &mut self.paths {
            path.reset_checked();
        }
        self.generated = true;

        info!(
            "Generated {} paths for graph '{}'",
            self.paths.len(),
            graph.name()
        );
        Ok(self.paths.len())
    }

    /// Lowers path costs after `solved` has been marked as solved.
    ///
    /// Every path was costed with `solved` reached through whichever arc it
    /// picked. Each occurrence of the node on a path is charged
    /// `cost(solved) + max incoming arc cost - cost of the arc that led to it`;
    /// the path's benefit is the sum over its occurrences and the node is
    /// marked done along the path. Paths without a connecting arc are left
    /// untouched.
    pub fn update_paths(&mut self, graph: &AoGraph, solved: NodeId) -> Vec<PathUpdate> {
        self.last_updates.clear();
        let node = graph.node(solved);

        let Some(overall) = graph.overall_update(solved) else {
            warn!("No hyperarc leads to '{}'; path costs unchanged", node.name());
            return Vec::new();
        };
        let to_subtract = i64::from(node.cost()) + i64::from(overall);

        for path in self.paths.iter_mut().filter(|p| p.contains(solved)) {
            let charges: Vec<i64> = path
                .positions(solved)
                .filter_map(|position| path.upstream_arc(position))
                .map(|(parent, arc)| {
                    let upstream = graph.node(path.nodes()[parent]);
                    to_subtract - i64::from(upstream.arcs()[arc].cost())
                })
                .collect();

            if charges.is_empty() {
                warn!(
                    "Path {} has no hyperarc leading to '{}'",
                    path.index(),
                    node.name()
                );
                continue;
            }

            let benefit = charges.iter().sum();
            path.record_solved(solved, benefit);
            debug!(
                "Path {}: cost {} after subtracting {} over {} occurrences",
                path.index(),
                path.cost(),
                benefit,
                charges.len()
            );
            self.last_updates.push(PathUpdate {
                path: path.index(),
                benefit,
            });
        }

        self.last_updates.clone()
    }

    /// Shifts the cost of every path that took hyperarc `arc` of `node` by `delta`.
    ///
    /// Returns how many path positions were adjusted.
    pub fn apply_arc_cost_change(&mut self, node: NodeId, arc: usize, delta: i64) -> usize {
        let mut adjusted = 0;
        for path in &mut self.paths {
            let hits = (0..path.nodes().len())
                .filter(|&i| path.nodes()[i] == node && path.choice(i) == Some(arc))
                .count();
            if hits > 0 {
                path.adjust_cost(delta * hits as i64);
                adjusted += hits;
            }
        }
        adjusted
    }

    /// Index of the complete path with minimum cost; ties go to the lowest index.
    pub fn find_optimal_path(&self) -> Result<usize> {
        if !self.generated {
            return Err(Error::PathsNotGenerated);
        }
        if let Some(open) = self.paths.iter().find(|p| !p.is_complete()) {
            return Err(Error::PathsIncomplete(open.index()));
        }
        self.paths
            .iter()
            .min_by_key(|p| (p.cost(), p.index()))
            .map(Path::index)
            .ok_or(Error::EmptyGraph)
    }

    /// Picks the path the next suggestion is taken from.
    pub fn select_path(&self, strategy: Strategy) -> Result<usize> {
        match strategy {
            Strategy::LongSighted => self.find_optimal_path(),
            Strategy::ShortSighted => {
                let mut best: Option<PathUpdate> = None;
                for update in &self.last_updates {
                    if best.map_or(true, |b| update.benefit > b.benefit) {
                        best = Some(*update);
                    }
                }
                match best {
                    Some(update) => Ok(update.path),
                    None => {
                        debug!("No recorded benefit yet, falling back to long-sighted");
                        self.find_optimal_path()
                    }
                }
            }
        }
    }

    /// Recommends the next node to solve.
    pub fn suggest_next(&self, graph: &AoGraph, strategy: Strategy) -> Result<Suggestion> {
        if graph.is_solved() {
            return Err(Error::GraphSolved);
        }
        if !self.generated {
            return Err(Error::PathsNotGenerated);
        }
        if self.paths.is_empty() {
            return Err(Error::EmptyGraph);
        }

        let path = self.select_path(strategy)?;
        let node = self.paths[path]
            .suggest_node(graph)
            .ok_or(Error::NoSuggestion(path))?;
        let name = graph.node(node).name().to_string();
        info!("Suggestion ({}): {} from path {}", strategy, name, path);

        Ok(Suggestion {
            node,
            name,
            path,
            strategy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::GraphDescription;

    fn build(desc: GraphDescription) -> AoGraph {
        AoGraph::from_description(&desc).unwrap()
    }

    /// H (5) with arc A (2) -> X (3) and arc B (4) -> Y (1).
    fn two_ways() -> AoGraph {
        build(
            GraphDescription::new("two_ways")
                .with_head("H")
                .node("H", 5)
                .node("X", 3)
                .node("Y", 1)
                .arc("H", 2, ["X"])
                .arc("H", 4, ["Y"]),
        )
    }

    fn names(graph: &AoGraph, path: &Path) -> Vec<String> {
        path.nodes()
            .iter()
            .map(|&id| graph.node(id).name().to_string())
            .collect()
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("long".parse::<Strategy>().unwrap(), Strategy::LongSighted);
        assert_eq!("Short".parse::<Strategy>().unwrap(), Strategy::ShortSighted);
        assert_eq!("greedy".parse::<Strategy>().unwrap(), Strategy::ShortSighted);
        assert!("sideways".parse::<Strategy>().is_err());
        assert_eq!(Strategy::default(), Strategy::LongSighted);
    }

    #[test]
    fn test_generate_or_branch() {
        let graph = two_ways();
        let mut planner = Planner::new();
        assert_eq!(planner.generate_paths(&graph).unwrap(), 2);

        let paths = planner.paths();
        assert_eq!(names(&graph, &paths[0]), vec!["H", "X"]);
        assert_eq!(names(&graph, &paths[1]), vec!["H", "Y"]);
        assert_eq!(paths[0].cost(), 10);
        assert_eq!(paths[1].cost(), 10);
        assert!(paths.iter().all(Path::is_complete));
        assert_eq!(paths[0].choice(0), Some(0));
        assert_eq!(paths[1].choice(0), Some(1));
    }

    #[test]
    fn test_checked_cleared_after_generation() {
        let graph = two_ways();
        let mut planner = Planner::new();
        planner.generate_paths(&graph).unwrap();
        for path in planner.paths() {
            assert_eq!(path.first_unchecked(), Some(0));
        }
    }

    #[test]
    fn test_fork_indices_follow_arc_order() {
        let graph = build(
            GraphDescription::new("fan")
                .with_head("root")
                .node("root", 0)
                .node("a", 1)
                .node("b", 2)
                .node("c", 3)
                .arc("root", 0, ["a"])
                .arc("root", 0, ["b"])
                .arc("root", 0, ["c"]),
        );
        let mut planner = Planner::new();
        planner.generate_paths(&graph).unwrap();

        let leaves: Vec<String> = planner
            .paths()
            .iter()
            .map(|p| names(&graph, p)[1].clone())
            .collect();
        assert_eq!(leaves, vec!["a", "b", "c"]);
        for (i, path) in planner.paths().iter().enumerate() {
            assert_eq!(path.index(), i);
        }
    }

    #[test]
    fn test_no_head_yields_no_paths() {
        let graph = build(GraphDescription::new("empty"));
        let mut planner = Planner::new();
        assert_eq!(planner.generate_paths(&graph).unwrap(), 0);
        assert!(planner.is_generated());
        assert!(matches!(
            planner.suggest_next(&graph, Strategy::LongSighted),
            Err(Error::EmptyGraph)
        ));
    }

    #[test]
    fn test_path_limit() {
        let graph = two_ways();
        let mut planner = Planner::new().with_max_paths(Some(1));
        assert!(matches!(
            planner.generate_paths(&graph),
            Err(Error::PathLimitExceeded { limit: 1 })
        ));
        assert!(planner.paths().is_empty());
        assert!(!planner.is_generated());
    }

    #[test]
    fn test_suggest_before_generation() {
        let graph = two_ways();
        let planner = Planner::new();
        assert!(matches!(
            planner.suggest_next(&graph, Strategy::LongSighted),
            Err(Error::PathsNotGenerated)
        ));
        assert!(matches!(
            planner.find_optimal_path(),
            Err(Error::PathsNotGenerated)
        ));
    }

    #[test]
    fn test_optimal_ties_go_to_lowest_index() {
        let graph = two_ways();
        let mut planner = Planner::new();
        planner.generate_paths(&graph).unwrap();
        assert_eq!(planner.find_optimal_path().unwrap(), 0);

        let suggestion = planner.suggest_next(&graph, Strategy::LongSighted).unwrap();
        assert_eq!(suggestion.name, "X");
        assert_eq!(suggestion.path, 0);
    }

    #[test]
    fn test_update_paths_subtracts_benefit() {
        let mut graph = two_ways();
        let mut planner = Planner::new();
        planner.generate_paths(&graph).unwrap();

        let x = graph.find_by_name("X").unwrap();
        graph.solve_node(x).unwrap();
        let updates = planner.update_paths(&graph, x);

        // 3 (X) + 2 (max incoming) - 2 (arc used)
        assert_eq!(updates, vec![PathUpdate { path: 0, benefit: 3 }]);
        assert_eq!(planner.paths()[0].cost(), 7);
        assert_eq!(planner.paths()[1].cost(), 10);
        assert!(planner.paths()[0].is_checked(1));
        assert_eq!(planner.last_updates(), updates.as_slice());

        let next = planner.suggest_next(&graph, Strategy::LongSighted).unwrap();
        assert_eq!(next.name, "H");
    }

    #[test]
    fn test_short_sighted_follows_largest_benefit() {
        // head needs `shared` on both branches; `cheap` reaches it for 1, `dear` for 6
        let mut graph = build(
            GraphDescription::new("benefit")
                .with_head("head")
                .node("head", 1)
                .node("cheap", 1)
                .node("dear", 1)
                .node("shared", 2)
                .node("other", 1)
                .arc("head", 0, ["cheap"])
                .arc("head", 0, ["dear"])
                .arc("cheap", 1, ["shared"])
                .arc("dear", 6, ["other", "shared"]),
        );
        let mut planner = Planner::new();
        planner.generate_paths(&graph).unwrap();
        assert_eq!(planner.paths()[0].cost(), 1 + 1 + 1 + 2);
        assert_eq!(planner.paths()[1].cost(), 1 + 1 + 6 + 1 + 2);

        // before any solve, short-sighted behaves like long-sighted
        let first = planner.suggest_next(&graph, Strategy::ShortSighted).unwrap();
        assert_eq!(first.path, 0);

        let shared = graph.find_by_name("shared").unwrap();
        graph.solve_node(shared).unwrap();
        let updates = planner.update_paths(&graph, shared);
        assert_eq!(
            updates,
            vec![
                PathUpdate { path: 0, benefit: 2 + 6 - 1 },
                PathUpdate { path: 1, benefit: 2 },
            ]
        );

        assert_eq!(planner.select_path(Strategy::ShortSighted).unwrap(), 0);
        let next = planner.suggest_next(&graph, Strategy::ShortSighted).unwrap();
        assert_eq!(next.name, "cheap");
    }

    #[test]
    fn test_suggest_after_both_leaves_solved() {
        let mut graph = two_ways();
        let mut planner = Planner::new();
        planner.generate_paths(&graph).unwrap();

        let x = graph.find_by_name("X").unwrap();
        let y = graph.find_by_name("Y").unwrap();
        graph.solve_node(y).unwrap();
        planner.update_paths(&graph, y);
        graph.solve_node(x).unwrap();
        planner.update_paths(&graph, x);

        assert_eq!(planner.paths()[0].cost(), 7);
        assert_eq!(planner.paths()[1].cost(), 9);
        let next = planner.suggest_next(&graph, Strategy::LongSighted).unwrap();
        assert_eq!(next.name, "H");
        assert_eq!(next.path, 0);
    }

    #[test]
    fn test_no_suggestion_on_exhausted_path() {
        let graph = two_ways();
        let mut planner = Planner::new();
        planner.generate_paths(&graph).unwrap();

        let nodes = planner.paths()[0].nodes().to_vec();
        for node in nodes {
            planner.paths[0].record_solved(node, 0);
        }
        assert!(matches!(
            planner.suggest_next(&graph, Strategy::LongSighted),
            Err(Error::NoSuggestion(0))
        ));
    }

    #[test]
    fn test_apply_arc_cost_change() {
        let graph = two_ways();
        let mut planner = Planner::new();
        planner.generate_paths(&graph).unwrap();

        let head = graph.head().unwrap();
        assert_eq!(planner.apply_arc_cost_change(head, 1, -3), 1);
        assert_eq!(planner.paths()[0].cost(), 10);
        assert_eq!(planner.paths()[1].cost(), 7);
        assert_eq!(planner.find_optimal_path().unwrap(), 1);
    }

    #[test]
    fn test_zero_path_limit_rejects_single_path() {
        let graph = build(
            GraphDescription::new("single")
                .with_head("only")
                .node("only", 1),
        );
        let mut planner = Planner::new().with_max_paths(Some(0));
        assert!(matches!(
            planner.generate_paths(&graph),
            Err(Error::PathLimitExceeded { limit: 0 })
        ));
        assert!(!planner.is_generated());

        let mut planner = Planner::new().with_max_paths(Some(1));
        assert_eq!(planner.generate_paths(&graph).unwrap(), 1);
    }

    #[test]
    fn test_shared_descendant_charged_per_occurrence() {
        // `base` is reached once through `left` (arc 2) and once through `right` (arc 3)
        let mut graph = build(
            GraphDescription::new("diamond")
                .with_head("top")
                .node("top", 1)
                .node("left", 2)
                .node("right", 3)
                .node("base", 4)
                .arc("top", 1, ["left", "right"])
                .arc("left", 2, ["base"])
                .arc("right", 3, ["base"]),
        );
        let mut planner = Planner::new();
        planner.generate_paths(&graph).unwrap();
        assert_eq!(planner.paths()[0].cost(), 20);

        let base = graph.find_by_name("base").unwrap();
        graph.solve_node(base).unwrap();
        let updates = planner.update_paths(&graph, base);

        // (4 + 3 - 2) + (4 + 3 - 3)
        assert_eq!(updates, vec![PathUpdate { path: 0, benefit: 9 }]);
        assert_eq!(planner.paths()[0].cost(), 11);
        assert!(planner.paths()[0].is_checked(3));
        assert!(planner.paths()[0].is_checked(4));
    }

    #[test]
    fn test_update_skips_path_without_connecting_arc() {
        // `feeder` points at the head, but no path reaches the head through it
        let graph = build(
            GraphDescription::new("detached")
                .with_head("H")
                .node("H", 2)
                .node("X", 1)
                .node("feeder", 1)
                .arc("H", 1, ["X"])
                .arc("feeder", 5, ["H"]),
        );
        let mut planner = Planner::new();
        planner.generate_paths(&graph).unwrap();

        let head = graph.head().unwrap();
        assert_eq!(graph.overall_update(head), Some(5));
        assert!(planner.update_paths(&graph, head).is_empty());
        assert!(planner.last_updates().is_empty());
        assert_eq!(planner.paths()[0].cost(), 4);
        assert!(!planner.paths()[0].is_checked(0));
    }
}
