//! # aograph - AND-OR graph planner
//!
//! Decision support for hierarchical task decomposition. A task is described
//! as an AND-OR graph: every node is a step, each of its hyperarcs is one
//! alternative way (OR) of carrying it out, and the children of a hyperarc
//! are sub-steps that must all be done (AND).
//!
//! The planner enumerates every complete strategy through the graph, ranks
//! them by cost and, as steps are reported done, keeps the costs up to date
//! and suggests which open step to perform next.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Session                           │
//! │        load │ solve │ suggest │ describe                 │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ┌──────────────────┐        ┌────────────────────────┐  │
//! │  │     AoGraph      │        │        Planner         │  │
//! │  │                  │        │                        │  │
//! │  │ • node arena     │───────►│ • path generation      │  │
//! │  │ • hyperarcs      │        │ • cost repropagation   │  │
//! │  │ • feasibility    │        │ • long/short-sighted   │  │
//! │  └──────────────────┘        └────────────────────────┘  │
//! │                                                          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use aograph::{GraphDescription, Session, SolveOutcome, Strategy};
//!
//! let description = GraphDescription::new("pencil")
//!     .with_head("pencil")
//!     .node("pencil", 5)
//!     .node("wood_body", 3)
//!     .node("plastic_body", 1)
//!     .arc("pencil", 2, ["wood_body"])
//!     .arc("pencil", 4, ["plastic_body"]);
//!
//! let mut session = Session::default();
//! assert_eq!(session.load(&description).unwrap(), 2);
//!
//! let next = session.suggest(Some(Strategy::LongSighted)).unwrap();
//! assert_eq!(next.name, "wood_body");
//!
//! session.solve("wood_body").unwrap();
//! assert_eq!(session.suggest(None).unwrap().name, "pencil");
//! assert_eq!(session.solve("pencil").unwrap(), SolveOutcome::GraphComplete);
//! ```

pub mod config;
pub mod description;
pub mod error;
pub mod graph;
pub mod node;
pub mod path;
pub mod planner;
pub mod report;
pub mod session;

pub use config::PlannerConfig;
pub use description::{ArcSpec, GraphDescription, NodeSpec};
pub use error::{Error, ErrorKind, Result};
pub use graph::{compute_feasibility, AoGraph};
pub use node::{HyperArc, Node, NodeId};
pub use path::Path;
pub use planner::{PathUpdate, Planner, Strategy, Suggestion};
pub use report::{ArcReport, NodeReport, PathReport, Snapshot, StepReport};
pub use session::{Session, SolveEvent, SolveOutcome};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
