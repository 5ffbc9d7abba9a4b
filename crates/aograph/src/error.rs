//! Error types for the AND-OR graph planner.

use thiserror::Error;

/// A specialized `Result` type for planner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classes of failure reported by the planner.
///
/// None of them is fatal: every failing call leaves the session in the state
/// it had before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A query was issued before its precondition held.
    Usage,
    /// The input names an unknown or invalid item, or asks for an illegal transition.
    Domain,
    /// Nothing to report right now; the caller may keep issuing operations.
    Advisory,
}

/// Defines the errors that can occur while loading, solving or querying a graph.
#[derive(Error, Debug)]
pub enum Error {
    /// No graph has been loaded into the session yet.
    #[error("no graph loaded")]
    NotLoaded,

    /// A graph is already loaded; reset the session before loading another one.
    #[error("graph '{0}' is already loaded")]
    AlreadyLoaded(String),

    /// Suggestions were requested before any path was generated.
    #[error("paths have not been generated")]
    PathsNotGenerated,

    /// The optimal path was requested while some paths are still incomplete.
    #[error("path {0} is not complete")]
    PathsIncomplete(usize),

    /// The named node does not exist in the graph.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// The node cannot be solved because none of its prerequisites are met.
    #[error("node '{0}' is not feasible")]
    InfeasibleSolve(String),

    /// The node has already been marked as solved.
    #[error("node '{0}' is already solved")]
    AlreadySolved(String),

    /// Two nodes share the same name.
    #[error("duplicate node: {0}")]
    DuplicateNode(String),

    /// The node is reachable from itself through a chain of hyperarcs.
    #[error("cycle detected through node '{0}'")]
    CycleDetected(String),

    /// The node has no hyperarc at the given position.
    #[error("node '{node}' has no hyperarc {index}")]
    ArcNotFound { node: String, index: usize },

    /// Path generation would produce more paths than allowed.
    #[error("path limit exceeded: more than {limit} paths")]
    PathLimitExceeded { limit: usize },

    /// The textual graph description is malformed.
    #[error("parse error at token {position}: {message}")]
    Parse { position: usize, message: String },

    /// The chosen path has no node that is both open and feasible.
    #[error("no suggestion available on path {0}")]
    NoSuggestion(usize),

    /// The head node is solved; there is nothing left to suggest.
    #[error("graph is already solved")]
    GraphSolved,

    /// The graph has no head node, so there are no paths to navigate.
    #[error("graph is empty")]
    EmptyGraph,

    /// An error from the underlying I/O system.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error while reading or writing JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotLoaded
            | Error::AlreadyLoaded(_)
            | Error::PathsNotGenerated
            | Error::PathsIncomplete(_) => ErrorKind::Usage,
            Error::NoSuggestion(_) | Error::GraphSolved | Error::EmptyGraph => {
                ErrorKind::Advisory
            }
            _ => ErrorKind::Domain,
        }
    }

    /// Returns `true` for conditions that are reported but not exceptional.
    pub fn is_advisory(&self) -> bool {
        self.kind() == ErrorKind::Advisory
    }

    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            position,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InfeasibleSolve("H".to_string());
        assert_eq!(err.to_string(), "node 'H' is not feasible");

        let err = Error::parse(4, "expected integer");
        assert!(err.to_string().contains("token 4"));
        assert!(err.to_string().contains("expected integer"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::PathsNotGenerated.kind(), ErrorKind::Usage);
        assert_eq!(Error::PathsIncomplete(2).kind(), ErrorKind::Usage);
        assert_eq!(Error::NodeNotFound("x".into()).kind(), ErrorKind::Domain);
        assert_eq!(Error::InfeasibleSolve("x".into()).kind(), ErrorKind::Domain);
        assert!(Error::GraphSolved.is_advisory());
        assert!(Error::NoSuggestion(0).is_advisory());
        assert!(Error::EmptyGraph.is_advisory());
        assert!(!Error::NotLoaded.is_advisory());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("{invalid}");
        let error: Error = json_result.unwrap_err().into();
        assert!(matches!(error, Error::Json(_)));
    }
}
