//! Graph descriptions: the parsed form a graph is built from.
//!
//! Two encodings are supported. The text format is a stream of
//! whitespace-separated tokens:
//!
//! ```text
//! <graph-name> <node-count> <head-name>
//! <node-name> <cost>                                    (node-count times)
//! <child-count> <parent-name> <arc-cost> <child-name>... (any number of hyperarcs)
//! ```
//!
//! The JSON format is the serde representation of [`GraphDescription`].

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

use log::{debug, info};

use crate::error::{Error, Result};

/// A node declaration: unique name and base cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    pub cost: u32,
}

/// A hyperarc declaration: owning node, cost and ordered AND-group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcSpec {
    pub parent: String,
    pub cost: u32,
    pub children: Vec<String>,
}

/// Everything needed to build an [`AoGraph`](crate::AoGraph).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDescription {
    pub name: String,
    #[serde(default)]
    pub head: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub arcs: Vec<ArcSpec>,
}

impl GraphDescription {
    /// Creates an empty description with no head.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the head node.
    pub fn with_head(mut self, head: impl Into<String>) -> Self {
        self.head = Some(head.into());
        self
    }

    /// Declares a node.
    pub fn node(mut self, name: impl Into<String>, cost: u32) -> Self {
        self.nodes.push(NodeSpec {
            name: name.into(),
            cost,
        });
        self
    }

    /// Declares a hyperarc from `parent` to `children`.
    pub fn arc<I, S>(mut self, parent: impl Into<String>, cost: u32, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arcs.push(ArcSpec {
            parent: parent.into(),
            cost,
            children: children.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Parses the whitespace-separated text format.
    pub fn parse_text(input: &str) -> Result<Self> {
        let mut tokens = Tokens::new(input);

        let name = tokens.word("graph name")?;
        let node_count = tokens.number("node count")? as usize;
        let head = tokens.word("head node name")?;

        let mut description = GraphDescription::new(name).with_head(head);
        for _ in 0..node_count {
            let node = tokens.word("node name")?;
            let cost = tokens.number("node cost")?;
            description.nodes.push(NodeSpec { name: node, cost });
        }

        while !tokens.is_empty() {
            let child_count = tokens.number("child count")? as usize;
            let parent = tokens.word("parent node name")?;
            let cost = tokens.number("hyperarc cost")?;
            let mut children = Vec::with_capacity(child_count);
            for _ in 0..child_count {
                children.push(tokens.word("child node name")?);
            }
            description.arcs.push(ArcSpec {
                parent,
                cost,
                children,
            });
        }

        debug!(
            "Parsed description '{}': {} nodes, {} hyperarcs",
            description.name,
            description.nodes.len(),
            description.arcs.len()
        );
        Ok(description)
    }

    /// Writes the description in the text format accepted by [`parse_text`](Self::parse_text).
    ///
    /// A description without a head cannot be written in this format.
    pub fn to_text(&self) -> Result<String> {
        let head = self.head.as_deref().ok_or(Error::EmptyGraph)?;
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = writeln!(out, "{} {} {}", self.name, self.nodes.len(), head);
        for node in &self.nodes {
            let _ = writeln!(out, "{} {}", node.name, node.cost);
        }
        for arc in &self.arcs {
            let _ = writeln!(out, "{} {} {}", arc.children.len(), arc.parent, arc.cost);
            for child in &arc.children {
                let _ = writeln!(out, "{}", child);
            }
        }
        Ok(out)
    }

    /// Reads a description from JSON.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Serializes the description as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a description from disk: JSON for `.json` files, text otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading graph description from file: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_json(&content)
        } else {
            Self::parse_text(&content)
        }
    }
}

struct Tokens<'a> {
    inner: std::iter::Peekable<std::str::SplitWhitespace<'a>>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.split_whitespace().peekable(),
            position: 0,
        }
    }

    fn is_empty(&mut self) -> bool {
        self.inner.peek().is_none()
    }

    fn word(&mut self, what: &str) -> Result<String> {
        let position = self.position;
        self.position += 1;
        self.inner
            .next()
            .map(str::to_string)
            .ok_or_else(|| Error::parse(position, format!("expected {}, found end of input", what)))
    }

    fn number(&mut self, what: &str) -> Result<u32> {
        let position = self.position;
        let token = self.word(what)?;
        token.parse::<u32>().map_err(|_| {
            Error::parse(
                position,
                format!("expected non-negative integer {}, found '{}'", what, token),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PENCIL: &str = "pencil 4 done
        done 5
        body 2
        lead 3
        shaft 1
        2 done 2
        body lead
        1 done 4
        shaft
    ";

    #[test]
    fn test_parse_text() {
        let desc = GraphDescription::parse_text(PENCIL).unwrap();
        assert_eq!(desc.name, "pencil");
        assert_eq!(desc.head.as_deref(), Some("done"));
        assert_eq!(desc.nodes.len(), 4);
        assert_eq!(desc.nodes[1], NodeSpec { name: "body".into(), cost: 2 });
        assert_eq!(desc.arcs.len(), 2);
        assert_eq!(desc.arcs[0].children, vec!["body", "lead"]);
        assert_eq!(desc.arcs[1].cost, 4);
    }

    #[test]
    fn test_parse_text_truncated() {
        let err = GraphDescription::parse_text("g 2 a a 1").unwrap_err();
        match err {
            Error::Parse { position, message } => {
                assert_eq!(position, 5);
                assert!(message.contains("node name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_text_negative_cost() {
        let err = GraphDescription::parse_text("g 1 a a -3").unwrap_err();
        assert!(matches!(err, Error::Parse { position: 4, .. }));
    }

    #[test]
    fn test_text_rewrite_is_stable() {
        let desc = GraphDescription::parse_text(PENCIL).unwrap();
        let text = desc.to_text().unwrap();
        assert_eq!(GraphDescription::parse_text(&text).unwrap(), desc);
    }

    #[test]
    fn test_to_text_requires_head() {
        let desc = GraphDescription::new("empty");
        assert!(matches!(desc.to_text(), Err(Error::EmptyGraph)));
    }

    #[test]
    fn test_json_head_defaults_to_none() {
        let desc = GraphDescription::from_json(r#"{"name": "bare"}"#).unwrap();
        assert_eq!(desc.name, "bare");
        assert!(desc.head.is_none());
        assert!(desc.nodes.is_empty());
    }

    #[test]
    fn test_from_file_picks_format() {
        let dir = tempfile::tempdir().unwrap();

        let text_path = dir.path().join("pencil.txt");
        std::fs::write(&text_path, PENCIL).unwrap();
        let from_text = GraphDescription::from_file(&text_path).unwrap();

        let json_path = dir.path().join("pencil.json");
        std::fs::write(&json_path, from_text.to_json().unwrap()).unwrap();
        let from_json = GraphDescription::from_file(&json_path).unwrap();

        assert_eq!(from_text, from_json);
    }

    #[test]
    fn test_from_missing_file() {
        let err = GraphDescription::from_file("/nonexistent/graph.txt").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
