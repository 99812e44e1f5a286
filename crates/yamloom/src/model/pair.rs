use super::{Meta, Node};
use crate::{Error, Result};

/// The reserved key that turns a pair into a merge import.
pub const MERGE_KEY: &str = "<<";

/// A key/value entry. Either side may be absent: `? a` has no value, `: 1` no key.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub key: Option<Node>,
    pub value: Option<Node>,
    pub meta: Meta,
}

impl Pair {
    pub fn new(key: impl Into<Node>, value: impl Into<Node>) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value.into()),
            meta: Meta::default(),
        }
    }

    /// A pair with a key and no value.
    pub fn key_only(key: impl Into<Node>) -> Self {
        Self {
            key: Some(key.into()),
            value: None,
            meta: Meta::default(),
        }
    }

    pub(crate) fn from_parts(key: Option<Node>, value: Option<Node>) -> Self {
        Self {
            key,
            value,
            meta: Meta::default(),
        }
    }
}

/// `<<: source`, importing the pairs of one or more maps.
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    /// A map, an alias to a map, or a sequence of those.
    pub value: Node,
    pub meta: Meta,
}

impl Merge {
    /// Fails with [`Error::MergeSourceNotMap`] when `value` cannot supply maps.
    ///
    /// Aliases are accepted here; whether they point at maps is checked when the
    /// merge is expanded.
    pub fn new(value: impl Into<Node>) -> Result<Self> {
        let value = value.into();
        check_source(&value)?;
        Ok(Self {
            value,
            meta: Meta::default(),
        })
    }

    /// Each merge source in order: the sequence's items, or the value itself.
    pub fn sources(&self) -> Vec<&Node> {
        match &self.value {
            Node::Seq(seq) => seq.items.iter().collect(),
            other => vec![other],
        }
    }
}

fn check_source(value: &Node) -> Result<()> {
    let is_source = |node: &Node| matches!(node, Node::Map(_) | Node::Alias(_));
    let valid = match value {
        Node::Seq(seq) => seq.items.iter().all(is_source),
        other => is_source(other),
    };
    if valid {
        Ok(())
    } else {
        Err(Error::MergeSourceNotMap)
    }
}
