use super::pair::{MERGE_KEY, Pair};
use super::{CollectionStyle, Meta, Node, ScalarValue};
use crate::{Error, Result};

/// Identifies a map entry: a specific key node, or any key with this scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Key<'a> {
    Node(&'a Node),
    Value(ScalarValue),
}

impl<'a> From<&'a Node> for Key<'a> {
    fn from(node: &'a Node) -> Self {
        Key::Node(node)
    }
}

impl From<ScalarValue> for Key<'_> {
    fn from(value: ScalarValue) -> Self {
        Key::Value(value)
    }
}

impl From<&str> for Key<'_> {
    fn from(value: &str) -> Self {
        Key::Value(ScalarValue::from(value))
    }
}

impl From<String> for Key<'_> {
    fn from(value: String) -> Self {
        Key::Value(ScalarValue::Str(value))
    }
}

impl From<i64> for Key<'_> {
    fn from(value: i64) -> Self {
        Key::Value(ScalarValue::Int(value))
    }
}

impl From<i32> for Key<'_> {
    fn from(value: i32) -> Self {
        Key::Value(ScalarValue::Int(value.into()))
    }
}

impl From<bool> for Key<'_> {
    fn from(value: bool) -> Self {
        Key::Value(ScalarValue::Bool(value))
    }
}

impl Key<'_> {
    /// Identity first, then scalar-value equality. An absent key equals null.
    pub(crate) fn matches(&self, candidate: Option<&Node>) -> bool {
        let wanted = match self {
            Key::Node(node) => {
                if candidate.is_some_and(|c| std::ptr::eq(c, *node)) {
                    return true;
                }
                match node.scalar_value() {
                    Some(value) => value,
                    None => return false,
                }
            }
            Key::Value(value) => value,
        };
        match candidate {
            None => wanted.is_null(),
            Some(node) => node.scalar_value() == Some(wanted),
        }
    }

    fn matches_item(&self, item: &Node) -> bool {
        match item {
            Node::Pair(pair) => self.matches(pair.key.as_ref()),
            Node::Merge(_) => {
                let text = match self {
                    Key::Node(node) => node.scalar_value().and_then(ScalarValue::as_str),
                    Key::Value(value) => value.as_str(),
                };
                text == Some(MERGE_KEY)
            }
            _ => false,
        }
    }

    fn describe(&self) -> String {
        match self {
            Key::Node(node) => match node.scalar_value() {
                Some(value) => value.to_string(),
                None => format!("<{}>", node.kind_name()),
            },
            Key::Value(value) => value.to_string(),
        }
    }
}

/// Result of a lookup: the bare scalar when the value is one, the node otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Scalar(&'a ScalarValue),
    Node(&'a Node),
}

impl<'a> Lookup<'a> {
    pub(crate) fn of(node: &'a Node) -> Self {
        match node {
            Node::Scalar(s) => Lookup::Scalar(&s.value),
            other => Lookup::Node(other),
        }
    }
}

/// Ordered collection of pairs. Insertion order is the only order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    /// `Pair` or `Merge` nodes. Anything else is rejected when rendering.
    pub items: Vec<Node>,
    pub style: CollectionStyle,
    pub meta: Meta,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flow() -> Self {
        Self {
            style: CollectionStyle::Flow,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = &Pair> {
        self.items.iter().filter_map(Node::as_pair)
    }

    fn position<'k>(&self, key: &Key<'k>) -> Option<usize> {
        self.items.iter().position(|item| key.matches_item(item))
    }

    /// Appends a pair, a merge, or a bare key (as a value-less pair).
    ///
    /// Fails with [`Error::DuplicateKey`] and leaves the map untouched when the key
    /// is already present.
    pub fn add(&mut self, item: impl Into<Node>) -> Result<()> {
        let item = match item.into() {
            pair @ (Node::Pair(_) | Node::Merge(_)) => pair,
            key => Node::from(Pair::key_only(key)),
        };
        let key = match &item {
            Node::Pair(pair) => match &pair.key {
                Some(node) => Key::Node(node),
                None => Key::Value(ScalarValue::Null),
            },
            _ => Key::Value(ScalarValue::from(MERGE_KEY)),
        };
        if self.position(&key).is_some() {
            return Err(Error::DuplicateKey {
                key: key.describe(),
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Removes the entry for `key`. Returns whether one was found.
    pub fn delete<'k>(&mut self, key: impl Into<Key<'k>>) -> bool {
        match self.position(&key.into()) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Value for `key`, unwrapped to its primitive when it is a scalar.
    pub fn get<'k>(&self, key: impl Into<Key<'k>>) -> Option<Lookup<'_>> {
        self.get_node(key).map(Lookup::of)
    }

    /// Value node for `key`, kept wrapped.
    pub fn get_node<'k>(&self, key: impl Into<Key<'k>>) -> Option<&Node> {
        let index = self.position(&key.into())?;
        match &self.items[index] {
            Node::Pair(pair) => pair.value.as_ref(),
            Node::Merge(merge) => Some(&merge.value),
            _ => None,
        }
    }

    pub fn get_node_mut<'k>(&mut self, key: impl Into<Key<'k>>) -> Option<&mut Node> {
        let index = self.position(&key.into())?;
        match &mut self.items[index] {
            Node::Pair(pair) => pair.value.as_mut(),
            Node::Merge(merge) => Some(&mut merge.value),
            _ => None,
        }
    }

    pub fn has<'k>(&self, key: impl Into<Key<'k>>) -> bool {
        self.position(&key.into()).is_some()
    }

    /// Replaces the value of an existing entry, or appends a new pair.
    pub fn set(&mut self, key: impl Into<Node>, value: impl Into<Node>) {
        let key = key.into();
        let value = value.into();
        let index = self.position(&Key::Node(&key));
        match index.map(|i| &mut self.items[i]) {
            Some(Node::Pair(pair)) => pair.value = Some(value),
            Some(Node::Merge(merge)) => merge.value = value,
            _ => self.items.push(Node::from(Pair::new(key, value))),
        }
    }
}
