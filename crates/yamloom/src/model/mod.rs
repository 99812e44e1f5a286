//! Semantic document tree.
//!
//! A closed set of node variants, each carrying [`Meta`]: properties, comments and
//! a provenance handle back into the document it was parsed from. Collections own
//! their items; aliases refer to anchors by name only.

mod alias;
mod fingerprint;
mod map;
mod pair;
mod scalar;
mod seq;

#[cfg(test)]
mod map_tests;
#[cfg(test)]
mod seq_tests;

pub use alias::Alias;
pub(crate) use alias::AliasTable;
pub use map::{Key, Lookup, Map};
pub use pair::{MERGE_KEY, Merge, Pair};
pub(crate) use scalar::format_float;
pub use scalar::{Scalar, ScalarStyle, ScalarValue};
pub use seq::Seq;

/// Layout of a collection in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollectionStyle {
    #[default]
    Block,
    Flow,
}

/// Index into a document's table of source ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OriginId {
    pub(crate) document: u32,
    pub(crate) index: u32,
}

/// Where a node came from, and what it looked like when it was parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provenance {
    pub origin: OriginId,
    pub fingerprint: u64,
}

/// Properties and comments shared by every node.
#[derive(Debug, Clone, Default)]
pub struct Meta {
    /// Anchor name without the `&` sigil.
    pub anchor: Option<String>,
    /// Tag as written, e.g. `!!str`.
    pub tag: Option<String>,
    /// Comment lines before the node, without their `#`.
    pub comment_before: Option<String>,
    /// Trailing comment, without its `#`.
    pub comment: Option<String>,
    /// Source positions of the `comment` lines of a parsed collection.
    pub(crate) comment_slots: Vec<CommentSlot>,
    pub(crate) provenance: Option<Provenance>,
}

/// Where a collection's comment line sat among the collection's items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CommentSlot {
    /// Number of items before the comment.
    pub(crate) after: usize,
    /// On the same line as the item before it.
    pub(crate) same_line: bool,
}

impl PartialEq for Meta {
    fn eq(&self, other: &Self) -> bool {
        self.anchor == other.anchor
            && self.tag == other.tag
            && self.comment_before == other.comment_before
            && self.comment == other.comment
    }
}

impl Meta {
    pub fn provenance(&self) -> Option<Provenance> {
        self.provenance
    }

    /// Appends a collection comment line, remembering where it was written.
    pub(crate) fn push_comment_at(&mut self, line: &str, slot: CommentSlot) {
        push_line(&mut self.comment, line);
        self.comment_slots.push(slot);
    }

    /// Comment lines with their positions, while every line still has one.
    ///
    /// Empty once `comment` has been edited so that the lines no longer line up.
    pub(crate) fn placed_comments(&self) -> Vec<(CommentSlot, &str)> {
        let Some(comment) = &self.comment else {
            return Vec::new();
        };
        let lines: Vec<&str> = comment.split('\n').collect();
        if lines.len() != self.comment_slots.len() {
            return Vec::new();
        }
        self.comment_slots.iter().copied().zip(lines).collect()
    }
}

fn push_line(slot: &mut Option<String>, line: &str) {
    match slot {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(line);
        }
        None => *slot = Some(line.to_string()),
    }
}

/// A member of the semantic tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Map(Map),
    Seq(Seq),
    Pair(Box<Pair>),
    Merge(Box<Merge>),
    Alias(Alias),
}

impl Node {
    pub fn null() -> Self {
        Node::Scalar(Scalar::new(ScalarValue::Null))
    }

    pub fn meta(&self) -> &Meta {
        match self {
            Node::Scalar(n) => &n.meta,
            Node::Map(n) => &n.meta,
            Node::Seq(n) => &n.meta,
            Node::Pair(n) => &n.meta,
            Node::Merge(n) => &n.meta,
            Node::Alias(n) => &n.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Node::Scalar(n) => &mut n.meta,
            Node::Map(n) => &mut n.meta,
            Node::Seq(n) => &mut n.meta,
            Node::Pair(n) => &mut n.meta,
            Node::Merge(n) => &mut n.meta,
            Node::Alias(n) => &mut n.meta,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::Map(_) => "map",
            Node::Seq(_) => "sequence",
            Node::Pair(_) => "pair",
            Node::Merge(_) => "merge",
            Node::Alias(_) => "alias",
        }
    }

    /// The primitive value of a scalar node.
    pub fn scalar_value(&self) -> Option<&ScalarValue> {
        match self {
            Node::Scalar(s) => Some(&s.value),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&Seq> {
        match self {
            Node::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq_mut(&mut self) -> Option<&mut Seq> {
        match self {
            Node::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<&Pair> {
        match self {
            Node::Pair(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&Alias> {
        match self {
            Node::Alias(a) => Some(a),
            _ => None,
        }
    }

    /// Direct children in document order. Pair keys precede their values.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Scalar(_) | Node::Alias(_) => Vec::new(),
            Node::Map(m) => m.items.iter().collect(),
            Node::Seq(s) => s.items.iter().collect(),
            Node::Pair(p) => p.key.iter().chain(p.value.iter()).collect(),
            Node::Merge(m) => vec![&m.value],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Vec<&mut Node> {
        match self {
            Node::Scalar(_) | Node::Alias(_) => Vec::new(),
            Node::Map(m) => m.items.iter_mut().collect(),
            Node::Seq(s) => s.items.iter_mut().collect(),
            Node::Pair(p) => {
                let pair = p.as_mut();
                pair.key.iter_mut().chain(pair.value.iter_mut()).collect()
            }
            Node::Merge(m) => vec![&mut m.value],
        }
    }
}

impl From<Scalar> for Node {
    fn from(value: Scalar) -> Self {
        Node::Scalar(value)
    }
}

impl From<ScalarValue> for Node {
    fn from(value: ScalarValue) -> Self {
        Node::Scalar(Scalar::new(value))
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Scalar(Scalar::from(value))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Scalar(Scalar::from(value))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Scalar(Scalar::from(value))
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Node::Scalar(Scalar::from(i64::from(value)))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Scalar(Scalar::from(value))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Scalar(Scalar::from(value))
    }
}

impl From<Map> for Node {
    fn from(value: Map) -> Self {
        Node::Map(value)
    }
}

impl From<Seq> for Node {
    fn from(value: Seq) -> Self {
        Node::Seq(value)
    }
}

impl From<Pair> for Node {
    fn from(value: Pair) -> Self {
        Node::Pair(Box::new(value))
    }
}

impl From<Merge> for Node {
    fn from(value: Merge) -> Self {
        Node::Merge(Box::new(value))
    }
}

impl From<Alias> for Node {
    fn from(value: Alias) -> Self {
        Node::Alias(value)
    }
}
