//! Structural hashes used to tell untouched nodes from edited ones.
//!
//! The resolver stamps every node with the fingerprint of its content. A node
//! whose current fingerprint still matches the stamp is pristine, and the text
//! projector may reuse its source text verbatim.

use std::hash::{Hash, Hasher};

use crc32fast::Hasher as Crc32;

use super::{CollectionStyle, Meta, Node, ScalarValue};

impl Node {
    /// Hash of this node's own content combined with `child` hashes of its children.
    fn fingerprint_with(&self, mut child: impl FnMut(&Node) -> u64) -> u64 {
        let mut hasher = Crc32::new();
        std::mem::discriminant(self).hash(&mut hasher);
        hash_meta(self.meta(), &mut hasher);
        match self {
            Node::Scalar(scalar) => {
                hash_value(&scalar.value, &mut hasher);
                scalar.style.hash(&mut hasher);
                scalar.source.hash(&mut hasher);
            }
            Node::Alias(alias) => alias.name.hash(&mut hasher),
            Node::Map(map) => hash_style(map.style, &mut hasher),
            Node::Seq(seq) => hash_style(seq.style, &mut hasher),
            Node::Pair(pair) => {
                // `? a` and `a: ` differ only in which side is present.
                pair.key.is_some().hash(&mut hasher);
                pair.value.is_some().hash(&mut hasher);
            }
            Node::Merge(_) => {}
        }
        let children = self.children();
        children.len().hash(&mut hasher);
        for node in children {
            child(node).hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Structural hash of the whole subtree. Provenance does not contribute.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint_with(Node::fingerprint)
    }

    /// Records the current fingerprint of every node that carries provenance.
    ///
    /// Returns this node's fingerprint. Children are stamped first so each node
    /// is hashed once.
    pub(crate) fn stamp(&mut self) -> u64 {
        let child_prints: Vec<u64> = self.children_mut().into_iter().map(Node::stamp).collect();
        let mut prints = child_prints.into_iter();
        // Children are visited in the same order by `children()` and `children_mut()`.
        let print = self.fingerprint_with(|_| prints.next().unwrap_or_default());
        if let Some(provenance) = self.meta_mut().provenance.as_mut() {
            provenance.fingerprint = print;
        }
        print
    }

    /// True when the node was parsed and has not changed since.
    pub fn is_pristine(&self) -> bool {
        self.meta()
            .provenance
            .is_some_and(|p| p.fingerprint == self.fingerprint())
    }
}

fn hash_meta(meta: &Meta, hasher: &mut impl Hasher) {
    meta.anchor.hash(hasher);
    meta.tag.hash(hasher);
    meta.comment_before.hash(hasher);
    meta.comment.hash(hasher);
}

fn hash_value(value: &ScalarValue, hasher: &mut impl Hasher) {
    std::mem::discriminant(value).hash(hasher);
    match value {
        ScalarValue::Null => {}
        ScalarValue::Bool(b) => b.hash(hasher),
        ScalarValue::Int(i) => i.hash(hasher),
        ScalarValue::Float(x) => x.to_bits().hash(hasher),
        ScalarValue::Str(s) => s.hash(hasher),
    }
}

fn hash_style(style: CollectionStyle, hasher: &mut impl Hasher) {
    style.hash(hasher);
}
