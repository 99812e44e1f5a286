use std::collections::HashMap;

use super::{Meta, Node};

/// `*name`: a reference to the closest preceding node anchored as `name`.
///
/// Only the name is stored. The document resolves it on demand, so an alias whose
/// anchor was removed is an ordinary `None`, not a dangling reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub name: String,
    pub meta: Meta,
}

impl Alias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: Meta::default(),
        }
    }
}

/// Alias targets of one tree, bound in document order.
///
/// An anchor becomes visible once its node is complete, so an alias inside the
/// node it names stays unbound and cycles cannot form. Aliases are keyed by
/// address; the table borrows the tree, which therefore cannot change under it.
#[derive(Debug, Default)]
pub(crate) struct AliasTable<'a> {
    targets: HashMap<*const Alias, &'a Node>,
}

impl<'a> AliasTable<'a> {
    pub(crate) fn build(root: &'a Node) -> Self {
        let mut table = Self::default();
        let mut anchors = HashMap::new();
        table.bind(root, &mut anchors);
        table
    }

    fn bind(&mut self, node: &'a Node, anchors: &mut HashMap<&'a str, &'a Node>) {
        if let Node::Alias(alias) = node
            && let Some(target) = anchors.get(alias.name.as_str())
        {
            self.targets.insert(alias as *const Alias, *target);
        }
        for child in node.children() {
            self.bind(child, anchors);
        }
        if let Some(anchor) = &node.meta().anchor {
            anchors.insert(anchor, node);
        }
    }

    pub(crate) fn get(&self, alias: &Alias) -> Option<&'a Node> {
        self.targets.get(&(alias as *const Alias)).copied()
    }
}
