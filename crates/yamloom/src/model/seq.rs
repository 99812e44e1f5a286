use super::map::Lookup;
use super::{CollectionStyle, Meta, Node};
use crate::{Error, Result};

/// Ordered list of nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Seq {
    pub items: Vec<Node>,
    pub style: CollectionStyle,
    pub meta: Meta,
}

impl Seq {
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

    pub fn push(&mut self, node: impl Into<Node>) {
        self.items.push(node.into());
    }

    /// Item at `index`, unwrapped to its primitive when it is a scalar.
    pub fn get(&self, index: usize) -> Option<Lookup<'_>> {
        self.items.get(index).map(Lookup::of)
    }

    pub fn get_node(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    pub fn get_node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.items.get_mut(index)
    }

    pub fn has(&self, index: usize) -> bool {
        index < self.items.len()
    }

    /// Replaces the item at `index`. Appending through `set` is not allowed;
    /// use [`Seq::push`].
    pub fn set(&mut self, index: usize, node: impl Into<Node>) -> Result<()> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;
        *slot = node.into();
        Ok(())
    }

    pub fn delete(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.items.remove(index);
            true
        } else {
            false
        }
    }
}
