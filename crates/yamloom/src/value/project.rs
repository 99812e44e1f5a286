//! Tree to value projection, including merge expansion.
//!
//! Merges are expanded in two passes. The first projects every item of a map,
//! staging each merge's imported entries in a side buffer; the second rebuilds
//! the entry list, splicing the staged entries in at the merge's position.

use indexmap::IndexMap;

use super::Value;
use crate::model::{AliasTable, Map, Merge, Node};
use crate::options::ToValueOptions;
use crate::{Error, Result};

type Entries = IndexMap<Value, Value>;

/// One item of a map after the first pass.
enum Staged {
    Pair(Value, Value),
    /// Entries imported by a merge, minus keys the map sets explicitly.
    Merged(Entries),
}

pub(crate) struct Projector<'a> {
    options: &'a ToValueOptions,
    aliases: AliasTable<'a>,
    alias_count: u32,
}

impl<'a> Projector<'a> {
    pub(crate) fn new(root: &'a Node, options: &'a ToValueOptions) -> Self {
        Self {
            options,
            aliases: AliasTable::build(root),
            alias_count: 0,
        }
    }

    pub(crate) fn project(&mut self, node: &'a Node) -> Result<Value> {
        match node {
            Node::Scalar(scalar) => Ok(Value::from(&scalar.value)),
            Node::Seq(seq) => seq
                .items
                .iter()
                .map(|item| self.project(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Seq),
            Node::Map(map) => {
                let entries = self.map_entries(&map.items)?;
                Ok(self.finish_map(entries))
            }
            // Outside a map, a pair or merge projects as a map of its own.
            Node::Pair(_) | Node::Merge(_) => {
                let entries = self.map_entries(std::slice::from_ref(node))?;
                Ok(self.finish_map(entries))
            }
            Node::Alias(alias) => {
                let target = self.follow(alias)?;
                self.project(target)
            }
        }
    }

    fn follow(&mut self, alias: &crate::model::Alias) -> Result<&'a Node> {
        self.alias_count += 1;
        if let Some(limit) = self.options.max_alias_count
            && self.alias_count > limit
        {
            return Err(Error::AliasLimitExceeded);
        }
        self.aliases.get(alias).ok_or_else(|| Error::UnresolvedAlias {
            name: alias.name.clone(),
        })
    }

    fn finish_map(&self, entries: Entries) -> Value {
        if self.options.map_as_map {
            return Value::Map(entries);
        }
        let mut object = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            object.entry(key.key_string()).or_insert(value);
        }
        Value::Object(object)
    }

    /// Entries of a map in order. The first pair of a key wins.
    fn map_entries(&mut self, items: &'a [Node]) -> Result<Entries> {
        let mut staged = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Node::Pair(pair) => {
                    let key = self.project_optional(pair.key.as_ref())?;
                    let value = self.project_optional(pair.value.as_ref())?;
                    staged.push(Staged::Pair(key, value));
                }
                Node::Merge(merge) => staged.push(Staged::Merged(self.expand(merge)?)),
                other => {
                    return Err(Error::NotAPair {
                        found: other.kind_name().to_string(),
                    });
                }
            }
        }

        let explicit: Vec<&Value> = staged
            .iter()
            .filter_map(|s| match s {
                Staged::Pair(key, _) => Some(key),
                Staged::Merged(_) => None,
            })
            .collect();
        let mut overridden = Vec::new();
        for (index, s) in staged.iter().enumerate() {
            if let Staged::Merged(entries) = s {
                for key in entries.keys() {
                    if explicit.contains(&key) {
                        overridden.push((index, key.clone()));
                    }
                }
            }
        }
        for (index, key) in overridden {
            if let Staged::Merged(entries) = &mut staged[index] {
                entries.shift_remove(&key);
            }
        }

        let mut entries = Entries::with_capacity(staged.len());
        for s in staged {
            match s {
                Staged::Pair(key, value) => {
                    entries.entry(key).or_insert(value);
                }
                Staged::Merged(merged) => {
                    for (key, value) in merged {
                        entries.entry(key).or_insert(value);
                    }
                }
            }
        }
        Ok(entries)
    }

    /// Entries imported by one merge. Sources are applied last to first, each
    /// overwriting what later sources staged, so earlier sources take precedence.
    fn expand(&mut self, merge: &'a Merge) -> Result<Entries> {
        let sources = merge.sources();
        let mut merged = Entries::new();
        for source in sources.into_iter().rev() {
            let source = match source {
                Node::Alias(alias) => self.follow(alias)?,
                other => other,
            };
            let Node::Map(Map { items, .. }) = source else {
                return Err(Error::MergeSourceNotMap);
            };
            for (key, value) in self.map_entries(items)? {
                merged.insert(key, value);
            }
        }
        tracing::trace!(entries = merged.len(), "expanded merge");
        Ok(merged)
    }

    fn project_optional(&mut self, node: Option<&'a Node>) -> Result<Value> {
        node.map_or(Ok(Value::Null), |node| self.project(node))
    }
}
