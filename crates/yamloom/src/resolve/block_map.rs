use rowan::TextSize;

use super::{MapBuilder, Resolver};
use crate::Result;
use crate::diagnostics::DiagnosticKind;
use crate::model::{CollectionStyle, Map, Node};
use crate::syntax::ast::{self, MapItem, ValueNode};

/// Key read but not yet paired. `Some(None)` is a pending null key.
type PendingKey = Option<Option<Node>>;

impl Resolver<'_, '_> {
    pub(super) fn resolve_block_map(&mut self, map: &ast::BlockMap) -> Result<Map> {
        let items: Vec<MapItem> = map.items().collect();
        let mut builder = MapBuilder::default();
        let mut pending: PendingKey = None;
        let mut pending_range = map.as_cst().text_range();
        let mut key_start: Option<TextSize> = None;

        for (i, item) in items.iter().enumerate() {
            match item {
                MapItem::Comment(token) => builder.push_comment(token),
                MapItem::ExplicitKey(marker) => {
                    if let Some(key) = pending.take() {
                        let pair = self.make_pair(key, None)?;
                        builder.push(pair, pending_range);
                    }
                    pending = Some(self.resolve_marker(marker.node(), marker.comments())?);
                    pending_range = marker.as_cst().text_range();
                    key_start = None;
                }
                MapItem::ExplicitValue(marker) => {
                    let key = match pending.take() {
                        Some(key) => key,
                        None => {
                            pending_range = marker.as_cst().text_range();
                            None
                        }
                    };
                    let value = self.resolve_marker(marker.node(), marker.comments())?;
                    if let (Some(node), Some(indicator)) = (marker.node(), marker.indicator())
                        && self.is_compact_map(&node, indicator.text_range().end())
                    {
                        self.report(DiagnosticKind::CompactNestedMap, node.content_range());
                    }
                    let pair = self.make_pair(key, value)?;
                    builder.push(pair, pending_range);
                    if let Some(start) = key_start.take() {
                        self.check_key_length(start, marker.as_cst().text_range().start());
                    }
                }
                MapItem::Node(node) => {
                    if let Some(key) = pending.take() {
                        let pair = self.make_pair(key, None)?;
                        builder.push(pair, pending_range);
                    }
                    let range = node.text_range();
                    if !matches!(items.get(i + 1), Some(MapItem::ExplicitValue(_))) {
                        self.report(DiagnosticKind::ImplicitKeyWithoutValue, range);
                    }
                    if self.spans_lines(range) {
                        self.report(DiagnosticKind::MultilineImplicitKey, range);
                    }
                    pending = Some(Some(self.resolve_node(node)?));
                    pending_range = range;
                    key_start = Some(range.start());
                }
            }
        }

        if let Some(key) = pending {
            let pair = self.make_pair(key, None)?;
            builder.push(pair, pending_range);
        }
        Ok(builder.finish(self, CollectionStyle::Block))
    }

    /// A block map value that starts on the line of its `:` indicator.
    fn is_compact_map(&self, node: &ValueNode, indicator_end: TextSize) -> bool {
        if !matches!(node, ValueNode::BlockMap(_)) {
            return false;
        }
        let content = node.content_range();
        content.start() >= indicator_end
            && !self.spans_lines(rowan::TextRange::new(indicator_end, content.start()))
    }
}
