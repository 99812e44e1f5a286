use rowan::{TextRange, TextSize};

use super::{MapBuilder, Resolver};
use crate::Result;
use crate::diagnostics::DiagnosticKind;
use crate::model::{CollectionStyle, Map, Node};
use crate::syntax::SyntaxKind::*;
use crate::syntax::ast::{self, FlowItem};

impl Resolver<'_, '_> {
    /// Pairs up the flat `{ k: v, ... }` item list.
    ///
    /// `next` is the indicator the map is waiting for: `{` first, `:` after a key
    /// or a separator, `,` after a value.
    pub(super) fn resolve_flow_map(&mut self, map: &ast::FlowMap) -> Result<Map> {
        let items: Vec<FlowItem> = map.items().collect();
        let mut builder = MapBuilder::default();
        let mut key: Option<Option<Node>> = None;
        let mut key_range = map.as_cst().text_range();
        let mut key_start: Option<TextSize> = None;
        let mut explicit = false;
        let mut next = BraceOpen;

        for (i, item) in items.iter().enumerate() {
            if key.as_ref().is_some_and(Option::is_some)
                && let Some(start) = key_start
                && self.check_key_length(start, item.text_range().start())
            {
                key_start = None;
            }

            match item {
                FlowItem::Indicator(token) => {
                    let kind = token.kind();
                    let range = token.text_range();
                    if kind == Question && key.is_none() && !explicit {
                        explicit = true;
                        next = Colon;
                        continue;
                    }
                    if kind == Colon {
                        if key.is_none() {
                            key = Some(None);
                            key_range = range;
                        }
                        if next == Colon {
                            next = Comma;
                            continue;
                        }
                    } else {
                        if explicit {
                            if key.is_none() && kind != Comma {
                                key = Some(None);
                                key_range = range;
                            }
                            explicit = false;
                        }
                        if let Some(pending) = key.take() {
                            let pair = self.make_pair(pending, None)?;
                            builder.push(pair, key_range);
                            key_start = None;
                            if kind == Comma {
                                next = Colon;
                                continue;
                            }
                        }
                    }
                    if kind == BraceClose {
                        if i == items.len() - 1 {
                            continue;
                        }
                    } else if kind == next {
                        next = Colon;
                        continue;
                    }
                    self.unexpected_flow_map_token(range);
                }
                FlowItem::Comment(token) => builder.push_comment(token),
                FlowItem::Node(node) => {
                    let range = node.text_range();
                    match key.take() {
                        None => {
                            if next == Comma {
                                self.diagnostics
                                    .report(DiagnosticKind::MissingSeparator, range)
                                    .message("`,` between flow map entries")
                                    .emit();
                            }
                            key = Some(Some(self.resolve_node(node)?));
                            key_range = range;
                            key_start = (!explicit).then_some(range.start());
                        }
                        Some(pending) => {
                            if next != Comma {
                                self.diagnostics
                                    .report(DiagnosticKind::MissingIndicator, range)
                                    .message("`:` in flow map entry")
                                    .emit();
                            }
                            let value = self.resolve_node(node)?;
                            let pair = self.make_pair(pending, Some(value))?;
                            builder.push(pair, key_range);
                            key_start = None;
                            explicit = false;
                        }
                    }
                }
            }
        }

        if let Some(pending) = key {
            let pair = self.make_pair(pending, None)?;
            builder.push(pair, key_range);
        }
        Ok(builder.finish(self, CollectionStyle::Flow))
    }

    fn unexpected_flow_map_token(&mut self, range: TextRange) {
        let text = self.text(range);
        self.diagnostics
            .report(DiagnosticKind::UnexpectedFlowMapToken, range)
            .message(format!("`{text}`"))
            .emit();
    }
}
