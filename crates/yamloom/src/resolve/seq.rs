use rowan::{TextRange, TextSize};

use super::{Resolver, comment_slot, comment_text};
use crate::Result;
use crate::diagnostics::DiagnosticKind;
use crate::model::{Node, Pair, Scalar, ScalarValue, Seq};
use crate::syntax::SyntaxKind::{self, *};
use crate::syntax::ast::{self, FlowItem, SeqEntry};

impl Resolver<'_, '_> {
    pub(super) fn resolve_block_seq(&mut self, seq: &ast::BlockSeq) -> Result<Seq> {
        let mut out = Seq::new();
        for entry in seq.entries() {
            match entry {
                SeqEntry::Comment(token) => out
                    .meta
                    .push_comment_at(comment_text(&token), comment_slot(&token, out.items.len())),
                SeqEntry::Item(item) => {
                    let node = self.resolve_marker(item.node(), item.comments())?;
                    out.items.push(node.unwrap_or_else(empty_scalar));
                }
            }
        }
        Ok(out)
    }

    /// Flow sequence items, where `k: v` and `? k` form single-pair entries.
    ///
    /// `next` is the indicator the sequence is waiting for; `None` means a node or
    /// `?` may come.
    pub(super) fn resolve_flow_seq(&mut self, seq: &ast::FlowSeq) -> Result<Seq> {
        let items: Vec<FlowItem> = seq.items().collect();
        let mut out = Seq::flow();
        let mut key: Option<Option<Node>> = None;
        let mut key_start: Option<TextSize> = None;
        let mut explicit = false;
        let mut next: Option<SyntaxKind> = Some(BracketOpen);
        let mut last_range = seq.as_cst().text_range();

        for (i, item) in items.iter().enumerate() {
            match item {
                FlowItem::Indicator(token) => {
                    let kind = token.kind();
                    let range = token.text_range();
                    if kind != Colon && (explicit || key.is_some()) {
                        let pending = match key.take() {
                            Some(pending) => pending,
                            // `? k` then a separator: the key was pushed as an item.
                            None if next.is_some() => out.items.pop(),
                            None => None,
                        };
                        out.items.push(Node::from(Pair::from_parts(pending, None)));
                        explicit = false;
                        key_start = None;
                    }

                    if Some(kind) == next {
                        next = None;
                    } else if next.is_none() && kind == Question {
                        explicit = true;
                    } else if next != Some(BracketOpen) && kind == Colon && key.is_none() {
                        if next == Some(Comma) {
                            let previous = out.items.pop();
                            if matches!(previous, Some(Node::Pair(_))) {
                                self.report(DiagnosticKind::ChainedFlowPair, range);
                            }
                            if !explicit && let Some(start) = key_start {
                                self.check_key_length(start, range.start());
                                if self.spans_lines(TextRange::new(start, range.start())) {
                                    self.report(DiagnosticKind::MultilineImplicitKey, last_range);
                                }
                            }
                            key = Some(previous);
                        } else {
                            key = Some(None);
                        }
                        key_start = None;
                        explicit = false;
                        next = None;
                    } else if next == Some(BracketOpen) || kind != BracketClose || i < items.len() - 1
                    {
                        let text = self.text(range);
                        self.diagnostics
                            .report(DiagnosticKind::UnexpectedFlowSeqToken, range)
                            .message(format!("`{text}`"))
                            .emit();
                    }
                }
                FlowItem::Comment(token) => out
                    .meta
                    .push_comment_at(comment_text(token), comment_slot(token, out.items.len())),
                FlowItem::Node(node) => {
                    let range = node.text_range();
                    if next.is_some() {
                        self.diagnostics
                            .report(DiagnosticKind::MissingSeparator, range)
                            .message("`,` between flow sequence items")
                            .emit();
                    }
                    let value = self.resolve_node(node)?;
                    match key.take() {
                        None => {
                            out.items.push(value);
                            last_range = range;
                        }
                        Some(pending) => {
                            out.items
                                .push(Node::from(Pair::from_parts(pending, Some(value))));
                        }
                    }
                    key_start = Some(range.start());
                    next = Some(Comma);
                }
            }
        }

        if let Some(pending) = key {
            out.items.push(Node::from(Pair::from_parts(pending, None)));
        }
        Ok(out)
    }
}

/// `-` with nothing after it.
fn empty_scalar() -> Node {
    Node::Scalar(Scalar {
        source: Some(String::new()),
        ..Scalar::new(ScalarValue::Null)
    })
}
