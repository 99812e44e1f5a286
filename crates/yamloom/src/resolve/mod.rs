//! Resolution of the syntax tree into the semantic document model.
//!
//! One [`Resolver`] handles one document. It walks the typed syntax views,
//! dispatching on [`ValueNode`], and runs a state machine per collection form:
//! block maps, flow maps and flow sequences each pair up their flat item lists
//! differently. Data problems are reported to the document's diagnostics and
//! resolution continues with a best-effort tree. Only a malformed merge source is
//! a hard error.

mod block_map;
mod flow_map;
pub(crate) mod scalar;
mod seq;

#[cfg(test)]
mod scalar_tests;

use std::collections::HashSet;

use rowan::{TextRange, TextSize};

use crate::Result;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::{
    self, CollectionStyle, CommentSlot, Key, MERGE_KEY, Map, Merge, Node, OriginId, Pair,
    Provenance, Scalar, ScalarStyle, ScalarValue,
};
use crate::options::ParseOptions;
use crate::syntax::ast::{self, ValueNode};
use crate::syntax::lexer::scan_quoted;
use crate::syntax::{SyntaxKind, SyntaxToken};
use scalar::FlowScalar;

/// Semantic content of one document.
#[derive(Debug)]
pub(crate) struct ResolvedDocument {
    pub(crate) root: Option<Node>,
    pub(crate) comment_before: Option<String>,
    pub(crate) comment: Option<String>,
    /// Source ranges indexed by `OriginId::index`.
    pub(crate) origins: Vec<TextRange>,
}

pub(crate) struct Resolver<'s, 'd> {
    source: &'s str,
    options: &'s ParseOptions,
    diagnostics: &'d mut Diagnostics,
    document: u32,
    origins: Vec<TextRange>,
    /// Anchors whose nodes are complete. An alias may only refer to these.
    anchors: HashSet<String>,
}

impl<'s, 'd> Resolver<'s, 'd> {
    pub(crate) fn new(
        source: &'s str,
        options: &'s ParseOptions,
        diagnostics: &'d mut Diagnostics,
        document: u32,
    ) -> Self {
        Self {
            source,
            options,
            diagnostics,
            document,
            origins: Vec::new(),
            anchors: HashSet::new(),
        }
    }

    pub(crate) fn resolve_document(mut self, document: &ast::Document) -> Result<ResolvedDocument> {
        let (before, after) = document.comments();
        let mut root = document
            .root()
            .map(|node| self.resolve_node(&node))
            .transpose()?;
        if let Some(root) = root.as_mut() {
            root.stamp();
        }

        tracing::debug!(
            document = self.document,
            nodes = self.origins.len(),
            anchors = self.anchors.len(),
            "resolved document"
        );
        Ok(ResolvedDocument {
            root,
            comment_before: join_comments(&before),
            comment: join_comments(&after),
            origins: self.origins,
        })
    }

    pub(super) fn resolve_node(&mut self, node: &ValueNode) -> Result<Node> {
        let properties = node.properties();
        let tag = properties.tag_text();
        let mut resolved = match node {
            ValueNode::Plain(plain) => Node::Scalar(self.resolve_plain(plain, tag.as_deref())),
            ValueNode::QuotedSingle(quoted) => {
                Node::Scalar(self.resolve_quoted(quoted.token(), FlowScalar::SingleQuoted))
            }
            ValueNode::QuotedDouble(quoted) => {
                Node::Scalar(self.resolve_quoted(quoted.token(), FlowScalar::DoubleQuoted))
            }
            ValueNode::BlockLiteral(block) => Node::Scalar(self.resolve_block_scalar(
                block.header(),
                block.body(),
                ScalarStyle::Literal,
            )),
            ValueNode::BlockFolded(block) => Node::Scalar(self.resolve_block_scalar(
                block.header(),
                block.body(),
                ScalarStyle::Folded,
            )),
            ValueNode::BlockMap(map) => Node::Map(self.resolve_block_map(map)?),
            ValueNode::FlowMap(map) => Node::Map(self.resolve_flow_map(map)?),
            ValueNode::BlockSeq(seq) => Node::Seq(self.resolve_block_seq(seq)?),
            ValueNode::FlowSeq(seq) => Node::Seq(self.resolve_flow_seq(seq)?),
            ValueNode::Alias(alias) => Node::Alias(self.resolve_alias(alias)),
        };

        let meta = resolved.meta_mut();
        meta.anchor = properties.anchor_name();
        meta.tag = tag;
        meta.provenance = Some(Provenance {
            origin: self.origin(node.content_range()),
            fingerprint: 0,
        });
        if let Some(anchor) = &meta.anchor {
            self.anchors.insert(anchor.clone());
        }
        Ok(resolved)
    }

    /// Resolves the node of a `?`, `:` or `-` marker. Comments between the
    /// indicator and the node become the node's leading comment.
    pub(super) fn resolve_marker(
        &mut self,
        node: Option<ValueNode>,
        comments: impl Iterator<Item = SyntaxToken>,
    ) -> Result<Option<Node>> {
        let comments: Vec<SyntaxToken> = comments.collect();
        let Some(node) = node else {
            return Ok(None);
        };
        let mut resolved = self.resolve_node(&node)?;
        if let Some(comment) = join_comments(&comments) {
            resolved.meta_mut().comment_before = Some(comment);
        }
        Ok(Some(resolved))
    }

    fn origin(&mut self, range: TextRange) -> OriginId {
        let index = self.origins.len() as u32;
        self.origins.push(range);
        OriginId {
            document: self.document,
            index,
        }
    }

    pub(super) fn text(&self, range: TextRange) -> &'s str {
        &self.source[range]
    }

    pub(super) fn spans_lines(&self, range: TextRange) -> bool {
        self.text(range).contains('\n')
    }

    fn resolve_plain(&mut self, plain: &ast::Plain, tag: Option<&str>) -> Scalar {
        let raw = plain.value_range().map_or("", |range| self.text(range));
        let folded = if raw.contains(['\n', '\r']) {
            scalar::fold_flow(raw, FlowScalar::Plain, TextSize::default()).0
        } else {
            raw.to_string()
        };
        let value = if forces_string(tag) {
            ScalarValue::Str(folded)
        } else {
            scalar::resolve_plain(&folded)
        };
        Scalar {
            value,
            style: ScalarStyle::Plain,
            source: Some(raw.to_string()),
            meta: Default::default(),
        }
    }

    fn resolve_quoted(&mut self, token: Option<SyntaxToken>, style: FlowScalar) -> Scalar {
        let scalar_style = if style == FlowScalar::SingleQuoted {
            ScalarStyle::SingleQuoted
        } else {
            ScalarStyle::DoubleQuoted
        };
        let Some(token) = token else {
            return Scalar::new(String::new()).with_style(scalar_style);
        };

        let raw = token.text();
        let start = token.text_range().start();
        let (_, terminated) = scan_quoted(self.source, usize::from(start));
        let end = if terminated { raw.len() - 1 } else { raw.len() };
        let inner = &raw[1..end];

        let (value, invalid) = scalar::fold_flow(inner, style, start + TextSize::from(1));
        for range in invalid {
            let escape = self.text(range);
            self.diagnostics
                .report(DiagnosticKind::InvalidEscape, range)
                .message(format!("`{escape}`"))
                .emit();
        }

        Scalar {
            value: ScalarValue::Str(value),
            style: scalar_style,
            source: Some(raw.to_string()),
            meta: Default::default(),
        }
    }

    fn resolve_block_scalar(
        &mut self,
        header: Option<SyntaxToken>,
        body: Option<SyntaxToken>,
        style: ScalarStyle,
    ) -> Scalar {
        let Some(header) = header else {
            return Scalar::new(String::new()).with_style(style);
        };
        let body_text = body.as_ref().map_or("", |b| b.text());
        let header_start = usize::from(header.text_range().start());
        let line_start = self.source[..header_start]
            .rfind('\n')
            .map_or(0, |i| i + 1);
        let base_indent = self.source[line_start..header_start]
            .bytes()
            .take_while(|b| *b == b' ')
            .count();

        let end = body
            .as_ref()
            .map_or(header.text_range().end(), |b| b.text_range().end());
        let source_range = TextRange::new(header.text_range().start(), end);
        Scalar {
            value: ScalarValue::Str(scalar::block_scalar(header.text(), body_text, base_indent)),
            style,
            source: Some(self.text(source_range).to_string()),
            meta: Default::default(),
        }
    }

    fn resolve_alias(&mut self, alias: &ast::Alias) -> model::Alias {
        let name = alias.name().unwrap_or_default();
        if !self.anchors.contains(&name) {
            self.diagnostics
                .report(DiagnosticKind::UndefinedAlias, alias.as_cst().text_range())
                .message(name.as_str())
                .emit();
        }
        model::Alias::new(name)
    }

    /// Builds a map entry. With merging enabled a `<<` key becomes a [`Merge`].
    pub(super) fn make_pair(&mut self, key: Option<Node>, value: Option<Node>) -> Result<Node> {
        if self.options.merge && key.as_ref().is_some_and(is_merge_key) {
            let merge = Merge::new(value.unwrap_or_else(Node::null))?;
            tracing::trace!(sources = merge.sources().len(), "kept merge for lazy expansion");
            return Ok(Node::from(merge));
        }
        Ok(Node::from(Pair::from_parts(key, value)))
    }

    /// Warns when the implicit key starting at `key_start` runs past the length limit at `end`.
    /// Returns whether it did.
    pub(super) fn check_key_length(&mut self, key_start: TextSize, end: TextSize) -> bool {
        if end <= key_start {
            return false;
        }
        let range = TextRange::new(key_start, end);
        let text = self.text(range);
        if text.chars().count() <= self.options.max_key_length {
            return false;
        }
        let preview: String = text.chars().take(16).collect();
        self.diagnostics
            .report(DiagnosticKind::KeyTooLong, range)
            .message(format!("{preview}..."))
            .emit();
        true
    }

    pub(super) fn report(&mut self, kind: DiagnosticKind, range: TextRange) {
        self.diagnostics.report(kind, range).emit();
    }
}

fn forces_string(tag: Option<&str>) -> bool {
    matches!(tag, Some("!" | "!!str"))
}

fn is_merge_key(key: &Node) -> bool {
    match key {
        Node::Scalar(scalar) => {
            scalar.style == ScalarStyle::Plain && scalar.value.as_str() == Some(MERGE_KEY)
        }
        _ => false,
    }
}

pub(super) fn comment_text(token: &SyntaxToken) -> &str {
    debug_assert_eq!(token.kind(), SyntaxKind::Comment);
    &token.text()[1..]
}

/// Position of a comment inside a collection that has `items` items so far.
pub(super) fn comment_slot(token: &SyntaxToken, items: usize) -> CommentSlot {
    let before = std::iter::successors(token.prev_token(), SyntaxToken::prev_token)
        .find(|t| t.kind() != SyntaxKind::Whitespace);
    let same_line = before.is_some_and(|t| !t.kind().is_trivia());
    CommentSlot {
        after: items,
        same_line: items > 0 && same_line,
    }
}

fn join_comments(tokens: &[SyntaxToken]) -> Option<String> {
    if tokens.is_empty() {
        return None;
    }
    Some(
        tokens
            .iter()
            .map(comment_text)
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Items of a map under construction, each with the source range that identifies it.
#[derive(Debug, Default)]
pub(super) struct MapBuilder {
    items: Vec<Node>,
    ranges: Vec<TextRange>,
    comments: Vec<(String, CommentSlot)>,
}

impl MapBuilder {
    pub(super) fn push(&mut self, item: Node, range: TextRange) {
        self.items.push(item);
        self.ranges.push(range);
    }

    pub(super) fn push_comment(&mut self, token: &SyntaxToken) {
        let slot = comment_slot(token, self.items.len());
        self.comments.push((comment_text(token).to_string(), slot));
    }

    /// Reports repeated keys and assembles the map. The first pair of a key is kept.
    pub(super) fn finish(self, resolver: &mut Resolver<'_, '_>, style: CollectionStyle) -> Map {
        let mut duplicate = vec![false; self.items.len()];
        for (i, item) in self.items.iter().enumerate() {
            let Node::Pair(pair) = item else { continue };
            if duplicate[i] {
                continue;
            }
            let key = match &pair.key {
                Some(node) => Key::Node(node),
                None => Key::Value(ScalarValue::Null),
            };
            let mut reported = false;
            for (j, other) in self.items.iter().enumerate().skip(i + 1) {
                let Node::Pair(other) = other else { continue };
                if !key.matches(other.key.as_ref()) {
                    continue;
                }
                duplicate[j] = true;
                if !reported {
                    reported = true;
                    let name = pair
                        .key
                        .as_ref()
                        .and_then(Node::scalar_value)
                        .map_or_else(|| "null".to_string(), ToString::to_string);
                    resolver
                        .diagnostics
                        .report(DiagnosticKind::DuplicateKey, self.ranges[j])
                        .message(name)
                        .emit();
                }
            }
        }

        let mut map = Map {
            items: self.items,
            style,
            meta: Default::default(),
        };
        for (comment, slot) in &self.comments {
            map.meta.push_comment_at(comment, *slot);
        }
        map
    }
}
