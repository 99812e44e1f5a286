//! Tree to source text.
//!
//! Untouched nodes are printed from the source text they were parsed from;
//! everything else is printed canonically. Block output is built as lines that
//! are relative to the column of their owner, so nesting is a matter of
//! prefixing.


use rowan::TextRange;

use crate::model::{
    CommentSlot, Meta, Node, Pair, Scalar, ScalarStyle, ScalarValue, format_float,
};
use crate::options::TextOptions;
use crate::resolve::scalar::resolve_plain;
use crate::{Error, Result};

/// Where a node's original text can be found.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SourceMap<'a> {
    pub(crate) source: &'a str,
    pub(crate) origins: &'a [TextRange],
    pub(crate) document: u32,
}

impl<'a> SourceMap<'a> {
    /// Original text of a node that has not changed since it was parsed.
    fn pristine_text(&self, node: &Node) -> Option<&'a str> {
        let provenance = node.meta().provenance()?;
        if provenance.origin.document != self.document || !node.is_pristine() {
            return None;
        }
        let range = *self.origins.get(provenance.origin.index as usize)?;
        self.source.get(std::ops::Range::<usize>::from(range))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    /// Fits on the owner's line.
    Inline,
    /// Block scalar: body lines must always be indented under the owner.
    Scalar,
    /// Block collection: body lines may sit at the owner's column at the top level.
    Collection,
}

/// A node rendered in block context.
#[derive(Debug)]
struct Block {
    /// Continues the owner's line, after `key: ` or `- `.
    head: String,
    /// Lines below, relative to the column of the nested content.
    body: Vec<String>,
    kind: BlockKind,
}

impl Block {
    fn inline(head: String) -> Self {
        Self {
            head,
            body: Vec::new(),
            kind: BlockKind::Inline,
        }
    }
}

pub(crate) struct Printer<'a> {
    sources: Option<SourceMap<'a>>,
    step: usize,
}

impl<'a> Printer<'a> {
    pub(crate) fn new(sources: Option<SourceMap<'a>>, options: &TextOptions) -> Self {
        Self {
            sources,
            step: options.indent.max(1),
        }
    }

    /// Document body: leading comment, root node and trailing comment, newline-terminated.
    pub(crate) fn document(
        &self,
        root: Option<&Node>,
        comment_before: Option<&str>,
        comment: Option<&str>,
    ) -> Result<String> {
        let mut lines = Vec::new();
        push_comment_lines(&mut lines, comment_before);
        if let Some(root) = root {
            push_comment_lines(&mut lines, root.meta().comment_before.as_deref());
            let block = self.block(root)?;
            let prefix = match block.kind {
                BlockKind::Scalar => " ".repeat(self.step),
                BlockKind::Inline | BlockKind::Collection => String::new(),
            };
            if !block.head.is_empty() || block.kind != BlockKind::Collection {
                lines.push(block.head);
            }
            lines.extend(indent_lines(block.body, &prefix));
        }
        push_comment_lines(&mut lines, comment);

        if lines.is_empty() {
            return Ok(String::new());
        }
        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }

    /// Renders a single node in block context.
    pub(crate) fn node(&self, node: &Node) -> Result<String> {
        self.document(Some(node), None, None)
    }

    fn block(&self, node: &Node) -> Result<Block> {
        let properties = properties(node.meta());
        let placed = node.meta().placed_comments();
        let mut comments_placed = false;
        let mut block = match node {
            Node::Map(map) if !map.items.is_empty() && !is_flow(map.style) => {
                let entries = map
                    .items
                    .iter()
                    .map(|item| self.block_entry(item))
                    .collect::<Result<Vec<_>>>()?;
                comments_placed = !placed.is_empty();
                Block {
                    head: String::new(),
                    body: interleave_comments(entries, &placed),
                    kind: BlockKind::Collection,
                }
            }
            Node::Seq(seq) if !seq.items.is_empty() && !is_flow(seq.style) => {
                let entries = seq
                    .items
                    .iter()
                    .map(|item| self.block_seq_item(item))
                    .collect::<Result<Vec<_>>>()?;
                comments_placed = !placed.is_empty();
                Block {
                    head: String::new(),
                    body: interleave_comments(entries, &placed),
                    kind: BlockKind::Collection,
                }
            }
            Node::Scalar(scalar) if self.is_block_scalar(node, scalar) => {
                self.block_scalar(node, scalar)
            }
            Node::Scalar(scalar) => Block::inline(
                self.pristine_inline(node)
                    .map_or_else(|| scalar_text(scalar, false), str::to_string),
            ),
            Node::Pair(_) | Node::Merge(_) => Block {
                head: String::new(),
                body: self.block_entry(node)?,
                kind: BlockKind::Collection,
            },
            _ => Block::inline(self.flow_content(node)?),
        };

        if !properties.is_empty() {
            block.head = if block.head.is_empty() {
                properties
            } else {
                format!("{properties} {}", block.head)
            };
        }
        if let Some(comment) = &node.meta().comment
            && !comments_placed
        {
            let single_line = !comment.contains('\n');
            if block.kind == BlockKind::Inline && single_line && !block.head.is_empty() {
                block.head.push_str(" #");
                block.head.push_str(comment);
            } else {
                push_comment_lines(&mut block.body, Some(comment));
                if block.kind == BlockKind::Inline {
                    block.kind = BlockKind::Collection;
                }
            }
        }
        Ok(block)
    }

    /// Lines of one map entry. Anything but a pair or merge is rejected.
    fn block_entry(&self, item: &Node) -> Result<Vec<String>> {
        let (key, value) = match item {
            Node::Pair(pair) => (self.pair_key(pair)?, pair.value.as_ref()),
            Node::Merge(merge) => ("<<".to_string(), Some(&merge.value)),
            other => {
                return Err(Error::NotAPair {
                    found: other.kind_name().to_string(),
                });
            }
        };

        let mut lines = Vec::new();
        push_comment_lines(&mut lines, item.meta().comment_before.as_deref());
        if let Node::Pair(pair) = item
            && let Some(key) = &pair.key
        {
            push_comment_lines(&mut lines, key.meta().comment_before.as_deref());
        }
        let Some(value) = value else {
            lines.push(format!("{key}:"));
            return Ok(lines);
        };
        push_comment_lines(&mut lines, value.meta().comment_before.as_deref());

        let block = self.block(value)?;
        if block.head.is_empty() {
            lines.push(format!("{key}:"));
        } else {
            lines.push(format!("{key}: {}", block.head));
        }
        lines.extend(indent_lines(block.body, &" ".repeat(self.step)));
        Ok(lines)
    }

    fn pair_key(&self, pair: &Pair) -> Result<String> {
        match &pair.key {
            Some(key) => self.flow(key),
            None => Ok(String::new()),
        }
    }

    /// Lines of one `- item` entry.
    fn block_seq_item(&self, item: &Node) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        push_comment_lines(&mut lines, item.meta().comment_before.as_deref());
        let block = self.block(item)?;
        let mut body = block.body.into_iter();
        let compact = block.kind == BlockKind::Collection && block.head.is_empty();
        match (compact, block.head.is_empty()) {
            (true, _) => match body.next() {
                Some(first) => lines.push(format!("- {first}")),
                None => lines.push("-".to_string()),
            },
            (false, true) => lines.push("-".to_string()),
            (false, false) => lines.push(format!("- {}", block.head)),
        }
        lines.extend(indent_lines(body.collect(), "  "));
        Ok(lines)
    }

    fn is_block_scalar(&self, node: &Node, scalar: &Scalar) -> bool {
        if !matches!(scalar.style, ScalarStyle::Literal | ScalarStyle::Folded) {
            return false;
        }
        if self.pristine_inline(node).is_some() {
            return false;
        }
        matches!(scalar.value, ScalarValue::Str(_))
    }

    /// `|` or `>` scalars. Untouched ones keep their header and line structure.
    fn block_scalar(&self, node: &Node, scalar: &Scalar) -> Block {
        if let Some(text) = self.sources.and_then(|s| s.pristine_text(node))
            && let Some(block) = reindent_block_scalar(text)
        {
            return block;
        }
        let text = scalar.value.as_str().unwrap_or_default();
        literal_block(text, self.step)
    }

    /// Node in flow notation, properties included.
    fn flow(&self, node: &Node) -> Result<String> {
        let properties = properties(node.meta());
        let content = self.flow_content(node)?;
        Ok(match (properties.is_empty(), content.is_empty()) {
            (true, _) => content,
            (false, true) => properties,
            (false, false) => format!("{properties} {content}"),
        })
    }

    fn flow_content(&self, node: &Node) -> Result<String> {
        if let Some(text) = self.pristine_inline(node) {
            return Ok(text.to_string());
        }
        match node {
            Node::Scalar(scalar) => Ok(scalar_text(scalar, true)),
            Node::Alias(alias) => Ok(format!("*{}", alias.name)),
            Node::Seq(seq) => {
                let items = seq
                    .items
                    .iter()
                    .map(|item| self.flow(item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("[{}]", items.join(", ")))
            }
            Node::Map(map) => {
                let items = map
                    .items
                    .iter()
                    .map(|item| match item {
                        Node::Pair(_) | Node::Merge(_) => self.flow_entry(item),
                        other => Err(Error::NotAPair {
                            found: other.kind_name().to_string(),
                        }),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{{{}}}", items.join(", ")))
            }
            Node::Pair(_) | Node::Merge(_) => self.flow_entry(node),
        }
    }

    fn flow_entry(&self, item: &Node) -> Result<String> {
        match item {
            Node::Merge(merge) => Ok(format!("<<: {}", self.flow(&merge.value)?)),
            Node::Pair(pair) => {
                let key = self.pair_key(pair)?;
                match (&pair.value, key.is_empty()) {
                    (None, true) => Ok("?".to_string()),
                    (None, false) => Ok(format!("? {key}")),
                    (Some(value), _) => {
                        let value = self.flow(value)?;
                        Ok(format!("{key}: {value}").trim_end().to_string())
                    }
                }
            }
            _ => unreachable!("flow_entry is only called with pairs and merges"),
        }
    }

    /// Source text of an untouched node that fits on one line.
    fn pristine_inline(&self, node: &Node) -> Option<&'a str> {
        let text = self.sources?.pristine_text(node)?;
        let single_line = !text.contains(['\n', '\r']);
        let flow_or_scalar = match node {
            Node::Scalar(_) | Node::Alias(_) => true,
            Node::Map(map) => is_flow(map.style),
            Node::Seq(seq) => is_flow(seq.style),
            Node::Pair(_) | Node::Merge(_) => false,
        };
        (single_line && flow_or_scalar).then_some(text)
    }
}

fn is_flow(style: crate::model::CollectionStyle) -> bool {
    style == crate::model::CollectionStyle::Flow
}

fn properties(meta: &Meta) -> String {
    let mut out = String::new();
    if let Some(anchor) = &meta.anchor {
        out.push('&');
        out.push_str(anchor);
    }
    if let Some(tag) = &meta.tag {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(tag);
    }
    out
}

/// Joins the lines of a block collection's entries, putting comments back among
/// the entries they followed when parsed. A comment that shared a line with a
/// one-line entry stays on that line.
fn interleave_comments(entries: Vec<Vec<String>>, placed: &[(CommentSlot, &str)]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = placed.iter().peekable();
    for (i, entry) in entries.into_iter().enumerate() {
        while let Some((_, text)) = pending.next_if(|(slot, _)| slot.after <= i) {
            lines.push(format!("#{text}"));
        }
        let one_line = entry.len() == 1;
        lines.extend(entry);
        if one_line
            && let Some((_, text)) =
                pending.next_if(|(slot, _)| slot.same_line && slot.after == i + 1)
            && let Some(last) = lines.last_mut()
        {
            last.push_str(" #");
            last.push_str(text);
        }
    }
    lines.extend(pending.map(|(_, text)| format!("#{text}")));
    lines
}

fn push_comment_lines(lines: &mut Vec<String>, comment: Option<&str>) {
    let Some(comment) = comment else {
        return;
    };
    lines.extend(comment.split('\n').map(|line| format!("#{line}")));
}

fn indent_lines(lines: Vec<String>, prefix: &str) -> impl Iterator<Item = String> + '_ {
    lines.into_iter().map(move |line| {
        if line.is_empty() {
            line
        } else {
            format!("{prefix}{line}")
        }
    })
}

/// Single-line text for a scalar, quoting strings that would not read back as themselves.
fn scalar_text(scalar: &Scalar, in_flow: bool) -> String {
    match &scalar.value {
        ScalarValue::Null => {
            if scalar.source.as_deref() == Some("") {
                String::new()
            } else {
                "null".to_string()
            }
        }
        ScalarValue::Bool(b) => b.to_string(),
        ScalarValue::Int(i) => i.to_string(),
        ScalarValue::Float(x) => format_float(*x),
        ScalarValue::Str(s) => match scalar.style {
            ScalarStyle::Plain if is_plain_safe(s, in_flow) => s.clone(),
            ScalarStyle::SingleQuoted if !s.chars().any(char::is_control) => {
                format!("'{}'", s.replace('\'', "''"))
            }
            _ => double_quoted(s),
        },
    }
}

/// Whether `s` written plain parses back to the same string.
fn is_plain_safe(s: &str, in_flow: bool) -> bool {
    let Some(first) = s.chars().next() else {
        return false;
    };
    if s.starts_with([' ', '\t']) || s.ends_with([' ', '\t']) {
        return false;
    }
    if "-?:,[]{}#&*!|>'\"%@`".contains(first) {
        return false;
    }
    if s.chars().any(char::is_control) || s.contains(": ") || s.contains(" #") || s.ends_with(':')
    {
        return false;
    }
    if in_flow && s.contains([',', '[', ']', '{', '}']) {
        return false;
    }
    if s.starts_with("---") || s.starts_with("...") {
        return false;
    }
    matches!(resolve_plain(s), ScalarValue::Str(_))
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let code = c as u32;
                if code <= 0xff {
                    out.push_str(&format!("\\x{code:02x}"));
                } else {
                    out.push_str(&format!("\\u{code:04x}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Literal block scalar for `text`, with the chomping indicator that preserves
/// its trailing line breaks.
fn literal_block(text: &str, step: usize) -> Block {
    let trailing = text.len() - text.trim_end_matches('\n').len();
    let chomp = match trailing {
        0 => "-",
        1 => "",
        _ => "+",
    };
    let content = match trailing {
        0 => text,
        _ => &text[..text.len() - 1],
    };
    let indicator = if content.starts_with([' ', '\t']) || content.starts_with('\n') {
        step.to_string()
    } else {
        String::new()
    };
    Block {
        head: format!("|{indicator}{chomp}"),
        body: content.split('\n').map(str::to_string).collect(),
        kind: BlockKind::Scalar,
    }
}

/// Original block scalar text with its body moved to column zero.
/// `None` when the header fixes the indentation explicitly.
fn reindent_block_scalar(text: &str) -> Option<Block> {
    let (header, body) = text.split_once('\n').unwrap_or((text, ""));
    let indicator = header.split_whitespace().next().unwrap_or(header);
    if indicator.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let lines: Vec<&str> = body.lines().collect();
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.bytes().take_while(|b| *b == b' ').count())
        .min()
        .unwrap_or(0);
    let body = lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line[indent..].to_string()
            }
        })
        .collect();
    Some(Block {
        head: header.trim_end().to_string(),
        body,
        kind: BlockKind::Scalar,
    })
}
