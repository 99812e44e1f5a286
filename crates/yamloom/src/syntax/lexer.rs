//! Lexer for YAML source text.
//!
//! Produces span-based tokens without storing text - text is sliced from source only when needed.
//!
//! YAML tokenization depends on context: `-`, `?` and `:` are indicators only when
//! followed by whitespace, `#` starts a comment only after whitespace, flow indicators
//! are literal text outside flow collections, and quotes open a scalar only where a
//! node may start. Logos recognises the context-free atoms at the current offset; the
//! [`Lexer`] decides whether an atom is meaningful here and otherwise scans scalar text
//! by hand. Block scalar bodies are captured whole, up to the first line indented at or
//! below the column of the construct that owns them.
//!
//! ## Error handling
//!
//! Characters that YAML forbids (C0 controls other than tab and line breaks) are
//! coalesced into single `Garbage` tokens.

use logos::Logos;
use rowan::TextRange;
use std::ops::Range;

use super::cst::SyntaxKind;

/// Zero-copy token: kind + span, text retrieved via [`token_text`] when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
        Self { kind, span }
    }
}

fn range_to_text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

/// Tokenizes source into a vector of span-based tokens.
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).run()
}

/// Retrieves the text slice for a token. O(1) slice into source.
#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[std::ops::Range::<usize>::from(token.span)]
}

/// Byte length of a quoted scalar starting at `start`, and whether its closing quote was found.
pub(crate) fn scan_quoted(source: &str, start: usize) -> (usize, bool) {
    let bytes = source.as_bytes();
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if quote == b'"' => i += 2,
            b'\'' if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') => i += 2,
            b if b == quote => return (i + 1 - start, true),
            _ => i += 1,
        }
    }
    (source.len() - start, false)
}

fn is_blank(c: Option<u8>) -> bool {
    matches!(c, None | Some(b' ' | b'\t' | b'\n' | b'\r'))
}

fn is_flow_char(c: u8) -> bool {
    matches!(c, b',' | b'[' | b']' | b'{' | b'}')
}

/// `:` or `?` followed by this byte acts as an indicator.
fn ends_indicator(c: Option<u8>, in_flow: bool) -> bool {
    is_blank(c) || (in_flow && c.is_some_and(is_flow_char))
}

fn is_forbidden(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r') && (c as u32) < 0x20 || c == '\u{7f}'
}

struct Lexer<'s> {
    source: &'s str,
    pos: usize,
    tokens: Vec<Token>,
    flow_depth: u32,
    /// Offset where the current line begins.
    line_offset: usize,
    /// Nothing but indentation seen so far on this line.
    line_start: bool,
    last_significant: Option<SyntaxKind>,
    /// Column a block scalar body must be indented past (-1 at the document top level).
    block_parent: isize,
    /// Column of the node that follows the last `-`/`?` on this line.
    entry_col: usize,
    entry_pending: bool,
    pending_block: Option<isize>,
}

impl<'s> Lexer<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
            flow_depth: 0,
            line_offset: 0,
            line_start: true,
            last_significant: None,
            block_parent: -1,
            entry_col: 0,
            entry_pending: false,
            pending_block: None,
        }
    }

    fn run(mut self) -> Vec<Token> {
        if self.source.starts_with('\u{feff}') {
            let len = '\u{feff}'.len_utf8();
            self.tokens.push(Token::new(
                SyntaxKind::Whitespace,
                range_to_text_range(0..len),
            ));
            self.pos = len;
            self.line_offset = len;
        }
        while self.pos < self.source.len() {
            self.step();
        }
        self.tokens
    }

    fn rest(&self) -> &'s str {
        &self.source[self.pos..]
    }

    fn column(&self) -> usize {
        self.pos - self.line_offset
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(offset).copied()
    }

    fn in_flow(&self) -> bool {
        self.flow_depth > 0
    }

    fn at_node_start(&self) -> bool {
        use SyntaxKind::*;
        self.line_start
            || matches!(
                self.last_significant,
                None | Some(
                    Dash | Question
                        | Colon
                        | Comma
                        | BracketOpen
                        | BraceOpen
                        | Anchor
                        | Tag
                        | DocStart
                        | DocEnd
                        | Directive
                )
            )
    }

    fn step(&mut self) {
        use SyntaxKind::*;

        let col = self.column();
        if col == 0
            && let Some(kind) = self.document_marker()
        {
            self.flow_depth = 0;
            self.pending_block = None;
            self.emit(kind, 3);
            // A root node after the marker may be indented at any column.
            self.block_parent = -1;
            return;
        }

        let Some(c) = self.rest().chars().next() else {
            return;
        };
        if is_forbidden(c) {
            self.garbage();
            return;
        }

        let mut lexer = SyntaxKind::lexer(self.rest());
        let atom = match lexer.next() {
            Some(Ok(kind)) => Some((kind, lexer.span().end)),
            _ => None,
        };

        match atom {
            Some((Whitespace, len)) => self.emit(Whitespace, len),
            Some((Newline, len)) => {
                self.emit(Newline, len);
                self.start_line();
                if let Some(threshold) = self.pending_block.take() {
                    self.block_body(threshold);
                }
            }
            Some((Comment, len)) if self.comment_allowed() => self.emit(Comment, len),
            Some((Directive, len)) if col == 0 && !self.in_flow() => self.emit(Directive, len),
            Some((kind, len)) if self.is_indicator(kind, len) => self.indicator(kind, len),
            _ => self.scalar(c),
        }
    }

    fn document_marker(&self) -> Option<SyntaxKind> {
        let rest = self.rest();
        let kind = if rest.starts_with("---") {
            SyntaxKind::DocStart
        } else if rest.starts_with("...") {
            SyntaxKind::DocEnd
        } else {
            return None;
        };
        is_blank(self.byte_at(self.pos + 3)).then_some(kind)
    }

    fn comment_allowed(&self) -> bool {
        self.pos == 0 || is_blank(self.byte_at(self.pos - 1))
    }

    fn is_indicator(&self, kind: SyntaxKind, len: usize) -> bool {
        use SyntaxKind::*;

        let next = self.byte_at(self.pos + len);
        let in_flow = self.in_flow();
        let node_start = self.at_node_start();
        match kind {
            BraceOpen | BracketOpen => in_flow || node_start,
            BraceClose | BracketClose | Comma => in_flow,
            Question => node_start && ends_indicator(next, in_flow),
            Dash => !in_flow && node_start && is_blank(next),
            Colon => {
                ends_indicator(next, in_flow)
                    || (in_flow
                        && matches!(
                            self.last_significant,
                            Some(SingleQuoted | DoubleQuoted | BraceClose | BracketClose)
                        ))
            }
            Anchor | AliasRef | Tag => node_start,
            BlockHeader => !in_flow && node_start && is_blank(next),
            _ => false,
        }
    }

    fn indicator(&mut self, kind: SyntaxKind, len: usize) {
        use SyntaxKind::*;

        let col = self.column();
        let was_line_start = self.line_start;
        self.emit(kind, len);

        match kind {
            BraceOpen | BracketOpen => self.flow_depth += 1,
            BraceClose | BracketClose => self.flow_depth = self.flow_depth.saturating_sub(1),
            _ if self.in_flow() => {}
            Dash | Question => {
                self.block_parent = col as isize;
                self.entry_pending = true;
            }
            Colon => {
                self.block_parent = if was_line_start {
                    col as isize
                } else {
                    self.entry_col as isize
                };
                self.entry_pending = true;
            }
            BlockHeader => {
                let threshold = if was_line_start && col == 0 {
                    -1
                } else {
                    self.block_parent
                };
                self.pending_block = Some(threshold);
            }
            _ => {}
        }
    }

    fn scalar(&mut self, first: char) {
        if self.at_node_start() && matches!(first, '\'' | '"') {
            let (len, _) = scan_quoted(self.source, self.pos);
            let kind = if first == '"' {
                SyntaxKind::DoubleQuoted
            } else {
                SyntaxKind::SingleQuoted
            };
            self.emit(kind, len);
            return;
        }
        self.plain(first);
    }

    /// One line of plain scalar text, excluding trailing whitespace.
    fn plain(&mut self, first: char) {
        let bytes = self.source.as_bytes();
        let in_flow = self.in_flow();
        let mut i = self.pos + first.len_utf8();
        let mut end = i;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' | b'\r' => break,
                b' ' | b'\t' => {
                    i += 1;
                    continue;
                }
                b'#' if matches!(bytes[i - 1], b' ' | b'\t') => break,
                b':' if ends_indicator(bytes.get(i + 1).copied(), in_flow) => break,
                c if in_flow && is_flow_char(c) => break,
                _ => {}
            }
            let ch_len = self.source[i..].chars().next().map_or(1, char::len_utf8);
            i += ch_len;
            end = i;
        }
        self.emit(SyntaxKind::PlainText, end - self.pos);
    }

    fn garbage(&mut self) {
        let len: usize = self
            .rest()
            .chars()
            .take_while(|c| is_forbidden(*c))
            .map(char::len_utf8)
            .sum();
        self.emit(SyntaxKind::Garbage, len);
    }

    /// Captures every line indented past `threshold`, plus blank lines in between.
    fn block_body(&mut self, threshold: isize) {
        let start = self.pos;
        let mut cursor = start;
        while cursor < self.source.len() {
            let line_end = self.source[cursor..]
                .find('\n')
                .map_or(self.source.len(), |i| cursor + i + 1);
            let line = self.source[cursor..line_end].trim_end_matches(['\n', '\r']);
            let indent = line.bytes().take_while(|b| *b == b' ').count();
            let blank = line.trim_start_matches([' ', '\t']).is_empty();
            if !blank {
                if indent as isize <= threshold {
                    break;
                }
                if indent == 0 && (line.starts_with("---") || line.starts_with("...")) {
                    let after = line.as_bytes().get(3).copied();
                    if is_blank(after) {
                        break;
                    }
                }
            }
            cursor = line_end;
        }
        if cursor > start {
            self.emit(SyntaxKind::BlockText, cursor - start);
            self.start_line();
        }
    }

    fn start_line(&mut self) {
        self.line_offset = self.pos;
        self.line_start = true;
        self.entry_pending = false;
    }

    fn emit(&mut self, kind: SyntaxKind, len: usize) {
        let start = self.pos;
        let end = start + len;
        self.tokens
            .push(Token::new(kind, range_to_text_range(start..end)));

        if !kind.is_trivia() {
            if self.line_start {
                self.block_parent = self.column() as isize;
                self.entry_col = self.column();
            }
            if self.entry_pending {
                self.entry_col = self.column();
                self.entry_pending = false;
            }
            self.line_start = false;
            self.last_significant = Some(kind);
        }

        if let Some(nl) = self.source[start..end].rfind('\n') {
            self.line_offset = start + nl + 1;
        }
        self.pos = end;
    }
}
