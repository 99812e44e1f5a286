//! Token cursor and tree builder shared by the grammar.
//!
//! The grammar only looks at significant tokens. Whitespace, line breaks and
//! comments it steps over are held in a pending run and written into the tree
//! right before the next node or token, so they land inside whatever comes next.

use std::cell::Cell;

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

use super::cst::{SyntaxKind, TokenSet};
use super::invariants::STALL_LIMIT;
use super::lexer::{Token, scan_quoted, token_text};
use super::line_index::LineIndex;
use crate::Error;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Limits on parser work. Running out of either aborts the parse.
#[derive(Debug, Default)]
struct Fuel {
    exec: Option<u32>,
    recursion: Option<u32>,
}

pub struct Parser<'src, 'd> {
    source: &'src str,
    tokens: Vec<Token>,
    pub(super) pos: usize,
    /// Trivia stepped over but not yet written to the tree.
    pending: Vec<Token>,
    builder: GreenNodeBuilder<'static>,
    diagnostics: &'d mut Diagnostics,
    lines: LineIndex,
    depth: u32,
    /// Nesting of flow collections; block indentation rules are off while positive.
    pub(super) flow_depth: u32,
    /// Start of the last reported span. Each position is reported once.
    last_report: Option<TextSize>,
    pub(super) debug_fuel: Cell<u32>,
    fuel: Fuel,
    fatal: Option<Error>,
}

impl<'src, 'd> Parser<'src, 'd> {
    pub fn new(source: &'src str, tokens: Vec<Token>, diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            pending: Vec::with_capacity(4),
            builder: GreenNodeBuilder::new(),
            diagnostics,
            lines: LineIndex::new(source),
            depth: 0,
            flow_depth: 0,
            last_report: None,
            debug_fuel: Cell::new(STALL_LIMIT),
            fuel: Fuel::default(),
            fatal: None,
        }
    }

    pub fn with_exec_fuel(mut self, limit: Option<u32>) -> Self {
        self.fuel.exec = limit;
        self
    }

    pub fn with_recursion_fuel(mut self, limit: Option<u32>) -> Self {
        self.fuel.recursion = limit;
        self
    }

    pub(super) fn finish(mut self) -> Result<GreenNode, Error> {
        self.flush_trivia();
        self.assert_flow_balanced();
        match self.fatal {
            Some(err) => Err(err),
            None => Ok(self.builder.finish()),
        }
    }

    pub(super) fn has_fatal_error(&self) -> bool {
        self.fatal.is_some()
    }

    /// Records the first fatal error. The grammar unwinds through `should_stop`.
    fn fail(&mut self, error: Error) {
        if self.fatal.is_none() {
            self.fatal = Some(error);
        }
    }

    /// Past the last token, or aborted.
    pub(super) fn should_stop(&self) -> bool {
        self.pos >= self.tokens.len() || self.fatal.is_some()
    }

    // --- Cursor ---

    /// Kind of the next significant token; `Error` at the end of input.
    pub(super) fn current(&mut self) -> SyntaxKind {
        self.skip_trivia();
        self.ensure_progress();
        self.tokens.get(self.pos).map_or(SyntaxKind::Error, |t| t.kind)
    }

    pub(super) fn currently_is(&mut self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(super) fn currently_is_one_of(&mut self, set: TokenSet) -> bool {
        set.contains(self.current())
    }

    fn current_token(&mut self) -> Option<Token> {
        self.skip_trivia();
        self.tokens.get(self.pos).copied()
    }

    /// Span of the next significant token; empty at the end of the source.
    pub(super) fn current_span(&mut self) -> TextRange {
        let end = TextSize::of(self.source);
        self.current_token()
            .map_or(TextRange::empty(end), |t| t.span)
    }

    pub(super) fn current_text(&mut self) -> &'src str {
        let source = self.source;
        self.current_token().map_or("", |t| token_text(source, &t))
    }

    /// Kind of the token after the current one, skipping only spaces and tabs.
    pub(super) fn peek_past_whitespace(&mut self) -> SyntaxKind {
        self.skip_trivia();
        self.tokens[self.pos..]
            .iter()
            .skip(1)
            .map(|t| t.kind)
            .find(|kind| *kind != SyntaxKind::Whitespace)
            .unwrap_or(SyntaxKind::Error)
    }

    fn skip_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos).copied() {
            if !token.kind.is_trivia() {
                break;
            }
            self.pending.push(token);
            self.pos += 1;
        }
    }

    /// Whether a line break separates the previous significant token from the current one.
    pub(super) fn trivia_has_newline(&mut self) -> bool {
        self.pending_has(SyntaxKind::Newline)
    }

    pub(super) fn trivia_has_comment(&mut self) -> bool {
        self.pending_has(SyntaxKind::Comment)
    }

    fn pending_has(&mut self, kind: SyntaxKind) -> bool {
        self.skip_trivia();
        self.pending.iter().any(|t| t.kind == kind)
    }

    // --- Tree building ---

    fn flush_trivia(&mut self) {
        for token in self.pending.drain(..) {
            self.builder
                .token(token.kind.into(), token_text(self.source, &token));
        }
    }

    pub(super) fn eat_trivia(&mut self) {
        self.skip_trivia();
        self.flush_trivia();
    }

    pub(super) fn start_node(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind.into());
    }

    /// Opens `kind` around everything built since `checkpoint`.
    pub(super) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    pub(super) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    /// Trivia before the checkpoint stays outside any node wrapped at it.
    pub(super) fn checkpoint(&mut self) -> Checkpoint {
        self.eat_trivia();
        self.builder.checkpoint()
    }

    pub(super) fn bump(&mut self) {
        assert!(self.pos < self.tokens.len(), "bump past the end of input");
        self.debug_fuel.set(STALL_LIMIT);
        self.burn_exec_fuel();
        self.flush_trivia();

        let token = self.tokens[self.pos];
        if self.flow_depth == 0 {
            self.check_indentation(token.span.start());
        }
        self.builder
            .token(token.kind.into(), token_text(self.source, &token));
        self.pos += 1;
    }

    fn burn_exec_fuel(&mut self) {
        match self.fuel.exec {
            Some(0) => self.fail(Error::ExecFuelExhausted),
            Some(left) => self.fuel.exec = Some(left - 1),
            None => {}
        }
    }

    pub(super) fn eat_token(&mut self, kind: SyntaxKind) -> bool {
        if !self.currently_is(kind) {
            return false;
        }
        self.bump();
        true
    }

    /// Bumps a quoted scalar token, reporting a missing closing quote.
    pub(super) fn bump_quoted(&mut self) {
        let start = usize::from(self.current_span().start());
        let (_, terminated) = scan_quoted(self.source, start);
        if !terminated {
            self.report_here(
                DiagnosticKind::UnterminatedString,
                Some("the string runs to the end of the input"),
            );
        }
        self.bump();
    }

    pub(super) fn enter_recursion(&mut self) -> bool {
        if self.fuel.recursion.is_some_and(|limit| self.depth >= limit) {
            self.fail(Error::RecursionLimitExceeded);
            return false;
        }
        self.depth += 1;
        self.debug_fuel.set(STALL_LIMIT);
        true
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.debug_fuel.set(STALL_LIMIT);
    }

    // --- Columns ---

    fn line_prefix(&self, offset: TextSize) -> &'src str {
        let line = self.lines.line_col(offset).line;
        let start = self.lines.line_start(line).unwrap_or_default();
        &self.source[usize::from(start)..usize::from(offset)]
    }

    /// Zero-based column of `offset`, counted in characters, ignoring a leading BOM.
    fn column_of(&self, offset: TextSize) -> usize {
        self.line_prefix(offset)
            .chars()
            .filter(|c| *c != '\u{feff}')
            .count()
    }

    /// Whether only indentation precedes `offset` on its line.
    fn is_line_start(&self, offset: TextSize) -> bool {
        self.line_prefix(offset)
            .chars()
            .all(|c| matches!(c, ' ' | '\t' | '\u{feff}'))
    }

    pub(super) fn current_column(&mut self) -> usize {
        let start = self.current_span().start();
        self.column_of(start)
    }

    pub(super) fn current_at_line_start(&mut self) -> bool {
        let start = self.current_span().start();
        self.is_line_start(start)
    }

    /// Tabs may separate tokens but never indent block content.
    fn check_indentation(&mut self, offset: TextSize) {
        if !self.is_line_start(offset) {
            return;
        }
        let prefix = self.line_prefix(offset);
        let Some(tab) = prefix.find('\t') else {
            return;
        };
        let line_start = offset - TextSize::of(prefix);
        let range = TextRange::new(line_start + TextSize::from(tab as u32), offset);
        self.diagnostics
            .report(DiagnosticKind::TabIndentation, range)
            .emit();
    }

    // --- Errors ---

    /// Reports at the current token, once per position.
    fn report_here(&mut self, kind: DiagnosticKind, detail: Option<&str>) {
        let range = self.current_span();
        if self.last_report == Some(range.start()) {
            return;
        }
        self.last_report = Some(range.start());
        let builder = self.diagnostics.report(kind, range);
        match detail {
            Some(detail) => builder.message(detail).emit(),
            None => builder.emit(),
        }
    }

    /// Reports the current token and wraps it in an `Error` node.
    pub(super) fn error_and_bump(&mut self, kind: DiagnosticKind, detail: Option<&str>) {
        self.report_here(kind, detail);
        if self.should_stop() {
            return;
        }
        self.start_node(SyntaxKind::Error);
        self.bump();
        self.finish_node();
    }

    /// Wraps every remaining token on the current line in one `Error` node.
    pub(super) fn error_rest_of_line(&mut self, message: &str) {
        if self.should_stop() {
            return;
        }
        self.start_node(SyntaxKind::Error);
        self.report_here(DiagnosticKind::UnexpectedToken, Some(message));
        loop {
            self.bump();
            // Skips trivia before the end-of-input check.
            if self.trivia_has_newline() || self.should_stop() {
                break;
            }
        }
        self.finish_node();
    }

    /// Reports a flow collection left open, spanning its opener and everything inside.
    pub(super) fn report_unclosed(&mut self, kind: DiagnosticKind, open: TextRange) {
        if self.last_report == Some(open.start()) {
            return;
        }
        self.last_report = Some(open.start());
        let end = self.tokens[..self.pos]
            .iter()
            .rev()
            .find(|t| !t.kind.is_trivia())
            .map_or(open.end(), |t| t.span.end());
        let range = TextRange::new(open.start(), end.max(open.end()));
        self.diagnostics
            .report(kind, range)
            .related_to("opened here", open)
            .emit();
    }
}
