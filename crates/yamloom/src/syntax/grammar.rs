//! Grammar productions for YAML streams.
//!
//! This module implements all `parse_*` methods as an extension of `Parser`.
//! Block structure is decided by columns: a block collection continues while its
//! entries start lines at the collection's indentation. Flow collections ignore
//! indentation and are delimited by their brackets.
//!
//! Implicit keys are recognised after the fact: a scalar or flow node followed by
//! `:` on the same line is wrapped retroactively into a `BlockMap` through its
//! checkpoint.

use rowan::Checkpoint;

use super::core::Parser;
use super::cst::SyntaxKind::{self, *};
use super::cst::TokenSet;
use super::cst::token_sets::{DOCUMENT_BOUNDARY, FLOW_NODE_FIRST, SCALAR_FIRST};
use crate::diagnostics::DiagnosticKind;

/// Tokens that start a node without block structure of its own.
const INLINE_FIRST: TokenSet = SCALAR_FIRST.union(TokenSet::new(&[BraceOpen, BracketOpen]));

/// Where a block node appears; decides which following lines still belong to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BlockContext {
    Document,
    MapValue,
    SeqEntry,
    ExplicitKey,
}

impl Parser<'_, '_> {
    pub(crate) fn parse_stream(&mut self) {
        self.start_node(Stream);
        loop {
            self.parse_document();
            if self.should_stop() {
                break;
            }
        }
        self.eat_trivia();
        self.finish_node();
    }

    /// `%directive* ---? node? ...?`
    fn parse_document(&mut self) {
        self.start_node(Document);
        while self.currently_is(Directive) {
            self.bump();
        }
        self.eat_token(DocStart);

        if !self.at_document_end() {
            self.parse_block_node(-1, BlockContext::Document);
        }
        while !self.at_document_end() {
            self.error_rest_of_line("content after the document root");
        }

        self.eat_token(DocEnd);
        self.eat_trivia();
        self.finish_node();
    }

    fn at_document_end(&mut self) -> bool {
        self.should_stop() || self.currently_is_one_of(DOCUMENT_BOUNDARY)
    }

    /// Parses the node owned by a construct indented at `parent`.
    /// Produces nothing when the next token does not belong to that construct.
    pub(super) fn parse_block_node(&mut self, parent: isize, ctx: BlockContext) {
        if !self.node_in_scope(parent, ctx) || !self.enter_recursion() {
            return;
        }

        let column = self.current_column() as isize;
        let checkpoint = self.checkpoint();
        let has_properties = self.parse_properties();

        if has_properties && self.trivia_has_newline() {
            // Properties on a line of their own annotate the collection below them,
            // not its first key.
            if self.node_in_scope(parent, ctx) {
                let column = self.current_column() as isize;
                let key_checkpoint = if self.at_implicit_key() {
                    self.checkpoint()
                } else {
                    checkpoint
                };
                self.parse_block_content(checkpoint, key_checkpoint, column, parent);
            } else {
                self.empty_node_at(checkpoint);
            }
        } else {
            self.parse_block_content(checkpoint, checkpoint, column, parent);
        }

        self.exit_recursion();
    }

    /// A scalar or alias immediately followed by `:` on the same line.
    fn at_implicit_key(&mut self) -> bool {
        SCALAR_FIRST.contains(self.current()) && self.peek_past_whitespace() == Colon
    }

    fn node_in_scope(&mut self, parent: isize, ctx: BlockContext) -> bool {
        let kind = self.current();
        if self.should_stop()
            || DOCUMENT_BOUNDARY.contains(kind)
            || matches!(kind, Garbage | BlockText)
        {
            return false;
        }
        if !self.current_at_line_start() {
            return true;
        }
        let column = self.current_column() as isize;
        column > parent || (ctx == BlockContext::MapValue && kind == Dash && column == parent)
    }

    fn parse_block_content(
        &mut self,
        checkpoint: Checkpoint,
        key_checkpoint: Checkpoint,
        column: isize,
        parent: isize,
    ) {
        match self.current() {
            Dash => self.parse_block_seq(checkpoint, column),
            Question | Colon => {
                self.start_node_at(checkpoint, BlockMap);
                self.parse_block_map_entries(column, true);
                self.finish_node();
            }
            BlockHeader => self.parse_block_scalar(checkpoint),
            kind if INLINE_FIRST.contains(kind) => {
                self.parse_inline_node(key_checkpoint, parent);
                if self.currently_is(Colon) && !self.trivia_has_newline() {
                    self.start_node_at(checkpoint, BlockMap);
                    self.parse_map_value(column);
                    self.recover_line_end();
                    self.parse_block_map_entries(column, false);
                    self.finish_node();
                }
            }
            _ => self.empty_node_at(checkpoint),
        }
    }

    /// `&anchor` and `!tag` in any order. Returns whether any were present.
    fn parse_properties(&mut self) -> bool {
        let mut any = false;
        while self.current().is_property() {
            self.bump();
            any = true;
        }
        any
    }

    fn empty_node_at(&mut self, checkpoint: Checkpoint) {
        self.start_node_at(checkpoint, Plain);
        self.finish_node();
    }

    /// Scalars, aliases and flow collections: nodes that don't depend on indentation.
    fn parse_inline_node(&mut self, checkpoint: Checkpoint, parent: isize) {
        match self.current() {
            BraceOpen => self.parse_flow_collection(checkpoint, FlowMap),
            BracketOpen => self.parse_flow_collection(checkpoint, FlowSeq),
            PlainText => {
                self.start_node_at(checkpoint, Plain);
                self.bump();
                self.parse_plain_continuation(parent);
                self.finish_node();
            }
            SingleQuoted => {
                self.start_node_at(checkpoint, QuotedSingle);
                self.bump_quoted();
                self.finish_node();
            }
            DoubleQuoted => {
                self.start_node_at(checkpoint, QuotedDouble);
                self.bump_quoted();
                self.finish_node();
            }
            AliasRef => {
                self.start_node_at(checkpoint, Alias);
                self.bump();
                self.finish_node();
            }
            _ => self.empty_node_at(checkpoint),
        }
    }

    /// Following lines of a multi-line plain scalar. A comment ends the scalar.
    fn parse_plain_continuation(&mut self, parent: isize) {
        while self.currently_is(PlainText) && self.trivia_has_newline() && !self.trivia_has_comment()
        {
            if self.flow_depth == 0
                && (!self.current_at_line_start() || self.current_column() as isize <= parent)
            {
                break;
            }
            self.bump();
        }
    }

    /// `|` or `>` header followed by the captured body lines.
    fn parse_block_scalar(&mut self, checkpoint: Checkpoint) {
        let kind = if self.current_text().starts_with('|') {
            BlockLiteral
        } else {
            BlockFolded
        };
        self.start_node_at(checkpoint, kind);
        self.bump();
        if !self.should_stop() && !self.trivia_has_newline() && !self.currently_is(BlockText) {
            self.error_rest_of_line("text after a block scalar header");
        }
        self.eat_token(BlockText);
        self.finish_node();
    }

    fn parse_block_seq(&mut self, checkpoint: Checkpoint, indent: isize) {
        self.start_node_at(checkpoint, BlockSeq);
        let mut first = true;
        while !self.should_stop() && self.currently_is(Dash) {
            if !first
                && (!self.current_at_line_start() || self.current_column() as isize != indent)
            {
                break;
            }
            first = false;

            self.start_node(SeqItem);
            self.bump();
            self.parse_block_node(indent, BlockContext::SeqEntry);
            self.finish_node();
            self.recover_line_end();
        }
        self.finish_node();
    }

    /// Entries of a block map whose keys sit at column `indent`.
    ///
    /// The first entry may follow other tokens on its line (`- a: 1`); every later
    /// entry must start a line.
    fn parse_block_map_entries(&mut self, indent: isize, mut first: bool) {
        loop {
            if self.at_document_end() {
                break;
            }
            if !first {
                if !self.current_at_line_start() {
                    self.error_rest_of_line("unexpected content after a map entry");
                    continue;
                }
                let column = self.current_column() as isize;
                if column < indent {
                    break;
                }
                if column > indent {
                    self.error_rest_of_line("unexpected indentation");
                    continue;
                }
            }
            first = false;

            match self.current() {
                Question => {
                    self.start_node(ExplicitKey);
                    self.bump();
                    self.parse_block_node(indent, BlockContext::ExplicitKey);
                    self.finish_node();
                }
                Colon => self.parse_map_value(indent),
                kind if INLINE_FIRST.contains(kind) || kind.is_property() => {
                    self.parse_map_key(indent);
                    if self.currently_is(Colon) && !self.trivia_has_newline() {
                        self.parse_map_value(indent);
                    }
                }
                Dash => self.error_rest_of_line("sequence entry inside a map"),
                _ => self.error_rest_of_line("expected a map entry"),
            }
            self.recover_line_end();
        }
    }

    /// Implicit key of a block map entry.
    fn parse_map_key(&mut self, indent: isize) {
        let checkpoint = self.checkpoint();
        self.parse_properties();
        self.parse_inline_node(checkpoint, indent);
    }

    /// `: value`
    fn parse_map_value(&mut self, indent: isize) {
        self.start_node(ExplicitValue);
        self.bump();
        self.parse_block_node(indent, BlockContext::MapValue);
        self.finish_node();
    }

    /// Reports leftovers sharing a line with a complete block entry.
    fn recover_line_end(&mut self) {
        if self.at_document_end() || self.current_at_line_start() {
            return;
        }
        self.error_rest_of_line("unexpected content after the node");
    }

    /// `{ ... }` or `[ ... ]`. Items are kept flat; pairing happens during resolution.
    fn parse_flow_collection(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        let (open, close, unclosed) = if kind == FlowMap {
            (BraceOpen, BraceClose, DiagnosticKind::UnclosedFlowMap)
        } else {
            (BracketOpen, BracketClose, DiagnosticKind::UnclosedFlowSeq)
        };

        self.assert_current(open);
        self.start_node_at(checkpoint, kind);
        let open_range = self.current_span();
        self.bump();
        self.flow_depth += 1;

        let mut closed = false;
        if self.enter_recursion() {
            while !self.should_stop() {
                match self.current() {
                    k if k == close => {
                        self.bump();
                        closed = true;
                        break;
                    }
                    BraceClose | BracketClose => self.error_and_bump(
                        DiagnosticKind::UnexpectedToken,
                        Some("mismatched closing bracket"),
                    ),
                    Comma | Colon | Question => self.bump(),
                    DocStart | DocEnd => break,
                    k if FLOW_NODE_FIRST.contains(k) => self.parse_flow_node(),
                    _ => self.error_and_bump(DiagnosticKind::UnexpectedToken, None),
                }
            }
            self.exit_recursion();
        }

        self.flow_depth -= 1;
        if !closed && !self.has_fatal_error() {
            self.report_unclosed(unclosed, open_range);
        }
        self.finish_node();
    }

    fn parse_flow_node(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_properties();
        self.parse_inline_node(checkpoint, -1);
    }
}
