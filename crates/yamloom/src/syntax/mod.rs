//! Lossless syntax tree for YAML streams.
//!
//! # Architecture
//!
//! The parser produces a concrete syntax tree (CST) via Rowan's green tree builder.
//! Every byte of the input, including whitespace, comments and line endings, ends
//! up in exactly one token, so the tree prints back to the original text.
//!
//! - Zero-copy lexing: tokens carry spans, text sliced only when building tree nodes
//! - Trivia buffering: whitespace/comments collected, then attached to the next node
//! - Checkpoint-based wrapping: implicit keys are wrapped into maps once `:` is seen
//!
//! # Recovery Strategy
//!
//! The parser always produces a tree. Recovery follows these rules:
//!
//! 1. Stray tokens get wrapped in `SyntaxKind::Error` nodes, a line at a time
//! 2. Unclosed flow collections and quotes run to the end of the input and are reported
//! 3. Block structure recovers at the next line whose indentation fits an open collection
//!
//! However, fuel exhaustion (exec_fuel, recursion_fuel) returns an actual error immediately.

pub mod ast;
pub mod cst;
pub mod lexer;
pub mod line_index;

mod core;
mod grammar;
mod invariants;

#[cfg(test)]
mod cst_tests;
#[cfg(test)]
mod grammar_tests;
#[cfg(test)]
mod lexer_tests;

use std::fmt::Write;

use rowan::NodeOrToken;

pub use ast::{FlowItem, MapItem, Properties, SeqEntry, ValueNode};
pub use cst::{SyntaxKind, SyntaxNode, SyntaxToken};
pub use line_index::{LineCol, LineIndex};

use crate::PassResult;
use crate::diagnostics::Diagnostics;
use crate::options::ParseOptions;
use self::core::Parser;
use lexer::lex;

/// Parse result containing the green tree.
///
/// The tree is always complete; diagnostics are returned separately.
/// Error nodes in the tree represent recovery points.
#[derive(Debug, Clone)]
pub struct Parse {
    cst: rowan::GreenNode,
}

impl Parse {
    pub fn as_cst(&self) -> &rowan::GreenNode {
        &self.cst
    }

    /// Creates a typed view over the immutable green tree.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.cst.clone())
    }

    pub fn stream(&self) -> ast::Stream {
        ast::Stream::cast(self.syntax()).expect("parser always produces Stream")
    }
}

/// Main entry point. Returns Err on fuel exhaustion.
pub fn parse(source: &str, options: &ParseOptions) -> PassResult<Parse> {
    let mut diagnostics = Diagnostics::new();
    let mut parser = Parser::new(source, lex(source), &mut diagnostics)
        .with_exec_fuel(options.exec_fuel)
        .with_recursion_fuel(options.recursion_fuel);
    parser.parse_stream();
    let cst = parser.finish()?;

    tracing::trace!(
        bytes = source.len(),
        diagnostics = diagnostics.len(),
        "parsed syntax tree"
    );
    Ok((Parse { cst }, diagnostics))
}

/// Indented tree dump, one node or token per line. Trivia is omitted unless requested.
pub fn dump_cst(node: &SyntaxNode, with_trivia: bool) -> String {
    let mut out = String::new();
    format_cst(node, 0, with_trivia, &mut out).expect("String write never fails");
    out
}

fn format_cst(
    node: &SyntaxNode,
    indent: usize,
    with_trivia: bool,
    w: &mut impl Write,
) -> std::fmt::Result {
    let prefix = "  ".repeat(indent);
    writeln!(w, "{}{:?}", prefix, node.kind())?;

    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => format_cst(&n, indent + 1, with_trivia, w)?,
            NodeOrToken::Token(t) => {
                if with_trivia || !t.kind().is_trivia() {
                    let child_prefix = "  ".repeat(indent + 1);
                    writeln!(w, "{}{:?} {:?}", child_prefix, t.kind(), t.text())?;
                }
            }
        }
    }
    Ok(())
}
