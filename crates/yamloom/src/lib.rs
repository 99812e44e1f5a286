//! Yamloom: lossless YAML documents with round-trip fidelity.
//!
//! Source text is parsed into a lossless syntax tree, then resolved into a
//! mutable document tree of maps, sequences, pairs, merges, scalars and aliases.
//! The tree projects two ways: into plain [`Value`]s, and back into text that is
//! byte-identical to the input for anything left untouched.
//!
//! # Example
//!
//! ```
//! use yamloom::{Document, Node};
//!
//! let mut doc = Document::parse("a: 1 # one\nb: [x, y]\n").expect("out of fuel");
//! assert!(doc.is_valid());
//! assert_eq!(doc.to_text().unwrap(), "a: 1 # one\nb: [x, y]\n");
//!
//! let map = doc.root_mut().and_then(Node::as_map_mut).unwrap();
//! map.set("c", Node::from(true));
//! assert_eq!(doc.to_value().unwrap().to_string(), "{a: 1, b: [x, y], c: true}");
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostics;
pub mod model;
pub mod options;
pub mod syntax;
pub mod value;

mod document;
mod resolve;
mod text;


pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use document::{Document, node_to_text};
pub use model::{
    Alias, CollectionStyle, Key, Lookup, Map, Merge, Meta, Node, Pair, Scalar, ScalarStyle,
    ScalarValue, Seq,
};
pub use options::{ParseOptions, TextOptions, ToValueOptions};
pub use value::Value;

/// Result type for passes that produce both output and diagnostics.
///
/// Data problems in the input are diagnostics; fatal errors (like fuel
/// exhaustion) use the outer `Result`.
pub type PassResult<T> = std::result::Result<(T, Diagnostics), Error>;

/// Hard failures. Problems with the input text are diagnostics instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Execution fuel exhausted (too many parser operations).
    #[error("execution limit exceeded")]
    ExecFuelExhausted,

    /// Recursion fuel exhausted (input nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    #[error("merge sources must be maps")]
    MergeSourceNotMap,

    #[error("map already contains key `{key}`")]
    DuplicateKey { key: String },

    /// A map item that is neither a pair nor a merge.
    #[error("map items must be pairs, found {found}")]
    NotAPair { found: String },

    #[error("index {index} is out of bounds for a sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("alias `*{name}` does not refer to a preceding anchor")]
    UnresolvedAlias { name: String },

    /// Too many alias dereferences in one projection.
    #[error("alias expansion limit exceeded")]
    AliasLimitExceeded,

    #[error("document is invalid with {} errors", .0.error_count())]
    Invalid(Diagnostics),
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Parses a single document and projects it to a plain value.
///
/// Fails with [`Error::Invalid`] when the document has error diagnostics.
pub fn load(source: &str) -> Result<Value> {
    let doc = Document::parse(source)?;
    if !doc.is_valid() {
        return Err(Error::Invalid(doc.diagnostics().clone()));
    }
    doc.to_value()
}
