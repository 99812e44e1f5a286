//! A parsed document: semantic tree, diagnostics and the text it came from.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use rowan::{TextRange, TextSize};

use crate::Result;
use crate::diagnostics::Diagnostics;
use crate::model::{Alias, AliasTable, Node, OriginId};
use crate::options::{ParseOptions, TextOptions, ToValueOptions};
use crate::resolve::Resolver;
use crate::syntax;
use crate::text::{Printer, SourceMap};
use crate::value::{Projector, Value};

/// Provenance handles are only honoured by the document that issued them.
static NEXT_DOCUMENT: AtomicU32 = AtomicU32::new(0);

#[derive(Debug, Clone)]
pub struct Document {
    root: Option<Node>,
    /// Comment lines before the root, without their `#`.
    pub comment_before: Option<String>,
    /// Comment lines after the root, without their `#`.
    pub comment: Option<String>,
    diagnostics: Diagnostics,
    source: Arc<str>,
    range: TextRange,
    origins: Vec<TextRange>,
    id: u32,
    directives: Vec<String>,
    has_start_marker: bool,
    /// State right after parsing, to tell whether the original text still applies.
    parsed: Parsed,
}

#[derive(Debug, Clone)]
struct Parsed {
    root: Option<OriginId>,
    comment_before: Option<String>,
    comment: Option<String>,
}

impl Document {
    /// Parses the first document of `source`.
    pub fn parse(source: &str) -> Result<Self> {
        Self::parse_with(source, &ParseOptions::default())
    }

    pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Self> {
        let mut documents = Self::parse_stream(source, options, 1)?;
        // The stream always holds at least one document.
        documents.swap_remove(0)
    }

    /// Parses every document of a `---`/`...` separated stream.
    ///
    /// The outer error aborts the whole stream (fuel exhaustion). A hard error
    /// while resolving one document, such as a merge of a non-map, fails only
    /// that document.
    pub fn parse_all(source: &str) -> Result<Vec<Result<Self>>> {
        Self::parse_all_with(source, &ParseOptions::default())
    }

    pub fn parse_all_with(source: &str, options: &ParseOptions) -> Result<Vec<Result<Self>>> {
        Self::parse_stream(source, options, usize::MAX)
    }

    /// Resolves at most `limit` documents of the stream.
    fn parse_stream(
        source: &str,
        options: &ParseOptions,
        limit: usize,
    ) -> Result<Vec<Result<Self>>> {
        let (parse, mut diagnostics) = syntax::parse(source, options)?;
        let shared: Arc<str> = Arc::from(source);
        let stream = parse.stream();
        let total = stream.documents().count();
        let source_end = TextSize::of(source);

        let mut documents = Vec::new();
        for (index, document) in stream.documents().take(limit).enumerate() {
            let syntax_range = document.as_cst().text_range();
            let own = diagnostics.split_off_within(syntax_range);
            // Stream-level trivia at either end belongs to the outer documents.
            let start = if index == 0 {
                TextSize::from(0)
            } else {
                syntax_range.start()
            };
            let end = if index + 1 == total {
                source_end
            } else {
                syntax_range.end()
            };
            let range = TextRange::new(start, end);
            documents.push(Self::resolve(&document, &shared, options, own, range));
        }
        if documents.is_empty() {
            documents.push(Ok(Document::empty(Arc::clone(&shared))));
        }

        // Stream-level leftovers belong to the last document.
        if limit >= total
            && !diagnostics.is_empty()
            && let Some(Ok(last)) = documents.last_mut()
        {
            last.diagnostics.extend(diagnostics);
            last.diagnostics.sort();
        }

        tracing::debug!(
            documents = documents.len(),
            failed = documents.iter().filter(|d| d.is_err()).count(),
            errors = documents
                .iter()
                .flatten()
                .map(|d| d.diagnostics.error_count())
                .sum::<usize>(),
            "parsed stream"
        );
        Ok(documents)
    }

    fn resolve(
        document: &syntax::ast::Document,
        source: &Arc<str>,
        options: &ParseOptions,
        mut diagnostics: Diagnostics,
        range: TextRange,
    ) -> Result<Self> {
        let id = NEXT_DOCUMENT.fetch_add(1, Ordering::Relaxed);
        let resolved = Resolver::new(source, options, &mut diagnostics, id)
            .resolve_document(document)?;
        diagnostics.sort();

        let parsed = Parsed {
            root: resolved
                .root
                .as_ref()
                .and_then(|root| root.meta().provenance())
                .map(|p| p.origin),
            comment_before: resolved.comment_before.clone(),
            comment: resolved.comment.clone(),
        };
        Ok(Document {
            root: resolved.root,
            comment_before: resolved.comment_before,
            comment: resolved.comment,
            diagnostics,
            source: Arc::clone(source),
            range,
            origins: resolved.origins,
            id,
            directives: document.directives().map(|t| t.text().to_string()).collect(),
            has_start_marker: document.has_start_marker(),
            parsed,
        })
    }

    fn empty(source: Arc<str>) -> Self {
        let range = TextRange::up_to((source.len() as u32).into());
        Document {
            root: None,
            comment_before: None,
            comment: None,
            diagnostics: Diagnostics::new(),
            source,
            range,
            origins: Vec::new(),
            id: NEXT_DOCUMENT.fetch_add(1, Ordering::Relaxed),
            directives: Vec::new(),
            has_start_marker: false,
            parsed: Parsed {
                root: None,
                comment_before: None,
                comment: None,
            },
        }
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> Option<&mut Node> {
        self.root.as_mut()
    }

    /// Replaces the root, returning the previous one.
    pub fn set_root(&mut self, root: Option<Node>) -> Option<Node> {
        std::mem::replace(&mut self.root, root)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// No error-severity diagnostics. Warnings are allowed.
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    /// The whole stream this document was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// This document's span within [`source`](Self::source).
    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Where a node of this document was parsed from, if it was.
    pub fn source_range(&self, node: &Node) -> Option<TextRange> {
        let provenance = node.meta().provenance()?;
        if provenance.origin.document != self.id {
            return None;
        }
        self.origins.get(provenance.origin.index as usize).copied()
    }

    /// The node `alias` refers to: the closest preceding node anchored with its name.
    pub fn resolve_alias(&self, alias: &Alias) -> Option<&Node> {
        AliasTable::build(self.root.as_ref()?).get(alias)
    }

    pub fn to_value(&self) -> Result<Value> {
        self.to_value_with(&ToValueOptions::default())
    }

    pub fn to_value_with(&self, options: &ToValueOptions) -> Result<Value> {
        let Some(root) = &self.root else {
            return Ok(Value::Null);
        };
        let value = Projector::new(root, options).project(root)?;
        tracing::trace!(document = self.id, "projected value");
        Ok(value)
    }

    pub fn to_text(&self) -> Result<String> {
        self.to_text_with(&TextOptions::default())
    }

    /// Original text when nothing changed since parsing, canonical text otherwise.
    pub fn to_text_with(&self, options: &TextOptions) -> Result<String> {
        if self.is_untouched() {
            return Ok(self.original_text().to_string());
        }
        tracing::debug!(document = self.id, "printing canonically");

        let sources = SourceMap {
            source: &self.source,
            origins: &self.origins,
            document: self.id,
        };
        let mut out = String::new();
        for directive in &self.directives {
            out.push_str(directive);
            out.push('\n');
        }
        if self.has_start_marker || !self.directives.is_empty() {
            out.push_str("---\n");
        }
        out.push_str(&Printer::new(Some(sources), options).document(
            self.root.as_ref(),
            self.comment_before.as_deref(),
            self.comment.as_deref(),
        )?);
        Ok(out)
    }

    fn is_untouched(&self) -> bool {
        if self.comment_before != self.parsed.comment_before || self.comment != self.parsed.comment
        {
            return false;
        }
        match (&self.root, self.parsed.root) {
            (None, None) => true,
            (Some(root), Some(origin)) => {
                root.meta().provenance().is_some_and(|p| p.origin == origin) && root.is_pristine()
            }
            _ => false,
        }
    }

    fn original_text(&self) -> &str {
        &self.source[std::ops::Range::<usize>::from(self.range)]
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_text().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Canonical text for a node on its own, as a document root would be printed.
pub fn node_to_text(node: &Node, options: &TextOptions) -> Result<String> {
    Printer::new(None, options).node(node)
}
