//! Renders diagnostics as annotated source snippets.

use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use rowan::TextRange;

use super::Diagnostics;
use super::message::{DiagnosticMessage, Severity};

/// Builder for rendering a diagnostics collection.
///
/// With a source, each diagnostic becomes an annotated snippet. Without one,
/// each becomes a single `severity at start..end: message` line.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
    cascades: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
            cascades: true,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    /// Whether to show diagnostics that [`Diagnostics::filtered`] would hide.
    pub fn cascades(mut self, value: bool) -> Self {
        self.cascades = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let filtered;
        let diagnostics = if self.cascades {
            self.diagnostics
        } else {
            filtered = self.diagnostics.filtered();
            &filtered
        };

        match self.source {
            Some(source) => self.format_snippets(diagnostics, source, w),
            None => self.format_lines(diagnostics, w),
        }
    }

    fn format_snippets(
        &self,
        diagnostics: &Diagnostics,
        source: &str,
        w: &mut impl Write,
    ) -> std::fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            let report: Vec<Group> = vec![self.snippet_group(diag, source)];
            write!(w, "{}", renderer.render(&report))?;
        }
        Ok(())
    }

    fn snippet_group<'a>(&self, diag: &'a DiagnosticMessage, source: &'a str) -> Group<'a>
    where
        's: 'a,
    {
        let mut snippet = Snippet::source(source).line_start(1).annotation(
            AnnotationKind::Primary
                .span(snippet_span(diag.range, source))
                .label(&diag.message),
        );
        if let Some(path) = self.path {
            snippet = snippet.path(path);
        }
        for related in &diag.related {
            snippet = snippet.annotation(
                AnnotationKind::Context
                    .span(snippet_span(related.range, source))
                    .label(&related.message),
            );
        }
        level(diag.severity())
            .primary_title(&diag.message)
            .element(snippet)
    }

    fn format_lines(&self, diagnostics: &Diagnostics, w: &mut impl Write) -> std::fmt::Result {
        for (i, diag) in diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            if let Some(path) = self.path {
                write!(w, "{path}: ")?;
            }
            write!(w, "{diag}")?;
        }
        Ok(())
    }
}

fn level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

/// Byte span handed to the renderer.
///
/// Quoted scalars and block scalar bodies may end in a line break; it is dropped
/// so the underline stays on the scalar's own lines. Empty spans cover the next
/// character.
fn snippet_span(range: TextRange, source: &str) -> Range<usize> {
    let start = usize::from(range.start()).min(source.len());
    let end = usize::from(range.end()).clamp(start, source.len());
    let end = start + source[start..end].trim_end_matches(['\n', '\r']).len();
    if start < end {
        return start..end;
    }
    let width = source[start..].chars().next().map_or(0, char::len_utf8);
    start..start + width
}
