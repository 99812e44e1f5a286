//! Non-fatal problems found while parsing a document.
//!
//! Diagnostics are collected, never thrown: a parse always yields a tree, and the
//! caller decides which diagnostics matter.

mod message;
mod printer;

#[cfg(test)]
mod tests;

use rowan::TextRange;
use serde::Serialize;

pub use message::{DiagnosticKind, DiagnosticMessage, Severity};
pub use printer::DiagnosticsPrinter;

use message::RelatedInfo;

/// Diagnostics in the order they were reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
}

/// A diagnostic under construction. Nothing is recorded until [`emit`](Self::emit).
#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    sink: &'a mut Vec<DiagnosticMessage>,
    message: DiagnosticMessage,
}

impl DiagnosticBuilder<'_> {
    /// Replaces the kind's summary with a message built around `detail`.
    pub fn message(mut self, detail: impl AsRef<str>) -> Self {
        self.message.message = self.message.kind.message(Some(detail.as_ref()));
        self
    }

    pub fn related_to(mut self, message: impl Into<String>, range: TextRange) -> Self {
        self.message.related.push(RelatedInfo {
            range,
            message: message.into(),
        });
        self
    }

    pub fn emit(self) {
        self.sink.push(self.message);
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, kind: DiagnosticKind, range: TextRange) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            sink: &mut self.messages,
            message: DiagnosticMessage::new(kind, range),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    fn count(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|d| d.severity() == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(DiagnosticMessage::is_error)
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(DiagnosticMessage::is_warning)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiagnosticMessage> {
        self.messages.iter()
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.messages.iter().map(DiagnosticMessage::kind).collect()
    }

    /// Copy without the diagnostics that merely follow from another one.
    ///
    /// An unclosed collection or string hides lower-priority diagnostics strictly
    /// inside its span. Of two diagnostics starting at the same offset, only the
    /// higher-priority one is kept.
    pub fn filtered(&self) -> Diagnostics {
        let hides = |a: &DiagnosticMessage, b: &DiagnosticMessage| {
            if !a.kind.suppresses(&b.kind) {
                return false;
            }
            let same_start = a.range.start() == b.range.start();
            let swallowed = a.kind.is_structural_error()
                && a.range.start() < b.range.start()
                && b.range.end() <= a.range.end();
            same_start || swallowed
        };

        let mut hidden = vec![false; self.messages.len()];
        for (i, a) in self.messages.iter().enumerate() {
            if hidden[i] {
                continue;
            }
            for (j, b) in self.messages.iter().enumerate() {
                if i != j && !hidden[j] && hides(a, b) {
                    hidden[j] = true;
                }
            }
        }

        let messages = self
            .messages
            .iter()
            .zip(hidden)
            .filter_map(|(m, hidden)| (!hidden).then(|| m.clone()))
            .collect();
        Diagnostics { messages }
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    /// Moves out every diagnostic that starts inside `range`, keeping the rest.
    pub(crate) fn split_off_within(&mut self, range: TextRange) -> Diagnostics {
        let (inside, outside) = std::mem::take(&mut self.messages)
            .into_iter()
            .partition(|m| range.contains(m.range.start()));
        self.messages = outside;
        Diagnostics { messages: inside }
    }

    /// Orders by start offset. Ties keep their reporting order.
    pub(crate) fn sort(&mut self) {
        self.messages.sort_by_key(|m| m.range.start());
    }

    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}

impl<'d> IntoIterator for &'d Diagnostics {
    type Item = &'d DiagnosticMessage;
    type IntoIter = std::slice::Iter<'d, DiagnosticMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for Diagnostics {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(&self.messages)
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut lines = self.messages.iter();
        if let Some(first) = lines.next() {
            write!(f, "{first}")?;
        }
        for diag in lines {
            write!(f, "\n{diag}")?;
        }
        Ok(())
    }
}
