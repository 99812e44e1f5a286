use rowan::TextRange;
use serde::Serialize;

/// What went wrong, declared from the most to the least disruptive.
///
/// Declaration order is priority: when two diagnostics overlap, the one declared
/// earlier hides the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    // Run to the end of the input
    UnclosedFlowMap,
    UnclosedFlowSeq,
    UnterminatedString,

    // Token level
    UnexpectedToken,
    InvalidEscape,
    TabIndentation,

    // Block maps
    CompactNestedMap,
    ImplicitKeyWithoutValue,
    MultilineImplicitKey,

    // Flow collections
    UnexpectedFlowMapToken,
    UnexpectedFlowSeqToken,
    MissingSeparator,
    MissingIndicator,
    ChainedFlowPair,

    // Found while building the node tree
    DuplicateKey,
    UndefinedAlias,
    KeyTooLong,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::KeyTooLong => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn suppresses(&self, other: &DiagnosticKind) -> bool {
        self < other
    }

    /// Unclosed collections and strings, which hide whatever they swallow.
    pub fn is_structural_error(&self) -> bool {
        matches!(
            self,
            Self::UnclosedFlowMap | Self::UnclosedFlowSeq | Self::UnterminatedString
        )
    }

    fn summary(&self) -> &'static str {
        match self {
            Self::UnclosedFlowMap => "missing closing `}`",
            Self::UnclosedFlowSeq => "missing closing `]`",
            Self::UnterminatedString => "missing closing quote",
            Self::UnexpectedToken => "unexpected token",
            Self::InvalidEscape => "invalid escape sequence",
            Self::TabIndentation => "tabs are not allowed as indentation",
            Self::CompactNestedMap => "nested mappings not allowed in compact form",
            Self::ImplicitKeyWithoutValue => "implicit map keys must be followed by a value",
            Self::MultilineImplicitKey => "implicit map keys must be single-line",
            Self::UnexpectedFlowMapToken => "flow map contains an unexpected token",
            Self::UnexpectedFlowSeqToken => "flow sequence contains an unexpected token",
            Self::MissingSeparator => "missing separator",
            Self::MissingIndicator => "missing indicator",
            Self::ChainedFlowPair => "flow sequence pairs cannot be chained",
            Self::DuplicateKey => "duplicate key",
            Self::UndefinedAlias => "undefined alias",
            Self::KeyTooLong => "implicit key is too long",
        }
    }

    /// Text shown for this kind, with `detail` worked in when given.
    ///
    /// Keys and alias names are quoted into the sentence; other kinds append
    /// the detail to their summary.
    pub fn message(&self, detail: Option<&str>) -> String {
        let Some(detail) = detail else {
            return self.summary().to_owned();
        };
        match self {
            Self::DuplicateKey => format!("map keys must be unique; `{detail}` is repeated"),
            Self::UndefinedAlias => format!("`*{detail}` does not refer to a preceding anchor"),
            Self::KeyTooLong => format!("implicit key `{detail}` exceeds the key length limit"),
            _ if self.is_structural_error() => format!("{}; {detail}", self.summary()),
            _ => format!("{}: {detail}", self.summary()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// A secondary span that explains the primary one, such as where a collection opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RelatedInfo {
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    pub(crate) range: TextRange,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, range: TextRange) -> Self {
        Self {
            kind,
            range,
            message: kind.message(None),
            related: Vec::new(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

#[derive(Serialize)]
struct WireSpan {
    start: u32,
    end: u32,
}

#[derive(Serialize)]
struct WireDiagnostic<'a> {
    kind: DiagnosticKind,
    severity: Severity,
    message: &'a str,
    range: WireSpan,
}

impl Serialize for DiagnosticMessage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        WireDiagnostic {
            kind: self.kind,
            severity: self.severity(),
            message: &self.message,
            range: WireSpan {
                start: self.range.start().into(),
                end: self.range.end().into(),
            },
        }
        .serialize(serializer)
    }
}

fn write_range(f: &mut std::fmt::Formatter<'_>, range: TextRange) -> std::fmt::Result {
    write!(f, "{}..{}", u32::from(range.start()), u32::from(range.end()))
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at ", self.severity())?;
        write_range(f, self.range)?;
        write!(f, ": {}", self.message)?;
        for related in &self.related {
            write!(f, " (related: {} at ", related.message)?;
            write_range(f, related.range)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}
