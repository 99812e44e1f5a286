//! Syntax kinds for YAML source text.
//!
//! One enum names both the tokens the lexer emits and the nodes the parser builds.
//! Logos recognizes the indicators, properties and trivia directly. Scalar text is
//! context dependent, so those kinds and every node kind carry no pattern and are
//! produced by hand.

use logos::Logos;
use rowan::Language;

/// Token kinds come first so that they fit a [`TokenSet`]; `__LAST` bounds the range.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("{")]
    BraceOpen = 0,

    #[token("}")]
    BraceClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(",")]
    Comma,

    /// Explicit key indicator `?`
    #[token("?")]
    Question,

    /// Value indicator `:`
    #[token(":")]
    Colon,

    /// Sequence entry indicator `-`
    #[token("-")]
    Dash,

    /// Node anchor `&name`
    #[regex(r"&[^ \t\r\n,\[\]{}]+", allow_greedy = true)]
    Anchor,

    /// Alias reference `*name`
    #[regex(r"\*[^ \t\r\n,\[\]{}]+", allow_greedy = true)]
    AliasRef,

    /// Node tag `!tag`, `!!str`, or the non-specific `!`
    #[regex(r"![^ \t\r\n,\[\]{}]*", allow_greedy = true)]
    Tag,

    /// Block scalar header: `|`, `>`, with optional chomping and indentation indicators
    #[regex(r"[|>][0-9+\-]*")]
    BlockHeader,

    /// Document start marker `---`
    #[token("---")]
    DocStart,

    /// Document end marker `...`
    #[token("...")]
    DocEnd,

    /// `%YAML 1.2`, `%TAG ...`
    #[regex(r"%[^\r\n]*", allow_greedy = true)]
    Directive,

    #[regex(r"#[^\r\n]*", allow_greedy = true)]
    Comment,

    #[regex(r"[ \t]+")]
    Whitespace,

    #[token("\n")]
    #[token("\r\n")]
    Newline,

    /// One line of a plain scalar. Multi-line plain scalars are several of these.
    PlainText,

    /// `'...'`, possibly spanning lines.
    SingleQuoted,

    /// `"..."`, possibly spanning lines.
    DoubleQuoted,

    /// Body lines of a block scalar, including their line breaks.
    BlockText,

    /// Consecutive characters that may not appear in YAML text.
    Garbage,

    // --- Node kinds (non-terminals) ---
    Stream,
    Document,
    BlockMap,
    BlockSeq,
    FlowMap,
    FlowSeq,
    ExplicitKey,
    ExplicitValue,
    SeqItem,
    Plain,
    QuotedSingle,
    QuotedDouble,
    BlockLiteral,
    BlockFolded,
    Alias,
    Error,

    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    /// Inverse of `kind as u16`.
    pub fn from_u16(raw: u16) -> Option<SyntaxKind> {
        if raw >= __LAST as u16 {
            return None;
        }
        // SAFETY: `SyntaxKind` is `repr(u16)` with contiguous discriminants below `__LAST`.
        Some(unsafe { std::mem::transmute::<u16, SyntaxKind>(raw) })
    }

    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Newline | Comment)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Error | Garbage)
    }

    /// Anchor or tag, written before the content they annotate.
    #[inline]
    pub fn is_property(self) -> bool {
        matches!(self, Anchor | Tag)
    }

    #[inline]
    pub fn is_flow_indicator(self) -> bool {
        matches!(
            self,
            BraceOpen | BraceClose | BracketOpen | BracketClose | Comma | Colon | Question
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum YamlLang {}

impl Language for YamlLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> SyntaxKind {
        match SyntaxKind::from_u16(raw.0) {
            Some(kind) => kind,
            None => panic!("raw kind {} is not a yaml syntax kind", raw.0),
        }
    }

    fn kind_to_raw(kind: SyntaxKind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<YamlLang>;
pub type SyntaxToken = rowan::SyntaxToken<YamlLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// Set of token kinds, one bit per discriminant.
///
/// Node kinds sit above bit 63 and are never members.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

const fn bit(kind: SyntaxKind) -> u64 {
    let raw = kind as u16;
    assert!(raw < 64, "token kind does not fit a TokenSet");
    1 << raw
}

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= bit(kinds[i]);
            i += 1;
        }
        TokenSet(bits)
    }

    pub const fn single(kind: SyntaxKind) -> Self {
        TokenSet(bit(kind))
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let raw = kind as u16;
        raw < 64 && self.0 & (1 << raw) != 0
    }

    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }

    fn iter(self) -> impl Iterator<Item = SyntaxKind> {
        (0..64u16)
            .filter(move |i| self.0 & (1 << *i) != 0)
            .filter_map(SyntaxKind::from_u16)
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

pub mod token_sets {
    use super::*;

    /// Tokens that open a scalar or an alias.
    pub const SCALAR_FIRST: TokenSet =
        TokenSet::new(&[PlainText, SingleQuoted, DoubleQuoted, AliasRef]);

    /// Tokens that may open a node inside a flow collection.
    pub const FLOW_NODE_FIRST: TokenSet = TokenSet::new(&[
        BraceOpen,
        BracketOpen,
        PlainText,
        SingleQuoted,
        DoubleQuoted,
        AliasRef,
        Anchor,
        Tag,
    ]);

    /// Markers that end the current document's content.
    pub const DOCUMENT_BOUNDARY: TokenSet = TokenSet::new(&[DocStart, DocEnd, Directive]);
}
