//! Typed AST wrappers over CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors.
//! Cast is infallible for correct `SyntaxKind` - validation happens elsewhere.

use rowan::{NodeOrToken, TextRange};

use super::cst::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(Stream, Stream);
ast_node!(Document, Document);
ast_node!(BlockMap, BlockMap);
ast_node!(BlockSeq, BlockSeq);
ast_node!(FlowMap, FlowMap);
ast_node!(FlowSeq, FlowSeq);
ast_node!(ExplicitKey, ExplicitKey);
ast_node!(ExplicitValue, ExplicitValue);
ast_node!(SeqItem, SeqItem);
ast_node!(Plain, Plain);
ast_node!(QuotedSingle, QuotedSingle);
ast_node!(QuotedDouble, QuotedDouble);
ast_node!(BlockLiteral, BlockLiteral);
ast_node!(BlockFolded, BlockFolded);
ast_node!(Alias, Alias);

/// Any node that carries a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueNode {
    Plain(Plain),
    QuotedSingle(QuotedSingle),
    QuotedDouble(QuotedDouble),
    BlockLiteral(BlockLiteral),
    BlockFolded(BlockFolded),
    FlowMap(FlowMap),
    FlowSeq(FlowSeq),
    BlockMap(BlockMap),
    BlockSeq(BlockSeq),
    Alias(Alias),
}

impl ValueNode {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::Plain => Plain::cast(node).map(ValueNode::Plain),
            SyntaxKind::QuotedSingle => QuotedSingle::cast(node).map(ValueNode::QuotedSingle),
            SyntaxKind::QuotedDouble => QuotedDouble::cast(node).map(ValueNode::QuotedDouble),
            SyntaxKind::BlockLiteral => BlockLiteral::cast(node).map(ValueNode::BlockLiteral),
            SyntaxKind::BlockFolded => BlockFolded::cast(node).map(ValueNode::BlockFolded),
            SyntaxKind::FlowMap => FlowMap::cast(node).map(ValueNode::FlowMap),
            SyntaxKind::FlowSeq => FlowSeq::cast(node).map(ValueNode::FlowSeq),
            SyntaxKind::BlockMap => BlockMap::cast(node).map(ValueNode::BlockMap),
            SyntaxKind::BlockSeq => BlockSeq::cast(node).map(ValueNode::BlockSeq),
            SyntaxKind::Alias => Alias::cast(node).map(ValueNode::Alias),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            ValueNode::Plain(n) => n.as_cst(),
            ValueNode::QuotedSingle(n) => n.as_cst(),
            ValueNode::QuotedDouble(n) => n.as_cst(),
            ValueNode::BlockLiteral(n) => n.as_cst(),
            ValueNode::BlockFolded(n) => n.as_cst(),
            ValueNode::FlowMap(n) => n.as_cst(),
            ValueNode::FlowSeq(n) => n.as_cst(),
            ValueNode::BlockMap(n) => n.as_cst(),
            ValueNode::BlockSeq(n) => n.as_cst(),
            ValueNode::Alias(n) => n.as_cst(),
        }
    }

    pub fn text_range(&self) -> TextRange {
        self.as_cst().text_range()
    }

    /// Anchor and tag written directly on this node.
    pub fn properties(&self) -> Properties {
        let mut properties = Properties::default();
        for el in self.as_cst().children_with_tokens() {
            match el {
                NodeOrToken::Token(t) if t.kind() == SyntaxKind::Anchor => {
                    properties.anchor = Some(t)
                }
                NodeOrToken::Token(t) if t.kind() == SyntaxKind::Tag => properties.tag = Some(t),
                NodeOrToken::Token(t) if t.kind().is_trivia() => {}
                _ => break,
            }
        }
        properties
    }

    /// Range of the node without its leading properties.
    pub fn content_range(&self) -> TextRange {
        let node = self.as_cst();
        let start = node
            .children_with_tokens()
            .find(|el| !el.kind().is_trivia() && !el.kind().is_property())
            .map_or(node.text_range().end(), |el| el.text_range().start());
        TextRange::new(start, node.text_range().end())
    }

    pub fn is_block_collection(&self) -> bool {
        matches!(self, ValueNode::BlockMap(_) | ValueNode::BlockSeq(_))
    }
}

/// Node properties: `&anchor` and `!tag`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    pub anchor: Option<SyntaxToken>,
    pub tag: Option<SyntaxToken>,
}

impl Properties {
    /// Anchor name without the `&` sigil.
    pub fn anchor_name(&self) -> Option<String> {
        self.anchor.as_ref().map(|t| t.text()[1..].to_string())
    }

    pub fn tag_text(&self) -> Option<String> {
        self.tag.as_ref().map(|t| t.text().to_string())
    }
}

fn direct_tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + '_ {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
}

fn comment_tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + '_ {
    direct_tokens(node).filter(|t| t.kind() == SyntaxKind::Comment)
}

fn token_range(node: &SyntaxNode, kinds: &[SyntaxKind]) -> Option<TextRange> {
    let mut tokens = direct_tokens(node).filter(|t| kinds.contains(&t.kind()));
    let first = tokens.next()?.text_range();
    let last = tokens.last().map_or(first, |t| t.text_range());
    Some(first.cover(last))
}

impl Stream {
    pub fn documents(&self) -> impl Iterator<Item = Document> + '_ {
        self.0.children().filter_map(Document::cast)
    }
}

impl Document {
    pub fn root(&self) -> Option<ValueNode> {
        self.0.children().find_map(ValueNode::cast)
    }

    pub fn directives(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        direct_tokens(&self.0).filter(|t| t.kind() == SyntaxKind::Directive)
    }

    pub fn has_start_marker(&self) -> bool {
        direct_tokens(&self.0).any(|t| t.kind() == SyntaxKind::DocStart)
    }

    /// Comments before and after the root node. Without a root every comment is "before".
    pub fn comments(&self) -> (Vec<SyntaxToken>, Vec<SyntaxToken>) {
        let root_start = self.root().map(|r| r.text_range().start());
        comment_tokens(&self.0).partition(|t| match root_start {
            Some(start) => t.text_range().end() <= start,
            None => true,
        })
    }
}

/// A child of a block map, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapItem {
    Comment(SyntaxToken),
    ExplicitKey(ExplicitKey),
    ExplicitValue(ExplicitValue),
    Node(ValueNode),
}

impl BlockMap {
    pub fn items(&self) -> impl Iterator<Item = MapItem> + '_ {
        self.0.children_with_tokens().filter_map(|el| match el {
            NodeOrToken::Token(t) if t.kind() == SyntaxKind::Comment => Some(MapItem::Comment(t)),
            NodeOrToken::Token(_) => None,
            NodeOrToken::Node(n) => match n.kind() {
                SyntaxKind::ExplicitKey => ExplicitKey::cast(n).map(MapItem::ExplicitKey),
                SyntaxKind::ExplicitValue => ExplicitValue::cast(n).map(MapItem::ExplicitValue),
                _ => ValueNode::cast(n).map(MapItem::Node),
            },
        })
    }
}

macro_rules! marker_node {
    ($name:ident) => {
        impl $name {
            pub fn indicator(&self) -> Option<SyntaxToken> {
                direct_tokens(&self.0).find(|t| !t.kind().is_trivia())
            }

            pub fn node(&self) -> Option<ValueNode> {
                self.0.children().find_map(ValueNode::cast)
            }

            /// Comments between the indicator and the node.
            pub fn comments(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
                comment_tokens(&self.0)
            }
        }
    };
}

marker_node!(ExplicitKey);
marker_node!(ExplicitValue);
marker_node!(SeqItem);

/// A child of a flow collection, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowItem {
    /// One of `{ } [ ] , : ?`
    Indicator(SyntaxToken),
    Comment(SyntaxToken),
    Node(ValueNode),
}

impl FlowItem {
    pub fn text_range(&self) -> TextRange {
        match self {
            FlowItem::Indicator(t) | FlowItem::Comment(t) => t.text_range(),
            FlowItem::Node(n) => n.text_range(),
        }
    }
}

fn flow_items(node: &SyntaxNode) -> impl Iterator<Item = FlowItem> + '_ {
    node.children_with_tokens().filter_map(|el| match el {
        NodeOrToken::Token(t) if t.kind() == SyntaxKind::Comment => Some(FlowItem::Comment(t)),
        NodeOrToken::Token(t) if t.kind().is_flow_indicator() => Some(FlowItem::Indicator(t)),
        NodeOrToken::Token(_) => None,
        NodeOrToken::Node(n) => ValueNode::cast(n).map(FlowItem::Node),
    })
}

impl FlowMap {
    pub fn items(&self) -> impl Iterator<Item = FlowItem> + '_ {
        flow_items(&self.0)
    }
}

impl FlowSeq {
    pub fn items(&self) -> impl Iterator<Item = FlowItem> + '_ {
        flow_items(&self.0)
    }
}

/// A child of a block sequence, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeqEntry {
    Item(SeqItem),
    Comment(SyntaxToken),
}

impl BlockSeq {
    pub fn entries(&self) -> impl Iterator<Item = SeqEntry> + '_ {
        self.0.children_with_tokens().filter_map(|el| match el {
            NodeOrToken::Token(t) if t.kind() == SyntaxKind::Comment => Some(SeqEntry::Comment(t)),
            NodeOrToken::Token(_) => None,
            NodeOrToken::Node(n) => SeqItem::cast(n).map(SeqEntry::Item),
        })
    }
}

impl Plain {
    /// From the first to the last text line, including the breaks in between.
    pub fn value_range(&self) -> Option<TextRange> {
        token_range(&self.0, &[SyntaxKind::PlainText])
    }
}

impl QuotedSingle {
    pub fn token(&self) -> Option<SyntaxToken> {
        direct_tokens(&self.0).find(|t| t.kind() == SyntaxKind::SingleQuoted)
    }
}

impl QuotedDouble {
    pub fn token(&self) -> Option<SyntaxToken> {
        direct_tokens(&self.0).find(|t| t.kind() == SyntaxKind::DoubleQuoted)
    }
}

macro_rules! block_scalar_node {
    ($name:ident) => {
        impl $name {
            pub fn header(&self) -> Option<SyntaxToken> {
                direct_tokens(&self.0).find(|t| t.kind() == SyntaxKind::BlockHeader)
            }

            pub fn body(&self) -> Option<SyntaxToken> {
                direct_tokens(&self.0).find(|t| t.kind() == SyntaxKind::BlockText)
            }
        }
    };
}

block_scalar_node!(BlockLiteral);
block_scalar_node!(BlockFolded);

impl Alias {
    /// Referenced anchor name without the `*` sigil.
    pub fn name(&self) -> Option<String> {
        direct_tokens(&self.0)
            .find(|t| t.kind() == SyntaxKind::AliasRef)
            .map(|t| t.text()[1..].to_string())
    }
}
