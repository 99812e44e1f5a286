use rowan::Language;

use super::cst::token_sets::{DOCUMENT_BOUNDARY, FLOW_NODE_FIRST, SCALAR_FIRST};
use super::cst::{SyntaxKind, SyntaxKind::*, TokenSet, YamlLang};

#[test]
fn token_set_membership() {
    let set = TokenSet::new(&[BraceOpen, Colon, Dash]);
    assert!(set.contains(BraceOpen));
    assert!(set.contains(Dash));
    assert!(!set.contains(BracketOpen));
    assert!(!TokenSet::EMPTY.contains(BraceOpen));
    assert!(TokenSet::single(Comma).contains(Comma));
}

#[test]
fn token_set_union() {
    let set = SCALAR_FIRST.union(TokenSet::single(BraceOpen));
    assert!(set.contains(PlainText));
    assert!(set.contains(AliasRef));
    assert!(set.contains(BraceOpen));
    assert!(!set.contains(Anchor));
}

#[test]
fn token_set_ignores_node_kinds() {
    assert!(!FLOW_NODE_FIRST.contains(Stream));
    assert!(!DOCUMENT_BOUNDARY.contains(__LAST));
}

#[test]
fn token_set_debug() {
    insta::assert_snapshot!(format!("{:?}", DOCUMENT_BOUNDARY), @"{DocStart, DocEnd, Directive}");
    assert_eq!(format!("{:?}", TokenSet::EMPTY), "{}");
}

#[test]
fn kind_count_fits_token_set() {
    assert!((__LAST as u16) < 64);
}

#[test]
fn kind_classes() {
    assert!(Whitespace.is_trivia());
    assert!(Comment.is_trivia());
    assert!(!BlockText.is_trivia());

    assert!(Garbage.is_error());
    assert!(Error.is_error());
    assert!(!PlainText.is_error());

    assert!(Anchor.is_property());
    assert!(Tag.is_property());
    assert!(!AliasRef.is_property());

    assert!(Comma.is_flow_indicator());
    assert!(!Dash.is_flow_indicator());
}

#[test]
fn language_round_trip() {
    for kind in [BraceOpen, Garbage, Stream, Alias, Error] {
        let raw = YamlLang::kind_to_raw(kind);
        assert_eq!(YamlLang::kind_from_raw(raw), kind);
    }
}

#[test]
#[should_panic]
fn language_rejects_out_of_range_kinds() {
    YamlLang::kind_from_raw(rowan::SyntaxKind(__LAST as u16));
}

#[test]
fn kind_from_u16_is_bounded() {
    assert_eq!(SyntaxKind::from_u16(BraceOpen as u16), Some(BraceOpen));
    assert_eq!(SyntaxKind::from_u16(Error as u16), Some(Error));
    assert_eq!(SyntaxKind::from_u16(__LAST as u16), None);
}
