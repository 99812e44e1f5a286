use indoc::indoc;

use super::cst::SyntaxKind;
use super::lexer::{lex, token_text};

fn dump(source: &str) -> String {
    lex(source)
        .iter()
        .map(|t| format!("{:?} {:?}\n", t.kind, token_text(source, t)))
        .collect()
}

fn kinds(source: &str) -> Vec<SyntaxKind> {
    lex(source).iter().map(|t| t.kind).collect()
}

#[test]
fn block_map_tokens() {
    insta::assert_snapshot!(dump("key: value # note\n- item\n"), @r##"
    PlainText "key"
    Colon ":"
    Whitespace " "
    PlainText "value"
    Whitespace " "
    Comment "# note"
    Newline "\n"
    Dash "-"
    Whitespace " "
    PlainText "item"
    Newline "\n"
    "##);
}

#[test]
fn flow_tokens() {
    insta::assert_snapshot!(dump("{a: [b, c]}\n"), @r#"
    BraceOpen "{"
    PlainText "a"
    Colon ":"
    Whitespace " "
    BracketOpen "["
    PlainText "b"
    Comma ","
    Whitespace " "
    PlainText "c"
    BracketClose "]"
    BraceClose "}"
    Newline "\n"
    "#);
}

#[test]
fn indicators_need_context() {
    insta::assert_snapshot!(dump("url: http://x.y/z,w#frag\n-1: key:value\n"), @r#"
    PlainText "url"
    Colon ":"
    Whitespace " "
    PlainText "http://x.y/z,w#frag"
    Newline "\n"
    PlainText "-1"
    Colon ":"
    Whitespace " "
    PlainText "key:value"
    Newline "\n"
    "#);
}

#[test]
fn document_markers_and_directives() {
    insta::assert_snapshot!(dump("%YAML 1.2\n---\na\n...\n"), @r#"
    Directive "%YAML 1.2"
    Newline "\n"
    DocStart "---"
    Newline "\n"
    PlainText "a"
    Newline "\n"
    DocEnd "..."
    Newline "\n"
    "#);
}

#[test]
fn block_scalar_body_is_one_token() {
    let source = indoc! {"
        text: |
          line one

          line two
        next: 1
    "};

    insta::assert_snapshot!(dump(source), @r#"
    PlainText "text"
    Colon ":"
    Whitespace " "
    BlockHeader "|"
    Newline "\n"
    BlockText "  line one\n\n  line two\n"
    PlainText "next"
    Colon ":"
    Whitespace " "
    PlainText "1"
    Newline "\n"
    "#);
}

#[test]
fn root_block_scalar_after_marker_may_start_at_column_zero() {
    insta::assert_snapshot!(dump("--- |\nfoo\n"), @r#"
    DocStart "---"
    Whitespace " "
    BlockHeader "|"
    Newline "\n"
    BlockText "foo\n"
    "#);
}

#[test]
fn quoted_scalars_span_lines() {
    insta::assert_snapshot!(dump("- 'it''s'\n- \"a\n  b\"\n"), @r#"
    Dash "-"
    Whitespace " "
    SingleQuoted "'it''s'"
    Newline "\n"
    Dash "-"
    Whitespace " "
    DoubleQuoted "\"a\n  b\""
    Newline "\n"
    "#);
}

#[test]
fn node_properties_and_aliases() {
    insta::assert_snapshot!(dump("- &x !tag v\n- *x\n"), @r#"
    Dash "-"
    Whitespace " "
    Anchor "&x"
    Whitespace " "
    Tag "!tag"
    Whitespace " "
    PlainText "v"
    Newline "\n"
    Dash "-"
    Whitespace " "
    AliasRef "*x"
    Newline "\n"
    "#);
}

#[test]
fn crlf_is_one_newline() {
    assert_eq!(
        kinds("a: 1\r\n"),
        vec![
            SyntaxKind::PlainText,
            SyntaxKind::Colon,
            SyntaxKind::Whitespace,
            SyntaxKind::PlainText,
            SyntaxKind::Newline,
        ]
    );
}

#[test]
fn forbidden_characters_coalesce() {
    insta::assert_snapshot!(dump("\u{1}\u{2} a\n"), @r#"
    Garbage "\u{1}\u{2}"
    Whitespace " "
    PlainText "a"
    Newline "\n"
    "#);
}

#[test]
fn tokens_cover_the_source() {
    let sources = [
        "",
        "a: 1\r\nb:\r\n  - x\r\n",
        "\u{feff}# bom\nkey: 'unterminated\n",
        "{a: [b, {c: d}, e\n",
        "? |+\n  kept\n\n: >2-\n   folded\n",
        "--- !!map &a\n...\n%TAG ! tag:x\n--- *a\n",
        "\t\u{7f}x: ] , }\n",
    ];

    for source in sources {
        let tokens = lex(source);
        let mut offset = 0;
        for token in &tokens {
            assert_eq!(usize::from(token.span.start()), offset, "gap in {source:?}");
            offset = usize::from(token.span.end());
        }
        assert_eq!(offset, source.len(), "{source:?}");
        let joined: String = tokens.iter().map(|t| token_text(source, t)).collect();
        assert_eq!(joined, source);
    }
}
