use indoc::indoc;

use super::ast::ValueNode;
use super::{Parse, dump_cst, parse};
use crate::Error;
use crate::diagnostics::Diagnostics;
use crate::options::ParseOptions;

fn parsed(source: &str) -> (Parse, Diagnostics) {
    parse(source, &ParseOptions::default()).unwrap()
}

fn cst(source: &str) -> String {
    let (parse, diagnostics) = parsed(source);
    assert!(diagnostics.is_empty(), "{diagnostics}");
    dump_cst(&parse.syntax(), false)
}

fn cst_with_errors(source: &str) -> String {
    let (parse, diagnostics) = parsed(source);
    format!("{}---\n{}", dump_cst(&parse.syntax(), false), diagnostics)
}

#[test]
fn block_map_with_nested_seq() {
    insta::assert_snapshot!(cst("a: 1\nb:\n  - x\n  - y\n"), @r#"
    Stream
      Document
        BlockMap
          Plain
            PlainText "a"
          ExplicitValue
            Colon ":"
            Plain
              PlainText "1"
          Plain
            PlainText "b"
          ExplicitValue
            Colon ":"
            BlockSeq
              SeqItem
                Dash "-"
                Plain
                  PlainText "x"
              SeqItem
                Dash "-"
                Plain
                  PlainText "y"
    "#);
}

#[test]
fn flow_items_stay_flat() {
    insta::assert_snapshot!(cst("{a: [b, c], d}\n"), @r#"
    Stream
      Document
        FlowMap
          BraceOpen "{"
          Plain
            PlainText "a"
          Colon ":"
          FlowSeq
            BracketOpen "["
            Plain
              PlainText "b"
            Comma ","
            Plain
              PlainText "c"
            BracketClose "]"
          Comma ","
          Plain
            PlainText "d"
          BraceClose "}"
    "#);
}

#[test]
fn explicit_key_with_block_scalar_value() {
    insta::assert_snapshot!(cst("? &k key\n: |\n  text\n"), @r#"
    Stream
      Document
        BlockMap
          ExplicitKey
            Question "?"
            Plain
              Anchor "&k"
              PlainText "key"
          ExplicitValue
            Colon ":"
            BlockLiteral
              BlockHeader "|"
              BlockText "  text\n"
    "#);
}

#[test]
fn compact_map_in_sequence() {
    insta::assert_snapshot!(cst("- a: 1\n  b: 2\n- c\n"), @r#"
    Stream
      Document
        BlockSeq
          SeqItem
            Dash "-"
            BlockMap
              Plain
                PlainText "a"
              ExplicitValue
                Colon ":"
                Plain
                  PlainText "1"
              Plain
                PlainText "b"
              ExplicitValue
                Colon ":"
                Plain
                  PlainText "2"
          SeqItem
            Dash "-"
            Plain
              PlainText "c"
    "#);
}

#[test]
fn multi_line_plain_scalar() {
    insta::assert_snapshot!(cst("a: one\n  two\nb: 3\n"), @r#"
    Stream
      Document
        BlockMap
          Plain
            PlainText "a"
          ExplicitValue
            Colon ":"
            Plain
              PlainText "one"
              PlainText "two"
          Plain
            PlainText "b"
          ExplicitValue
            Colon ":"
            Plain
              PlainText "3"
    "#);
}

#[test]
fn properties_bind_by_line() {
    insta::assert_snapshot!(cst("&a k: v\n"), @r#"
    Stream
      Document
        BlockMap
          Plain
            Anchor "&a"
            PlainText "k"
          ExplicitValue
            Colon ":"
            Plain
              PlainText "v"
    "#);

    let source = "&a\nk: v\n";
    insta::assert_snapshot!(cst(source), @r#"
    Stream
      Document
        BlockMap
          Anchor "&a"
          Plain
            PlainText "k"
          ExplicitValue
            Colon ":"
            Plain
              PlainText "v"
    "#);

    let (parse, _) = parsed(source);
    let root = parse
        .stream()
        .documents()
        .next()
        .and_then(|d| d.root())
        .unwrap();
    assert!(matches!(root, ValueNode::BlockMap(_)), "{root:?}");
    assert_eq!(root.properties().anchor_name().as_deref(), Some("a"));
}

#[test]
fn documents_split_on_markers() {
    let source = "%YAML 1.2\n--- a\n...\n---\n- b\n";
    insta::assert_snapshot!(cst(source), @r#"
    Stream
      Document
        Directive "%YAML 1.2"
        DocStart "---"
        Plain
          PlainText "a"
        DocEnd "..."
      Document
        DocStart "---"
        BlockSeq
          SeqItem
            Dash "-"
            Plain
              PlainText "b"
    "#);

    let (parse, _) = parsed(source);
    let documents: Vec<_> = parse.stream().documents().collect();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].directives().count(), 1);
    assert!(documents[1].has_start_marker());
}

#[test]
fn trivia_is_kept() {
    let (parse, _) = parsed("a: 1 # c\n");

    insta::assert_snapshot!(dump_cst(&parse.syntax(), true), @r##"
    Stream
      Document
        BlockMap
          Plain
            PlainText "a"
          ExplicitValue
            Colon ":"
            Whitespace " "
            Plain
              PlainText "1"
        Whitespace " "
        Comment "# c"
        Newline "\n"
    "##);
}

#[test]
fn tree_text_is_the_source() {
    let sources = [
        "",
        "a: 1\r\nb:\r\n  - x\r\n",
        indoc! {"
            # top
            key: &a value   # trailing
            ? [x, y]
            : {z: *a}
            text: >-
              folded
        "},
        "- [a, b\n- c\n",
        "a:\n\tb: 1\n",
        "--- |\nfoo\n...\n--- 'x\n",
        "}\n: : x\n- - -\n",
    ];

    for source in sources {
        let (parse, _) = parsed(source);
        assert_eq!(parse.syntax().to_string(), source);
    }
}

#[test]
fn content_after_root_is_an_error() {
    insta::assert_snapshot!(cst_with_errors("- a\nb: 1\n"), @r#"
    Stream
      Document
        BlockSeq
          SeqItem
            Dash "-"
            Plain
              PlainText "a"
        Error
          PlainText "b"
          Colon ":"
          PlainText "1"
    ---
    error at 4..5: unexpected token: content after the document root
    "#);
}

#[test]
fn unclosed_flow_sequence() {
    insta::assert_snapshot!(cst_with_errors("[a, b\n"), @r#"
    Stream
      Document
        FlowSeq
          BracketOpen "["
          Plain
            PlainText "a"
          Comma ","
          Plain
            PlainText "b"
    ---
    error at 0..5: missing closing `]` (related: opened here at 0..1)
    "#);
}

#[test]
fn text_after_block_scalar_header() {
    insta::assert_snapshot!(cst_with_errors("a: | x\n"), @r#"
    Stream
      Document
        BlockMap
          Plain
            PlainText "a"
          ExplicitValue
            Colon ":"
            BlockLiteral
              BlockHeader "|"
              Error
                PlainText "x"
    ---
    error at 5..6: unexpected token: text after a block scalar header
    "#);
}

#[test]
fn tab_indentation() {
    let (_, diagnostics) = parsed("a:\n\tb: 1\n");

    insta::assert_snapshot!(diagnostics.to_string(), @"error at 3..4: tabs are not allowed as indentation");
}

#[test]
fn unterminated_string() {
    let (_, diagnostics) = parsed("a: 'open\n");

    insta::assert_snapshot!(diagnostics.to_string(), @"error at 3..9: missing closing quote; the string runs to the end of the input");
}

#[test]
fn exec_fuel_exhaustion() {
    let options = ParseOptions::default().with_exec_fuel(Some(3));
    let err = parse("a: [1, 2, 3]\n", &options).unwrap_err();

    assert!(matches!(err, Error::ExecFuelExhausted));
}

#[test]
fn recursion_fuel_exhaustion() {
    let options = ParseOptions::default().with_recursion_fuel(Some(2));
    let err = parse("[[[[a]]]]\n", &options).unwrap_err();

    assert!(matches!(err, Error::RecursionLimitExceeded));
}

#[test]
fn no_fuel_limits() {
    let options = ParseOptions::default()
        .with_exec_fuel(None)
        .with_recursion_fuel(None);
    let nested = format!("{}a{}", "[".repeat(64), "]".repeat(64));

    let (_, diagnostics) = parse(&nested, &options).unwrap();
    assert!(diagnostics.is_empty());
}
