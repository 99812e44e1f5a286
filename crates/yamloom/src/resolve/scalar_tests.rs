use super::scalar::*;
use crate::model::ScalarValue;
use rowan::{TextRange, TextSize};

fn fold(text: &str, style: FlowScalar) -> String {
    fold_flow(text, style, TextSize::from(0)).0
}

#[test]
fn plain_core_schema() {
    assert_eq!(resolve_plain(""), ScalarValue::Null);
    assert_eq!(resolve_plain("~"), ScalarValue::Null);
    assert_eq!(resolve_plain("NULL"), ScalarValue::Null);
    assert_eq!(resolve_plain("True"), ScalarValue::Bool(true));
    assert_eq!(resolve_plain("FALSE"), ScalarValue::Bool(false));
    assert_eq!(resolve_plain("tRUE"), ScalarValue::from("tRUE"));
}

#[test]
fn plain_integers() {
    assert_eq!(resolve_plain("42"), ScalarValue::Int(42));
    assert_eq!(resolve_plain("-17"), ScalarValue::Int(-17));
    assert_eq!(resolve_plain("+3"), ScalarValue::Int(3));
    assert_eq!(resolve_plain("0o17"), ScalarValue::Int(15));
    assert_eq!(resolve_plain("0x1F"), ScalarValue::Int(31));
    assert_eq!(resolve_plain("-0x1F"), ScalarValue::from("-0x1F"));
    assert_eq!(resolve_plain("0x"), ScalarValue::from("0x"));
}

#[test]
fn plain_integer_overflow_becomes_float() {
    assert_eq!(
        resolve_plain("99999999999999999999"),
        ScalarValue::Float(1e20)
    );
}

#[test]
fn plain_floats() {
    assert_eq!(resolve_plain("1.5"), ScalarValue::Float(1.5));
    assert_eq!(resolve_plain(".5"), ScalarValue::Float(0.5));
    assert_eq!(resolve_plain("2."), ScalarValue::Float(2.0));
    assert_eq!(resolve_plain("-1e3"), ScalarValue::Float(-1000.0));
    assert_eq!(resolve_plain(".inf"), ScalarValue::Float(f64::INFINITY));
    assert_eq!(resolve_plain("-.Inf"), ScalarValue::Float(f64::NEG_INFINITY));
    assert!(matches!(resolve_plain(".NaN"), ScalarValue::Float(x) if x.is_nan()));
    assert_eq!(resolve_plain("1.2.3"), ScalarValue::from("1.2.3"));
    assert_eq!(resolve_plain("."), ScalarValue::from("."));
    assert_eq!(resolve_plain("1e"), ScalarValue::from("1e"));
}

#[test]
fn plain_folding() {
    assert_eq!(fold("a  \n  b", FlowScalar::Plain), "a b");
    assert_eq!(fold("a\n\n b", FlowScalar::Plain), "a\nb");
    assert_eq!(fold("a\r\n\r\n\r\nb", FlowScalar::Plain), "a\n\nb");
}

#[test]
fn single_quoted_unescape() {
    assert_eq!(fold("it''s", FlowScalar::SingleQuoted), "it's");
    assert_eq!(fold("a\\n", FlowScalar::SingleQuoted), "a\\n");
}

#[test]
fn double_quoted_escapes() {
    assert_eq!(
        fold(r#"tab\there \"q\" \\ \x41é\U0001F600"#, FlowScalar::DoubleQuoted),
        "tab\there \"q\" \\ Aé😀"
    );
    assert_eq!(fold(r"\N\_\L\P", FlowScalar::DoubleQuoted), "\u{85}\u{a0}\u{2028}\u{2029}");
}

#[test]
fn double_quoted_escaped_line_break() {
    assert_eq!(fold("a\\\n   b", FlowScalar::DoubleQuoted), "ab");
    // Escaped whitespace survives folding.
    assert_eq!(fold("a\\t\n b", FlowScalar::DoubleQuoted), "a\t b");
}

#[test]
fn invalid_escape_is_kept_and_located() {
    let (value, invalid) = fold_flow(r"a\qb", FlowScalar::DoubleQuoted, TextSize::from(10));

    assert_eq!(value, r"a\qb");
    assert_eq!(
        invalid,
        vec![TextRange::new(TextSize::from(11), TextSize::from(13))]
    );
}

#[test]
fn literal_chomping() {
    assert_eq!(block_scalar("|", "  a\n  b\n\n", 0), "a\nb\n");
    assert_eq!(block_scalar("|-", "  a\n  b\n\n", 0), "a\nb");
    assert_eq!(block_scalar("|+", "  a\n  b\n\n", 0), "a\nb\n\n");
}

#[test]
fn literal_keeps_inner_indentation() {
    assert_eq!(block_scalar("|", "  a\n    b\n  c\n", 0), "a\n  b\nc\n");
}

#[test]
fn literal_explicit_indentation_is_relative_to_header_line() {
    assert_eq!(block_scalar("|1", "     a\n    b\n", 3), " a\nb\n");
}

#[test]
fn folded_joins_lines() {
    assert_eq!(block_scalar(">", "  a\n  b\n\n  c\n", 0), "a b\nc\n");
}

#[test]
fn folded_keeps_breaks_around_more_indented_lines() {
    assert_eq!(block_scalar(">", "  a\n    b\n  c\n", 0), "a\n  b\nc\n");
}

#[test]
fn empty_block_scalar() {
    assert_eq!(block_scalar("|", "", 0), "");
    assert_eq!(block_scalar("|+", "\n\n", 0), "\n\n");
}

#[test]
fn block_scalar_crlf() {
    assert_eq!(block_scalar("|", "  a\r\n  b\r\n", 0), "a\nb\n");
}
