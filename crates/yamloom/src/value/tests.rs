use indoc::indoc;

use super::*;
use crate::{Document, Error, ParseOptions, ToValueOptions};

fn merged(source: &str) -> Document {
    Document::parse_with(source, &ParseOptions::default().with_merge(true)).unwrap()
}

fn json(value: &Value) -> String {
    serde_json::to_string(value).unwrap()
}

#[test]
fn merge_precedence() {
    let doc = merged("{a: 1, <<: [{a: 2, b: 2}, {b: 3, c: 3}]}");

    assert!(doc.diagnostics().is_empty());
    insta::assert_snapshot!(json(&doc.to_value().unwrap()), @r#"{"a":1,"b":2,"c":3}"#);
}

#[test]
fn merge_splices_at_its_position() {
    let doc = merged(indoc! {"
        base: &base {x: 1, y: 2}
        item:
          first: 0
          <<: *base
          y: 20
    "});

    insta::assert_snapshot!(json(&doc.to_value().unwrap()), @r#"{"base":{"x":1,"y":2},"item":{"first":0,"x":1,"y":20}}"#);
}

#[test]
fn nested_merges_resolve_first() {
    let doc = merged(indoc! {"
        a: &a {x: 1}
        b: &b {<<: *a, y: 2}
        c: {<<: *b, z: 3}
    "});

    insta::assert_snapshot!(json(&doc.to_value().unwrap()), @r#"{"a":{"x":1},"b":{"x":1,"y":2},"c":{"x":1,"y":2,"z":3}}"#);
}

#[test]
fn merge_alias_to_scalar_fails_on_projection() {
    let doc = merged("s: &s 1\nm:\n  <<: *s\n");

    assert!(matches!(doc.to_value(), Err(Error::MergeSourceNotMap)));
}

#[test]
fn merge_key_stays_plain_when_disabled() {
    let doc = Document::parse("{a: 1, <<: {b: 2}}").unwrap();

    insta::assert_snapshot!(json(&doc.to_value().unwrap()), @r#"{"a":1,"<<":{"b":2}}"#);
}

#[test]
fn map_as_map_keeps_key_types() {
    let doc = Document::parse("{1: one, true: yes, ~: nothing}").unwrap();
    let options = ToValueOptions::default().with_map_as_map(true);
    let value = doc.to_value_with(&options).unwrap();

    let Value::Map(entries) = &value else {
        panic!("expected a map, got {value:?}");
    };
    assert_eq!(entries.get(&Value::Int(1)), Some(&Value::String("one".into())));
    assert_eq!(entries.get(&Value::Bool(true)), Some(&Value::String("yes".into())));
    assert_eq!(entries.get(&Value::Null), Some(&Value::String("nothing".into())));

    let object = doc.to_value().unwrap();
    insta::assert_snapshot!(json(&object), @r#"{"1":"one","true":"yes","":"nothing"}"#);
}

#[test]
fn collection_keys_become_flow_text() {
    let doc = Document::parse("{[a, b]: 1, {c: d}: 2}").unwrap();

    insta::assert_snapshot!(json(&doc.to_value().unwrap()), @r#"{"[a, b]":1,"{c: d}":2}"#);
}

#[test]
fn aliases_project_their_target() {
    let doc = Document::parse("a: &x [1, 2]\nb: *x\n").unwrap();

    insta::assert_snapshot!(json(&doc.to_value().unwrap()), @r#"{"a":[1,2],"b":[1,2]}"#);
}

#[test]
fn alias_limit() {
    let doc = Document::parse("a: &a [1]\nb: [*a, *a, *a]\n").unwrap();
    let options = ToValueOptions::default().with_max_alias_count(Some(2));

    assert!(matches!(
        doc.to_value_with(&options),
        Err(Error::AliasLimitExceeded)
    ));
    assert!(doc.to_value().is_ok());
}

#[test]
fn unresolved_alias() {
    let doc = Document::parse("a: *missing\n").unwrap();

    let err = doc.to_value().unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"alias `*missing` does not refer to a preceding anchor");
}

#[test]
fn later_anchor_shadows_earlier() {
    let doc = Document::parse("- &x 1\n- *x\n- &x 2\n- *x\n").unwrap();

    insta::assert_snapshot!(json(&doc.to_value().unwrap()), @"[1,1,2,2]");
}

#[test]
fn projection_is_idempotent() {
    let doc = Document::parse(indoc! {"
        name: demo
        list: [1, 2.5, true, ~]
        nested:
          - a: x
            b: [y]
    "})
    .unwrap();
    let first = doc.to_value().unwrap();

    let mut rebuilt = Document::parse("").unwrap();
    rebuilt.set_root(Some(Node::from(first.clone())));
    let second = rebuilt.to_value().unwrap();

    assert_eq!(first, second);
    assert_eq!(json(&first), json(&second));
}

#[test]
fn pair_outside_map_projects_as_map() {
    let node = Node::from(Pair::new("k", 1));
    let root = Node::Seq(Seq {
        items: vec![node],
        ..Seq::default()
    });
    let options = ToValueOptions::default();

    let value = Projector::new(&root, &options).project(&root).unwrap();
    insta::assert_snapshot!(json(&value), @r#"[{"k":1}]"#);
}

#[test]
fn non_pair_map_item_fails() {
    let root = Node::Map(Map {
        items: vec![Node::from(1)],
        ..Map::default()
    });
    let options = ToValueOptions::default();

    let err = Projector::new(&root, &options).project(&root).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"map items must be pairs, found scalar");
}

#[test]
fn display_is_flow_notation() {
    let doc = Document::parse("a: [1, x]\nb: {c: ~}\nf: 1.0\n").unwrap();

    insta::assert_snapshot!(doc.to_value().unwrap().to_string(), @"{a: [1, x], b: {c: null}, f: 1.0}");
}

#[test]
fn accessors() {
    let value = Document::parse("n: 3\ns: text\nl: [true]\n")
        .unwrap()
        .to_value()
        .unwrap();

    assert_eq!(value.get("n").and_then(Value::as_i64), Some(3));
    assert_eq!(value.get("n").and_then(Value::as_f64), Some(3.0));
    assert_eq!(value.get("s").and_then(Value::as_str), Some("text"));
    let list = value.get("l").and_then(Value::as_seq).unwrap();
    assert_eq!(list[0].as_bool(), Some(true));
    assert!(value.get("missing").is_none());
}
