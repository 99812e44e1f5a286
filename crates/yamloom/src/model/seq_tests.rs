use super::*;
use crate::Error;

fn sample() -> Seq {
    let mut seq = Seq::new();
    seq.push(1);
    seq.push("two");
    seq.push(Map::new());
    seq
}

#[test]
fn get_unwraps_scalars() {
    let seq = sample();

    assert_eq!(seq.get(0), Some(Lookup::Scalar(&ScalarValue::Int(1))));
    assert!(matches!(seq.get(2), Some(Lookup::Node(Node::Map(_)))));
    assert!(matches!(seq.get_node(1), Some(Node::Scalar(_))));
    assert_eq!(seq.get(3), None);
}

#[test]
fn set_within_bounds() {
    let mut seq = sample();
    seq.set(1, 2).unwrap();

    assert_eq!(seq.get(1), Some(Lookup::Scalar(&ScalarValue::Int(2))));
}

#[test]
fn set_past_end_fails() {
    let mut seq = sample();
    let err = seq.set(3, 4).unwrap_err();

    assert!(matches!(err, Error::IndexOutOfBounds { index: 3, len: 3 }));
    insta::assert_snapshot!(err.to_string(), @"index 3 is out of bounds for a sequence of length 3");
}

#[test]
fn delete_and_has() {
    let mut seq = sample();

    assert!(seq.has(2));
    assert!(seq.delete(0));
    assert!(!seq.has(2));
    assert!(!seq.delete(5));
    assert_eq!(seq.len(), 2);
}

#[test]
fn flow_constructor_sets_style() {
    let seq = Seq::flow();

    assert!(seq.is_empty());
    assert_eq!(seq.style, CollectionStyle::Flow);
}

#[test]
fn children_follow_document_order() {
    let pair = Node::from(Pair::new("k", "v"));
    let texts: Vec<String> = pair
        .children()
        .into_iter()
        .map(|n| n.scalar_value().unwrap().to_string())
        .collect();

    assert_eq!(texts, ["k", "v"]);
    assert_eq!(Node::from(sample()).children().len(), 3);
}
