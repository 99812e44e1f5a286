use super::*;
use crate::Error;

fn sample() -> Map {
    let mut map = Map::new();
    map.add(Pair::new("a", 1)).unwrap();
    map.add(Pair::new("b", "two")).unwrap();
    map
}

#[test]
fn add_and_get() {
    let map = sample();

    assert_eq!(map.len(), 2);
    assert_eq!(map.get("a"), Some(Lookup::Scalar(&ScalarValue::Int(1))));
    assert_eq!(
        map.get("b"),
        Some(Lookup::Scalar(&ScalarValue::from("two")))
    );
    assert_eq!(map.get("c"), None);
}

#[test]
fn add_duplicate_fails_and_leaves_map_unchanged() {
    let mut map = sample();
    let before = map.clone();

    let err = map.add(Pair::new("a", 99)).unwrap_err();

    assert!(matches!(err, Error::DuplicateKey { ref key } if key == "a"));
    assert_eq!(map, before);
}

#[test]
fn add_bare_key() {
    let mut map = Map::new();
    map.add("lonely").unwrap();

    let pair = map.pairs().next().unwrap();
    assert!(pair.value.is_none());
    assert!(map.has("lonely"));
    assert_eq!(map.get("lonely"), None);
}

#[test]
fn null_key_matches_absent_key() {
    let mut map = Map::new();
    map.add(Pair::from_parts(None, Some(Node::from(123)))).unwrap();

    assert!(map.has(ScalarValue::Null));
    assert_eq!(
        map.get(ScalarValue::Null),
        Some(Lookup::Scalar(&ScalarValue::Int(123)))
    );
    assert!(map.add(Pair::new(ScalarValue::Null, 1)).is_err());
}

#[test]
fn keys_compare_by_scalar_value() {
    let map = sample();
    let key = Node::from("a");

    assert!(map.has(&key));
    assert!(!map.has(1));
    assert!(!map.has(true));
}

#[test]
fn collection_keys_compare_by_identity() {
    let mut map = Map::new();
    map.add(Pair::new(Seq::new(), "empty")).unwrap();
    // A structurally equal but distinct key is not the same key.
    map.add(Pair::new(Seq::new(), "other")).unwrap();

    let first_key = map.pairs().next().unwrap().key.as_ref().unwrap();
    assert_eq!(
        map.get(first_key),
        Some(Lookup::Scalar(&ScalarValue::from("empty")))
    );
    assert!(!map.has(&Node::from(Seq::new())));
}

#[test]
fn get_node_keeps_wrapper() {
    let mut map = Map::new();
    map.set("list", Seq::new());
    map.set("n", 3);

    assert!(matches!(map.get("list"), Some(Lookup::Node(Node::Seq(_)))));
    assert!(matches!(map.get_node("n"), Some(Node::Scalar(_))));
}

#[test]
fn set_replaces_in_place() {
    let mut map = sample();
    map.set("a", 10);
    map.set("c", 3);

    let keys: Vec<String> = map
        .pairs()
        .map(|p| p.key.as_ref().unwrap().scalar_value().unwrap().to_string())
        .collect();
    assert_eq!(keys, ["a", "b", "c"]);
    assert_eq!(map.get("a"), Some(Lookup::Scalar(&ScalarValue::Int(10))));
}

#[test]
fn delete_reports_presence() {
    let mut map = sample();

    assert!(map.delete("a"));
    assert!(!map.delete("a"));
    assert_eq!(map.len(), 1);
}

#[test]
fn merge_entries_answer_to_merge_key() {
    let mut map = sample();
    let source = {
        let mut m = Map::new();
        m.set("x", 1);
        m
    };
    map.add(Merge::new(source).unwrap()).unwrap();

    assert!(map.has(MERGE_KEY));
    assert!(matches!(map.get_node(MERGE_KEY), Some(Node::Map(_))));
    assert!(map.add(Merge::new(Map::new()).unwrap()).is_err());
}

#[test]
fn merge_rejects_non_map_sources() {
    assert!(matches!(
        Merge::new(Node::from(1)),
        Err(Error::MergeSourceNotMap)
    ));

    let mut seq = Seq::new();
    seq.push(Map::new());
    seq.push("nope");
    assert!(matches!(Merge::new(seq), Err(Error::MergeSourceNotMap)));

    let mut ok = Seq::new();
    ok.push(Map::new());
    ok.push(Alias::new("base"));
    assert_eq!(Merge::new(ok).unwrap().sources().len(), 2);
}

#[test]
fn fingerprint_tracks_content() {
    let map = Node::from(sample());
    let same = Node::from(sample());
    let mut changed = sample();
    changed.set("a", 2);

    assert_eq!(map.fingerprint(), same.fingerprint());
    assert_ne!(map.fingerprint(), Node::from(changed).fingerprint());
}

#[test]
fn fingerprint_ignores_provenance() {
    let mut node = Node::from("x");
    let before = node.fingerprint();
    node.meta_mut().provenance = Some(Provenance {
        origin: OriginId {
            document: 0,
            index: 0,
        },
        fingerprint: 0,
    });

    assert_eq!(node.fingerprint(), before);
    assert!(!node.is_pristine());
    node.stamp();
    assert!(node.is_pristine());
    node.meta_mut().comment = Some(" edited".to_string());
    assert!(!node.is_pristine());
}
