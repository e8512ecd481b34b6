use super::*;
use serde_json::json;

fn is_marked(v: &serde_json::Value) -> bool {
    v.as_str().is_some_and(|s| s.starts_with("=>"))
}

fn pointers(found: &[(Pointer, &serde_json::Value)]) -> Vec<String> {
    found.iter().map(|(p, _)| p.to_string()).collect()
}

#[test]
fn collects_matches_in_document_order() {
    let doc = json!({
        "cacheKey": "=> F.properties.kind",
        "static": {
            "poi": {"when": "=> true", "fill": {"color": "red"}},
            "label": {"text": {"text": "=> F.properties.name"}}
        }
    });
    let found = collect(&doc, is_marked);
    assert_eq!(
        pointers(&found),
        vec!["/cacheKey", "/static/poi/when", "/static/label/text/text"]
    );
    assert_eq!(found[0].1, &json!("=> F.properties.kind"));
}

#[test]
fn matched_nodes_are_not_descended() {
    let doc = json!({"a": {"b": "=> 1"}});
    let found = collect(&doc, |v| (v.is_object() && v.get("b").is_some()) || is_marked(v));
    assert_eq!(pointers(&found), vec!["/a"]);
}

#[test]
fn arrays_with_truthy_head_are_walked_by_index() {
    let doc = json!({"dynamic": [{"pointer": "#/*/text/text", "value": "=> 1"}]});
    let found = collect(&doc, is_marked);
    assert_eq!(pointers(&found), vec!["/dynamic/0/value"]);
}

#[test]
fn arrays_with_falsy_head_are_leaves() {
    let doc = json!({
        "lineDash": [0, "=> 4"],
        "empty": [],
        "nulls": [null, "=> 2"],
        "walked": [1, "=> 3"]
    });
    let found = collect(&doc, is_marked);
    assert_eq!(pointers(&found), vec!["/walked/1"]);
}

#[test]
fn null_nodes_are_skipped_even_if_predicate_accepts_them() {
    let doc = json!({"a": null});
    let found = collect(&doc, |_| false);
    assert!(found.is_empty());
    let found = collect(&json!(null), |_| true);
    assert!(found.is_empty());
}

#[test]
fn parse_accepts_fragment_and_plain_forms() {
    assert_eq!(Pointer::parse("#/static/poi").to_string(), "/static/poi");
    assert_eq!(Pointer::parse("/static/poi").to_string(), "/static/poi");
    assert!(Pointer::parse("#/").is_root());
    assert!(Pointer::parse("").is_root());
}

#[test]
fn get_walks_keys_and_indices() {
    let doc = json!({"scales": [0, 1000], "static": {"poi": {"when": true}}});
    assert_eq!(Pointer::parse("/scales/1").get(&doc), Some(&json!(1000)));
    assert_eq!(
        Pointer::parse("/static/poi/when").get(&doc),
        Some(&json!(true))
    );
    assert_eq!(Pointer::parse("/static/nope").get(&doc), None);
    assert_eq!(Pointer::parse("/scales/x").get(&doc), None);
    assert_eq!(Pointer::root().get(&doc), Some(&doc));
}
