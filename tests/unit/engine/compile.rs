use super::*;
use serde_json::json;

const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="3" height="3"><rect width="3" height="3"/></svg>"#;

fn engine(doc: serde_json::Value) -> StyleEngine {
    StyleEngine::new(Some("test"), doc).unwrap()
}

#[test]
fn expressions_are_installed_at_their_pointers() {
    let compilation = engine(json!({
        "cacheKey": "=> F.properties.kind",
        "static": {"poi": {"text": {"text": "=> F.properties.name"}}}
    }))
    .begin_compile();
    assert!(compilation.diagnostics().is_empty());
    assert!(matches!(compilation.tree.field("cacheKey"), Some(Node::Expr(_))));
    assert!(matches!(
        compilation.tree.get(&Pointer::parse("/static/poi/text/text")),
        Some(Node::Expr(_))
    ));
    assert!(matches!(
        compilation.tree.get(&Pointer::parse("/static/poi/when")),
        Some(Node::Expr(_))
    ));
}

#[test]
fn broken_expression_is_contained() {
    let compilation = engine(json!({
        "static": {
            "a": {"zIndex": "=> 1 +"},
            "b": {"zIndex": "=> 2"}
        }
    }))
    .begin_compile();
    let diagnostics = compilation.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].pointer, Pointer::parse("/static/a/zIndex"));
    assert!(diagnostics[0].to_string().starts_with("/static/a/zIndex: "));
    let err = diagnostics[0].error();
    assert!(matches!(&err, StyleError::Compile { pointer, .. } if pointer == "/static/a/zIndex"));
    assert!(err.to_string().starts_with("compile error at /static/a/zIndex: "));
    assert!(matches!(
        compilation.tree.get(&Pointer::parse("/static/a/zIndex")),
        Some(Node::Invalid)
    ));
    assert!(matches!(
        compilation.tree.get(&Pointer::parse("/static/b/zIndex")),
        Some(Node::Expr(_))
    ));
}

#[test]
fn guard_arrays_compile_and_plain_arrays_stay_literal() {
    let compilation = engine(json!({
        "constants": {
            "size": ["?SCALE < 1000 => 8", "default => 4"],
            "dash": [4, 2],
            "flags": [0, "=> 1"]
        }
    }))
    .begin_compile();
    let tree = &compilation.tree;
    assert!(matches!(tree.get(&Pointer::parse("/constants/size")), Some(Node::Expr(_))));
    assert!(matches!(tree.get(&Pointer::parse("/constants/dash")), Some(Node::Array(_))));
    // Arrays with a falsy head are leaves.
    assert!(matches!(
        tree.get(&Pointer::parse("/constants/flags/1")),
        Some(Node::Literal(_))
    ));
}

#[test]
fn inline_svg_becomes_pending_image() {
    let compilation = engine(json!({
        "static": {"poi": {"image": {"type": "Icon", "src": SQUARE}}}
    }))
    .begin_compile();
    assert_eq!(compilation.pending_loads().len(), 1);
    let handle = compilation.pending_loads()[0].handle().clone();
    assert_eq!(handle.pointer(), "/static/poi/image/src");
    assert!(!handle.is_loaded());

    let function = compilation.finish();
    assert!(handle.is_loaded());
    assert_eq!(handle.size(), Some((3, 3)));
    assert!(function.diagnostics().is_empty());
}

#[test]
fn failed_image_load_does_not_fail_compilation() {
    let compilation = engine(json!({"definitions": {"broken": "<svg><oops"}})).begin_compile();
    let handle = compilation.pending_loads()[0].handle().clone();
    let _function = compilation.finish();
    assert!(handle.data().unwrap().is_empty());
}

#[test]
fn patches_are_parsed_at_compile_time() {
    let compilation = engine(json!({
        "dynamic": [
            {"pointer": "#/*/text/text", "value": "=> F.properties.name"},
            {"pointer": "#/poi", "value": 1},
            {"value": 2}
        ]
    }))
    .begin_compile();
    assert_eq!(compilation.patches.len(), 1);
    assert_eq!(compilation.patches[0].pointer.to_string(), "#/*/text/text");
    assert!(matches!(compilation.patches[0].value, Node::Expr(_)));

    let pointers: Vec<String> = compilation
        .diagnostics()
        .iter()
        .map(|d| d.pointer.to_string())
        .collect();
    assert_eq!(pointers, vec!["/dynamic/1/pointer", "/dynamic/2/pointer"]);
}

#[test]
fn typed_definitions_are_wrapped() {
    let compilation = engine(json!({
        "definitions": {
            "outline": {"type": "Stroke", "color": "black", "width": "=> SCALE / 100"},
            "plain": {"color": "black"},
            "label": {"type": "Label"}
        }
    }))
    .begin_compile();
    let mut tree = compilation.tree.clone();
    compile_definitions(&mut tree);
    assert!(matches!(tree.get(&Pointer::parse("/definitions/outline")), Some(Node::Definition(_))));
    assert!(matches!(tree.get(&Pointer::parse("/definitions/plain")), Some(Node::Object(_))));
    assert!(matches!(tree.get(&Pointer::parse("/definitions/label")), Some(Node::Object(_))));
}

#[test]
fn userdata_defaults_to_empty_object() {
    let engine = engine(json!({}));
    assert_eq!((engine.userdata)(), json!({}));
    let engine = engine.with_userdata(|| json!({"lang": "fr"}));
    assert_eq!((engine.userdata)(), json!({"lang": "fr"}));
    assert_eq!(engine.document().name(), "test");
}
