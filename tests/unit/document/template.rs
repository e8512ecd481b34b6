use super::*;
use crate::geo::feature::Feature;
use serde_json::json;

fn compiled(source: serde_json::Value) -> Node {
    Node::Expr(Arc::new(CompiledExpr::compile(&source).unwrap()))
}

fn with_ctx<T>(definitions: &Node, f: impl FnOnce(&EvalContext<'_>) -> T) -> T {
    let feature = Feature::new().with_property("kind", "bar");
    let constants = Node::from_json(&json!({}));
    let userdata = json!({});
    let ctx = EvalContext::new(
        &feature,
        1.0,
        500.0,
        Some(0.0),
        Some(1000.0),
        definitions,
        &constants,
        &userdata,
    );
    f(&ctx)
}

#[test]
fn get_walks_objects_and_arrays() {
    let tree = Node::from_json(&json!({"static": {"poi": {"lineDash": [4, 2]}}}));
    let hit = tree.get(&Pointer::parse("/static/poi/lineDash/1"));
    assert!(matches!(hit, Some(Node::Literal(v)) if v == &json!(2)));
    assert!(tree.get(&Pointer::parse("/static/missing")).is_none());
    assert!(tree.get(&Pointer::parse("/static/poi/lineDash/x")).is_none());
    assert!(matches!(tree.get(&Pointer::root()), Some(Node::Object(_))));
}

#[test]
fn install_replaces_existing_nodes_only() {
    let mut tree = Node::from_json(&json!({"a": {"b": "=> 1"}}));
    assert!(tree.install(&Pointer::parse("/a/b"), compiled(json!("=> 1"))));
    assert!(matches!(tree.get(&Pointer::parse("/a/b")), Some(Node::Expr(_))));
    assert!(!tree.install(&Pointer::parse("/a/c/d"), Node::Invalid));
}

#[test]
fn containers_resolve_children() {
    let mut tree = Node::from_json(&json!({"width": null, "dash": [1, null], "name": "x"}));
    tree.install(&Pointer::parse("/width"), compiled(json!("=> SCALE / 250")));
    tree.install(&Pointer::parse("/dash/1"), compiled(json!("=> R * 3")));
    let empty = Node::from_json(&json!({}));
    let v = with_ctx(&empty, |ctx| tree.eval(ctx).unwrap());
    assert_eq!(v, Value::from(json!({"width": 2, "dash": [1, 3], "name": "x"})));
}

#[test]
fn failing_child_resolves_as_undefined() {
    let mut tree = Node::from_json(&json!({"ok": 1, "bad": null, "broken": null}));
    tree.install(&Pointer::parse("/bad"), compiled(json!("=> F.properties.nope.deeper")));
    tree.install(&Pointer::parse("/broken"), Node::Invalid);
    let empty = Node::from_json(&json!({}));
    with_ctx(&empty, |ctx| {
        assert!(tree.field("bad").unwrap().eval(ctx).is_err());
        assert_eq!(tree.resolve_field("bad", ctx), Value::Undefined);
        assert_eq!(tree.resolve_field("broken", ctx), Value::Undefined);
        assert_eq!(tree.resolve_field("missing", ctx), Value::Undefined);
        let v = tree.resolve(ctx);
        assert_eq!(v.field("ok"), Value::Number(1.0));
        assert!(v.field("bad").is_undefined());
    });
}

#[test]
fn definitions_build_primitives_on_resolution() {
    let mut defs = Node::from_json(&json!({
        "outline": {"type": "Stroke", "color": "#000", "width": null}
    }));
    defs.install(&Pointer::parse("/outline/width"), compiled(json!("=> SCALE / 100")));
    let Some(Node::Object(map)) = defs.get_mut(&Pointer::root()) else {
        panic!("definitions must be an object");
    };
    let body = map.swap_remove("outline").unwrap();
    map.insert("outline".to_owned(), Node::Definition(Box::new(body)));

    let v = with_ctx(&defs, |ctx| defs.field("outline").unwrap().eval(ctx).unwrap());
    match v {
        Value::Primitive(p) => match p.as_ref() {
            crate::style::primitives::Primitive::Stroke(s) => assert_eq!(s.width, Some(5.0)),
            other => panic!("unexpected primitive {other:?}"),
        },
        other => panic!("expected a primitive, got {other:?}"),
    }
}

#[test]
fn declined_definition_resolves_to_null() {
    let defs = Node::from_json(&json!({"t": {"type": "Fill", "when": false}}));
    let Node::Object(map) = &defs else {
        unreachable!()
    };
    let node = Node::Definition(Box::new(map["t"].clone()));
    let v = with_ctx(&defs, |ctx| node.eval(ctx).unwrap());
    assert_eq!(v, Value::Null);
}

#[test]
fn images_resolve_to_their_handle() {
    let handle = ImageHandle::pending("/static/poi/image/src".to_owned());
    let node = Node::Image(handle.clone());
    let empty = Node::from_json(&json!({}));
    let v = with_ctx(&empty, |ctx| node.eval(ctx).unwrap());
    assert!(matches!(v, Value::Image(h) if h.ptr_eq(&handle)));
}
