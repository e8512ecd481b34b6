use super::*;
use serde_json::json;

#[test]
fn empty_document_gets_defaults() {
    let doc = Document::parse(Some("pois"), json!({})).unwrap();
    let root = doc.root();
    assert_eq!(doc.name(), "pois");
    assert_eq!(root["debug"], json!(false));
    assert_eq!(root["format"], json!("geojson"));
    assert_eq!(root["group"], json!("pois"));
    assert_eq!(root["title"], json!("Layer pois"));
    assert_eq!(root["crs"], json!("EPSG:4326"));
    assert_eq!(root["cacheKey"], json!("DEFAULT"));
    assert_eq!(root["visible"], json!(true));
    assert_eq!(root["static"], json!({}));
    assert_eq!(root["dynamic"], json!([]));
    assert_eq!(root["constants"], json!({}));
    assert_eq!(root["definitions"], json!({}));
    assert_eq!(root["id"], json!(null));
    assert_eq!(doc.scales(), &[DEFAULT_MIN_SCALE, DEFAULT_MAX_SCALE]);
}

#[test]
fn null_document_is_an_empty_one() {
    let doc = Document::parse(Some("x"), serde_json::Value::Null).unwrap();
    assert_eq!(doc.root()["cacheKey"], json!("DEFAULT"));
}

#[test]
fn null_fields_are_replaced_but_falsy_values_kept() {
    let doc = Document::parse(
        Some("x"),
        json!({"title": null, "visible": false, "group": "", "debug": true}),
    )
    .unwrap();
    assert_eq!(doc.meta().title, "Layer x");
    assert!(!doc.meta().visible);
    assert_eq!(doc.meta().group, "");
    assert!(doc.meta().debug);
}

#[test]
fn unnamed_layers_are_numbered() {
    let a = Document::parse(None, json!({})).unwrap();
    let b = Document::parse(None, json!({})).unwrap();
    assert!(a.name().starts_with("LAYER"));
    assert!(b.name().starts_with("LAYER"));
    assert_ne!(a.name(), b.name());
    assert_eq!(a.meta().group, a.name());
}

#[test]
fn scales_are_sorted_and_bound_the_range() {
    let doc = Document::parse(Some("x"), json!({"scales": [100000, 0, 1000]})).unwrap();
    assert_eq!(doc.scales(), &[0.0, 1000.0, 100000.0]);
    assert_eq!(doc.root()["scales"], json!([0.0, 1000.0, 100000.0]));
    assert_eq!(doc.min_scale(), 0.0);
    assert_eq!(doc.max_scale(), 100000.0);
    assert!(doc.scale_in_range(0.0));
    assert!(doc.scale_in_range(99999.9));
    assert!(!doc.scale_in_range(100000.0));
    assert!(!doc.scale_in_range(-1.0));
}

#[test]
fn static_entries_get_a_default_guard() {
    let doc = Document::parse(
        Some("x"),
        json!({"static": {
            "poi": {"fill": {"color": "red"}, "text": {"text": "a", "when": "=> false"}},
            "guarded": {"when": "=> SCALE < 1000"}
        }}),
    )
    .unwrap();
    let statics = &doc.root()["static"];
    assert_eq!(statics["poi"]["when"], json!(ALWAYS));
    assert_eq!(statics["poi"]["fill"]["when"], json!(ALWAYS));
    assert_eq!(statics["poi"]["text"]["when"], json!("=> false"));
    assert_eq!(statics["guarded"]["when"], json!("=> SCALE < 1000"));
}

#[test]
fn meta_mirrors_document_fields() {
    let doc = Document::parse(
        Some("x"),
        json!({"id": 7, "title": "POI", "crs": "EPSG:3857", "format": "mvt"}),
    )
    .unwrap();
    let meta = doc.meta();
    assert_eq!(meta.id, json!(7));
    assert_eq!(meta.title, "POI");
    assert_eq!(meta.crs, "EPSG:3857");
    assert_eq!(meta.format, "mvt");
}

#[test]
fn rejects_malformed_documents() {
    assert!(matches!(
        Document::parse(Some("x"), json!([1, 2])),
        Err(StyleError::Validation(_))
    ));
    assert!(Document::parse(Some("x"), json!({"scales": "big"})).is_err());
    assert!(Document::parse(Some("x"), json!({"scales": [0, "1"]})).is_err());
    assert!(Document::parse(Some("x"), json!({"static": []})).is_err());
    assert!(Document::parse(Some("x"), json!({"static": {"a": 1}})).is_err());
    assert!(Document::parse(Some("x"), json!({"dynamic": {}})).is_err());
    assert!(Document::parse(Some("x"), json!({"visible": "=> true"})).is_err());
}
