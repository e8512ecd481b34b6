use super::*;
use serde_json::json;

fn parse(s: &str) -> Color {
    parse_css(s).unwrap_or_else(|e| panic!("{s}: {e}"))
}

fn approx(a: Color, b: Color) {
    let close = |x: f64, y: f64| (x - y).abs() < 1e-3;
    assert!(
        close(a.r, b.r) && close(a.g, b.g) && close(a.b, b.b) && close(a.a, b.a),
        "{a:?} != {b:?}"
    );
}

#[test]
fn parses_hex_forms() {
    assert_eq!(parse("#ff0000"), Color::rgba(1.0, 0.0, 0.0, 1.0));
    assert_eq!(parse("#f00"), Color::rgba(1.0, 0.0, 0.0, 1.0));
    assert_eq!(parse("#ffffff00"), Color::rgba(1.0, 1.0, 1.0, 0.0));
    assert_eq!(parse("#000f"), Color::rgba(0.0, 0.0, 0.0, 1.0));
    assert!(parse_css("#12345").is_err());
    assert!(parse_css("#ggg").is_err());
}

#[test]
fn parses_color_functions() {
    assert_eq!(parse("rgb(255, 0, 0)"), Color::rgba(1.0, 0.0, 0.0, 1.0));
    assert_eq!(parse("rgba(0,0,255,0.5)"), Color::rgba(0.0, 0.0, 1.0, 0.5));
    approx(parse("rgb(0 255 0 / 25%)"), Color::rgba(0.0, 1.0, 0.0, 0.25));
    approx(parse("RGB(100%, 0%, 0%)"), Color::rgba(1.0, 0.0, 0.0, 1.0));
    approx(parse("hsl(120, 100%, 50%)"), Color::rgba(0.0, 1.0, 0.0, 1.0));
    approx(parse("hsla(0deg, 0%, 50%, 0.3)"), Color::rgba(0.5, 0.5, 0.5, 0.3));
    assert!(parse_css("rgb(1, 2)").is_err());
    assert!(parse_css("cmyk(0, 0, 0, 0)").is_err());
    assert!(parse_css("rgb(1, 2, 3").is_err());
}

#[test]
fn parses_named_colors() {
    assert_eq!(parse("White"), Color::rgba(1.0, 1.0, 1.0, 1.0));
    assert_eq!(parse("transparent"), Color::TRANSPARENT);
    assert!(parse_css("blurple").is_err());
}

#[test]
fn deserializes_strings_and_arrays() {
    let c: Color = serde_json::from_value(json!([255, 128, 0])).unwrap();
    approx(c, Color::rgba(1.0, 128.0 / 255.0, 0.0, 1.0));
    let c: Color = serde_json::from_value(json!([0, 0, 0, 0.4])).unwrap();
    assert_eq!(c.a, 0.4);
    let c: Color = serde_json::from_value(json!("#00ff00")).unwrap();
    assert_eq!(c, Color::rgba(0.0, 1.0, 0.0, 1.0));
    assert!(serde_json::from_value::<Color>(json!([1, 2])).is_err());
    assert!(serde_json::from_value::<Color>(json!({"r": 1})).is_err());
}

#[test]
fn from_value_accepts_strings_and_arrays_only() {
    assert!(Color::from_value(&Value::from("red")).is_ok());
    assert!(Color::from_value(&Value::from(json!([0, 0, 0]))).is_ok());
    let err = Color::from_value(&Value::Number(3.0)).unwrap_err();
    assert!(err.to_string().contains("got number"), "{err}");
    assert!(Color::from_value(&Value::from("nope")).is_err());
}

#[test]
fn channels_are_clamped() {
    let c = Color::from_rgba8(300.0, -5.0, 0.0, 2.0);
    assert_eq!(c, Color::rgba(1.0, 0.0, 0.0, 1.0));
}

#[test]
fn css_round_trip_form() {
    assert_eq!(parse("#ff8000").to_css(), "rgba(255,128,0,1)");
    assert_eq!(parse("rgba(0,0,0,0.5)").to_css(), "rgba(0,0,0,0.5)");
}
