use super::*;
use serde_json::json;

fn n(x: f64) -> Value {
    Value::Number(x)
}

fn call(name: &str, args: &[Value]) -> Value {
    call_builtin(name, args.to_vec()).unwrap()
}

#[test]
fn unary_math() {
    assert_eq!(call("abs", &[n(-3.0)]), n(3.0));
    assert_eq!(call("floor", &[n(2.7)]), n(2.0));
    assert_eq!(call("ceil", &[n(2.1)]), n(3.0));
    assert_eq!(call("trunc", &[n(-2.7)]), n(-2.0));
    assert_eq!(call("sqrt", &[n(16.0)]), n(4.0));
    assert_eq!(call("sign", &[n(-8.0)]), n(-1.0));
    assert_eq!(call("sign", &[n(0.0)]), n(0.0));
    assert_eq!(call("abs", &[Value::from("-2")]), n(2.0));
}

#[test]
fn round_breaks_halves_upwards() {
    assert_eq!(call("round", &[n(2.5)]), n(3.0));
    assert_eq!(call("round", &[n(-2.5)]), n(-2.0));
    assert_eq!(call("round", &[n(1.49)]), n(1.0));
}

#[test]
fn min_max_are_variadic() {
    assert_eq!(call("min", &[n(4.0), n(1.0), n(3.0)]), n(1.0));
    assert_eq!(call("max", &[n(4.0), n(1.0), n(3.0)]), n(4.0));
    assert_eq!(call("min", &[]), n(f64::INFINITY));
    assert_eq!(call("max", &[]), n(f64::NEG_INFINITY));
    assert!(call("max", &[n(1.0), Value::Undefined]).to_number().is_nan());
}

#[test]
fn clamp_lerp_pow() {
    assert_eq!(call("clamp", &[n(12.0), n(0.0), n(10.0)]), n(10.0));
    assert_eq!(call("clamp", &[n(-1.0), n(0.0), n(10.0)]), n(0.0));
    assert_eq!(call("clamp", &[n(5.0), n(0.0), n(10.0)]), n(5.0));
    assert_eq!(call("lerp", &[n(0.0), n(10.0), n(0.25)]), n(2.5));
    assert_eq!(call("pow", &[n(2.0), n(10.0)]), n(1024.0));
}

#[test]
fn arity_is_checked() {
    let err = call_builtin("clamp", vec![n(1.0)]).unwrap_err();
    assert!(err.to_string().contains("clamp expects 3 args"), "{err}");
    let err = call_builtin("abs", vec![]).unwrap_err();
    assert!(err.to_string().contains("abs expects 1 arg"), "{err}");
}

#[test]
fn unknown_function_is_an_error() {
    let err = call_builtin("eval", vec![]).unwrap_err();
    assert!(err.to_string().contains("unknown function \"eval\""), "{err}");
}

#[test]
fn conversions() {
    assert_eq!(call("String", &[n(3.0)]), Value::from("3"));
    assert_eq!(call("String", &[]), Value::from(""));
    assert_eq!(call("Number", &[Value::from("2.5")]), n(2.5));
    assert_eq!(call("Boolean", &[Value::from("")]), Value::Bool(false));
    assert_eq!(call("Boolean", &[n(1.0)]), Value::Bool(true));
}

#[test]
fn first_of_maps_selector_to_value() {
    let args = [
        Value::from("cafe"),
        Value::from("bar"),
        n(8.0),
        Value::from("cafe"),
        n(6.0),
        n(4.0),
    ];
    assert_eq!(call("firstOf", &args), n(6.0));

    let args = [Value::from("museum"), Value::from("bar"), n(8.0), n(4.0)];
    assert_eq!(call("firstOf", &args), n(4.0));

    let args = [Value::from("museum"), Value::from("bar"), n(8.0)];
    assert_eq!(call("firstOf", &args), Value::Null);

    // Keys match strictly.
    let args = [n(1.0), Value::from("1"), Value::from("loose"), Value::from("strict")];
    assert_eq!(call("firstOf", &args), Value::from("strict"));

    assert!(call_builtin("firstOf", vec![]).is_err());
}

#[test]
fn string_methods() {
    let s = Value::from("  Le Zinc ");
    assert_eq!(call_method(s.clone(), "trim", &[]).unwrap(), Value::from("Le Zinc"));
    assert_eq!(
        call_method(s.clone(), "toUpperCase", &[]).unwrap(),
        Value::from("  LE ZINC ")
    );
    assert_eq!(
        call_method(s.clone(), "includes", &[Value::from("Zi")]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        call_method(Value::from("rue"), "startsWith", &[Value::from("ru")]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        call_method(Value::from("rue"), "endsWith", &[Value::from("x")]).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn array_methods() {
    let arr = Value::from(json!([1, "two", null]));
    assert_eq!(
        call_method(arr.clone(), "includes", &[Value::from("two")]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        call_method(arr.clone(), "includes", &[Value::from("1")]).unwrap(),
        Value::Bool(false)
    );
    assert_eq!(
        call_method(arr.clone(), "join", &[Value::from(" / ")]).unwrap(),
        Value::from("1 / two / ")
    );
    assert_eq!(call_method(arr, "join", &[]).unwrap(), Value::from("1,two,"));

    let nan = Value::Array(vec![n(f64::NAN)]);
    assert_eq!(
        call_method(nan, "includes", &[n(f64::NAN)]).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn number_methods() {
    assert_eq!(
        call_method(n(3.14159), "toFixed", &[n(2.0)]).unwrap(),
        Value::from("3.14")
    );
    assert_eq!(call_method(n(2.0), "toFixed", &[]).unwrap(), Value::from("2"));
    assert_eq!(call_method(n(2.5), "toString", &[]).unwrap(), Value::from("2.5"));
    assert!(call_method(n(1.0), "toFixed", &[n(101.0)]).is_err());
}

#[test]
fn unsupported_method_names_the_receiver_type() {
    let err = call_method(n(1.0), "toUpperCase", &[]).unwrap_err();
    assert!(err.to_string().contains("number.toUpperCase is not a function"), "{err}");
}
