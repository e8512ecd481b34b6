use crate::foundation::error::{StyleError, StyleResult};
use crate::foundation::value::Value;

/// Free functions callable by name (`min(a, b)`) or through `Math.` (`Math.round(x)`).
pub(crate) fn call_builtin(name: &str, args: Vec<Value>) -> StyleResult<Value> {
    let num = |i: usize| args.get(i).map_or(f64::NAN, Value::to_number);
    let unary = |f: fn(f64) -> f64| -> StyleResult<Value> {
        expect_args(name, &args, 1)?;
        Ok(Value::Number(f(num(0))))
    };

    match name {
        "abs" => unary(f64::abs),
        "floor" => unary(f64::floor),
        "ceil" => unary(f64::ceil),
        "trunc" => unary(f64::trunc),
        "sqrt" => unary(f64::sqrt),
        "log" => unary(f64::ln),
        "exp" => unary(f64::exp),
        "sin" => unary(f64::sin),
        "cos" => unary(f64::cos),
        "sign" => unary(sign),
        // Halves round towards +Infinity.
        "round" => unary(|x| (x + 0.5).floor()),
        "pow" => {
            expect_args(name, &args, 2)?;
            Ok(Value::Number(num(0).powf(num(1))))
        }
        "min" => Ok(Value::Number(fold_numbers(&args, f64::INFINITY, f64::min))),
        "max" => Ok(Value::Number(fold_numbers(&args, f64::NEG_INFINITY, f64::max))),
        "clamp" => {
            expect_args(name, &args, 3)?;
            let (x, lo, hi) = (num(0), num(1), num(2));
            Ok(Value::Number(x.max(lo).min(hi)))
        }
        "lerp" => {
            expect_args(name, &args, 3)?;
            let (a, b, t) = (num(0), num(1), num(2));
            Ok(Value::Number(a + (b - a) * t))
        }
        "firstOf" => first_of(args),
        "String" => Ok(Value::String(
            args.first().map(Value::to_js_string).unwrap_or_default(),
        )),
        "Number" => Ok(Value::Number(args.first().map_or(0.0, Value::to_number))),
        "Boolean" => Ok(Value::Bool(args.first().is_some_and(Value::is_truthy))),
        other => Err(StyleError::eval(format!("unknown function \"{other}\""))),
    }
}

/// `firstOf(selector, key1, value1, key2, value2, ..., fallback)`.
///
/// Returns the value paired with the first key strictly equal to the selector, the trailing
/// fallback when no key matches, or `null` when there is no fallback.
fn first_of(args: Vec<Value>) -> StyleResult<Value> {
    let mut args = args.into_iter();
    let Some(selector) = args.next() else {
        return Err(StyleError::eval("firstOf expects at least 1 arg"));
    };
    loop {
        match (args.next(), args.next()) {
            (Some(key), Some(value)) => {
                if key.strict_eq(&selector) {
                    return Ok(value);
                }
            }
            (Some(fallback), None) => return Ok(fallback),
            _ => return Ok(Value::Null),
        }
    }
}

/// Methods on strings and arrays.
pub(crate) fn call_method(receiver: Value, name: &str, args: &[Value]) -> StyleResult<Value> {
    let arg_str = |i: usize| args.get(i).map(Value::to_js_string).unwrap_or_default();

    match (&receiver, name) {
        (_, "toString") => Ok(Value::String(receiver.to_js_string())),
        (Value::String(s), "toUpperCase") => Ok(Value::String(s.to_uppercase())),
        (Value::String(s), "toLowerCase") => Ok(Value::String(s.to_lowercase())),
        (Value::String(s), "trim") => Ok(Value::String(s.trim().to_owned())),
        (Value::String(s), "includes") => Ok(Value::Bool(s.contains(arg_str(0).as_str()))),
        (Value::String(s), "startsWith") => Ok(Value::Bool(s.starts_with(arg_str(0).as_str()))),
        (Value::String(s), "endsWith") => Ok(Value::Bool(s.ends_with(arg_str(0).as_str()))),
        (Value::Array(items), "includes") => {
            let needle = args.first().cloned().unwrap_or_default();
            Ok(Value::Bool(items.iter().any(|v| same_value_zero(v, &needle))))
        }
        (Value::Array(items), "join") => {
            let sep = if args.is_empty() { ",".to_owned() } else { arg_str(0) };
            Ok(Value::String(
                items
                    .iter()
                    .map(|v| if v.is_nullish() { String::new() } else { v.to_js_string() })
                    .collect::<Vec<_>>()
                    .join(&sep),
            ))
        }
        (Value::Number(n), "toFixed") => {
            let digits = args.first().map_or(0.0, Value::to_number);
            if !(0.0..=100.0).contains(&digits) {
                return Err(StyleError::eval("toFixed() digits argument must be between 0 and 100"));
            }
            Ok(Value::String(format!("{:.*}", digits as usize, n)))
        }
        _ => Err(StyleError::eval(format!(
            "{}.{name} is not a function",
            receiver.type_name()
        ))),
    }
}

fn expect_args(name: &str, args: &[Value], n: usize) -> StyleResult<()> {
    if args.len() == n {
        return Ok(());
    }
    let plural = if n == 1 { "arg" } else { "args" };
    Err(StyleError::eval(format!("{name} expects {n} {plural}")))
}

fn fold_numbers(args: &[Value], init: f64, f: fn(f64, f64) -> f64) -> f64 {
    let mut acc = init;
    for a in args {
        let x = a.to_number();
        if x.is_nan() {
            return f64::NAN;
        }
        acc = f(acc, x);
    }
    acc
}

fn sign(x: f64) -> f64 {
    if x.is_nan() || x == 0.0 { x } else { x.signum() }
}

/// `includes` treats `NaN` as equal to itself.
fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => a.strict_eq(b),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/builtins.rs"]
mod tests;
