use std::cell::Cell;
use std::cmp::Ordering;

use crate::document::template::Node;
use crate::expression::ast::{BinaryOp, Expr, Lit, LogicalOp, UnaryOp};
use crate::expression::builtins::{call_builtin, call_method};
use crate::foundation::error::{StyleError, StyleResult};
use crate::foundation::value::Value;
use crate::geo::feature::Feature;

/// Nested field resolutions allowed before an expression is considered self-referencing.
pub(crate) const MAX_RESOLVE_DEPTH: u32 = 64;

/// The values an expression can see, rebuilt before every style resolution.
///
/// Slots are exposed to expressions as `F`, `R`, `SCALE`, `LSCALE`, `USCALE`, `D`, `C` and `U`.
pub struct EvalContext<'a> {
    pub(crate) feature: &'a Feature,
    pub(crate) resolution: f64,
    pub(crate) scale: f64,
    pub(crate) lower_scale: Option<f64>,
    pub(crate) upper_scale: Option<f64>,
    pub(crate) definitions: &'a Node,
    pub(crate) constants: &'a Node,
    pub(crate) userdata: &'a serde_json::Value,
    depth: Cell<u32>,
}

impl<'a> EvalContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        feature: &'a Feature,
        resolution: f64,
        scale: f64,
        lower_scale: Option<f64>,
        upper_scale: Option<f64>,
        definitions: &'a Node,
        constants: &'a Node,
        userdata: &'a serde_json::Value,
    ) -> Self {
        Self {
            feature,
            resolution,
            scale,
            lower_scale,
            upper_scale,
            definitions,
            constants,
            userdata,
            depth: Cell::new(0),
        }
    }

    /// Track one level of nested resolution; released when the guard drops.
    pub(crate) fn enter(&self) -> StyleResult<DepthGuard<'_>> {
        let depth = self.depth.get();
        if depth >= MAX_RESOLVE_DEPTH {
            return Err(StyleError::eval(format!(
                "resolution nested deeper than {MAX_RESOLVE_DEPTH} levels (self-referencing definition?)"
            )));
        }
        self.depth.set(depth + 1);
        Ok(DepthGuard { depth: &self.depth })
    }
}

pub(crate) struct DepthGuard<'c> {
    depth: &'c Cell<u32>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// Where a (partially evaluated) member chain currently points.
///
/// Borrowed places let `D.icons.bar` resolve only the addressed definition and let feature
/// properties be read without copying the whole feature.
enum Place<'a> {
    Node(&'a Node),
    Json(&'a serde_json::Value),
    Props(&'a serde_json::Map<String, serde_json::Value>),
    Feature(&'a Feature),
    Value(Value),
}

impl<'a> Place<'a> {
    /// Evaluate leaf document nodes so the place is either a container or a concrete value.
    fn settle(self, ctx: &EvalContext<'a>) -> StyleResult<Self> {
        match self {
            Self::Node(Node::Literal(j)) => Ok(Self::Json(j)),
            Self::Node(n @ (Node::Object(_) | Node::Array(_))) => Ok(Self::Node(n)),
            Self::Node(n) => Ok(Self::Value(n.eval(ctx)?)),
            other => Ok(other),
        }
    }

    fn is_nullish(&self) -> bool {
        match self {
            Self::Value(v) => v.is_nullish(),
            Self::Json(j) => j.is_null(),
            _ => false,
        }
    }

    fn member(self, key: &str, ctx: &EvalContext<'a>) -> StyleResult<Self> {
        let undefined = || Self::Value(Value::Undefined);
        match self {
            Self::Node(Node::Object(map)) => Ok(map.get(key).map_or_else(undefined, Self::Node)),
            Self::Node(Node::Array(items)) => {
                if key == "length" {
                    return Ok(Self::Value(Value::Number(items.len() as f64)));
                }
                Ok(index_of(key)
                    .and_then(|i| items.get(i))
                    .map_or_else(undefined, Self::Node))
            }
            Self::Node(_) => self.settle(ctx)?.member(key, ctx),
            Self::Json(j) => match j {
                serde_json::Value::Null => Err(read_of("null", key)),
                serde_json::Value::Object(map) => Ok(map.get(key).map_or_else(undefined, Self::Json)),
                serde_json::Value::Array(items) => {
                    if key == "length" {
                        return Ok(Self::Value(Value::Number(items.len() as f64)));
                    }
                    Ok(index_of(key)
                        .and_then(|i| items.get(i))
                        .map_or_else(undefined, Self::Json))
                }
                other => value_member(Value::from_json(other), key).map(Self::Value),
            },
            Self::Props(map) => Ok(map.get(key).map_or_else(undefined, Self::Json)),
            Self::Feature(f) => Ok(match key {
                "properties" => Self::Props(&f.properties),
                "id" => f.id.as_ref().map_or_else(undefined, Self::Json),
                "geometry" => f
                    .geometry
                    .as_ref()
                    .map_or(Self::Value(Value::Null), Self::Json),
                "type" => Self::Value(Value::from("Feature")),
                _ => undefined(),
            }),
            Self::Value(v) => value_member(v, key).map(Self::Value),
        }
    }

    fn into_value(self, ctx: &EvalContext<'a>) -> StyleResult<Value> {
        match self {
            Self::Node(n) => n.eval(ctx),
            Self::Json(j) => Ok(Value::from_json(j)),
            Self::Props(map) => Ok(Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            )),
            Self::Feature(f) => Ok(f.to_value()),
            Self::Value(v) => Ok(v),
        }
    }
}

pub(crate) fn eval_expr(expr: &Expr, ctx: &EvalContext<'_>) -> StyleResult<Value> {
    match expr {
        Expr::Ident(_) | Expr::Member { .. } | Expr::Index { .. } => {
            eval_place(expr, ctx)?.into_value(ctx)
        }
        Expr::Lit(lit) => Ok(match lit {
            Lit::Number(n) => Value::Number(*n),
            Lit::Str(s) => Value::String(s.clone()),
            Lit::Bool(b) => Value::Bool(*b),
            Lit::Null => Value::Null,
            Lit::Undefined => Value::Undefined,
        }),
        Expr::Array(items) => Ok(Value::Array(
            items
                .iter()
                .map(|e| eval_expr(e, ctx))
                .collect::<StyleResult<Vec<_>>>()?,
        )),
        Expr::Call { func, args } => call_builtin(func, eval_args(args, ctx)?),
        Expr::Method {
            receiver,
            name,
            args,
            optional,
        } => {
            let base = eval_place(receiver, ctx)?.settle(ctx)?;
            if base.is_nullish() {
                if *optional {
                    return Ok(Value::Undefined);
                }
                let what = if matches!(base, Place::Value(Value::Undefined)) {
                    "undefined"
                } else {
                    "null"
                };
                return Err(read_of(what, name));
            }
            let args = eval_args(args, ctx)?;
            match base {
                Place::Feature(f) => feature_method(f, name, &args),
                other => call_method(other.into_value(ctx)?, name, &args),
            }
        }
        Expr::Unary { op, expr } => {
            let v = eval_expr(expr, ctx)?;
            Ok(match op {
                UnaryOp::Neg => Value::Number(-v.to_number()),
                UnaryOp::Plus => Value::Number(v.to_number()),
                UnaryOp::Not => Value::Bool(!v.is_truthy()),
            })
        }
        Expr::Binary { op, left, right } => {
            let l = eval_expr(left, ctx)?;
            let r = eval_expr(right, ctx)?;
            Ok(binary(*op, &l, &r))
        }
        Expr::Logical { op, left, right } => {
            let l = eval_expr(left, ctx)?;
            let take_left = match op {
                LogicalOp::And => !l.is_truthy(),
                LogicalOp::Or => l.is_truthy(),
                LogicalOp::Nullish => !l.is_nullish(),
            };
            if take_left { Ok(l) } else { eval_expr(right, ctx) }
        }
        Expr::Conditional {
            test,
            then,
            otherwise,
        } => {
            if eval_expr(test, ctx)?.is_truthy() {
                eval_expr(then, ctx)
            } else {
                eval_expr(otherwise, ctx)
            }
        }
    }
}

fn eval_place<'a>(expr: &Expr, ctx: &EvalContext<'a>) -> StyleResult<Place<'a>> {
    match expr {
        Expr::Ident(name) => ident(name, ctx),
        Expr::Member {
            object,
            property,
            optional,
        } => {
            let base = eval_place(object, ctx)?.settle(ctx)?;
            if *optional && base.is_nullish() {
                return Ok(Place::Value(Value::Undefined));
            }
            if let Place::Value(Value::Undefined) = base {
                return Err(read_of("undefined", property));
            }
            base.member(property, ctx)
        }
        Expr::Index { object, index } => {
            let base = eval_place(object, ctx)?.settle(ctx)?;
            let key = eval_expr(index, ctx)?.to_js_string();
            if let Place::Value(Value::Undefined) = base {
                return Err(read_of("undefined", &key));
            }
            base.member(&key, ctx)
        }
        other => eval_expr(other, ctx).map(Place::Value),
    }
}

fn ident<'a>(name: &str, ctx: &EvalContext<'a>) -> StyleResult<Place<'a>> {
    Ok(match name {
        "F" => Place::Feature(ctx.feature),
        "R" => Place::Value(Value::Number(ctx.resolution)),
        "SCALE" => Place::Value(Value::Number(ctx.scale)),
        "LSCALE" => Place::Value(ctx.lower_scale.into()),
        "USCALE" => Place::Value(ctx.upper_scale.into()),
        "D" => Place::Node(ctx.definitions),
        "C" => Place::Node(ctx.constants),
        "U" => Place::Json(ctx.userdata),
        other => return Err(StyleError::eval(format!("{other} is not defined"))),
    })
}

fn eval_args(args: &[Expr], ctx: &EvalContext<'_>) -> StyleResult<Vec<Value>> {
    args.iter().map(|a| eval_expr(a, ctx)).collect()
}

fn feature_method(f: &Feature, name: &str, args: &[Value]) -> StyleResult<Value> {
    match name {
        "get" => {
            let key = args.first().map(Value::to_js_string).unwrap_or_default();
            Ok(f.get(&key).map_or(Value::Undefined, Value::from_json))
        }
        "getId" => Ok(f.id.as_ref().map_or(Value::Undefined, Value::from_json)),
        "getProperties" => Ok(f.to_value().field("properties")),
        "getGeometry" => Ok(f.geometry.as_ref().map_or(Value::Null, Value::from_json)),
        other => Err(StyleError::eval(format!("F.{other} is not a function"))),
    }
}

fn value_member(v: Value, key: &str) -> StyleResult<Value> {
    match v {
        Value::Undefined => Err(read_of("undefined", key)),
        Value::Null => Err(read_of("null", key)),
        Value::Object(mut map) => Ok(map.swap_remove(key).unwrap_or_default()),
        Value::Array(mut items) => {
            if key == "length" {
                return Ok(Value::Number(items.len() as f64));
            }
            Ok(index_of(key)
                .filter(|&i| i < items.len())
                .map(|i| items.swap_remove(i))
                .unwrap_or_default())
        }
        Value::String(s) => {
            if key == "length" {
                return Ok(Value::Number(s.encode_utf16().count() as f64));
            }
            Ok(index_of(key)
                .and_then(|i| s.chars().nth(i))
                .map_or(Value::Undefined, |c| Value::String(c.to_string())))
        }
        Value::Bool(_) | Value::Number(_) | Value::Image(_) | Value::Primitive(_) => {
            Ok(Value::Undefined)
        }
    }
}

fn index_of(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    key.parse().ok()
}

fn read_of(what: &str, key: &str) -> StyleError {
    StyleError::eval(format!("cannot read properties of {what} (reading '{key}')"))
}

fn binary(op: BinaryOp, l: &Value, r: &Value) -> Value {
    match op {
        BinaryOp::Add => {
            if concatenates(l) || concatenates(r) {
                Value::String(l.to_js_string() + &r.to_js_string())
            } else {
                Value::Number(l.to_number() + r.to_number())
            }
        }
        BinaryOp::Sub => Value::Number(l.to_number() - r.to_number()),
        BinaryOp::Mul => Value::Number(l.to_number() * r.to_number()),
        BinaryOp::Div => Value::Number(l.to_number() / r.to_number()),
        BinaryOp::Mod => Value::Number(l.to_number() % r.to_number()),
        BinaryOp::Eq => Value::Bool(l.loose_eq(r)),
        BinaryOp::Ne => Value::Bool(!l.loose_eq(r)),
        BinaryOp::StrictEq => Value::Bool(l.strict_eq(r)),
        BinaryOp::StrictNe => Value::Bool(!l.strict_eq(r)),
        BinaryOp::Lt => Value::Bool(compare(l, r) == Some(Ordering::Less)),
        BinaryOp::Le => Value::Bool(matches!(
            compare(l, r),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(compare(l, r) == Some(Ordering::Greater)),
        BinaryOp::Ge => Value::Bool(matches!(
            compare(l, r),
            Some(Ordering::Greater | Ordering::Equal)
        )),
    }
}

/// `+` concatenates when either operand converts to a string primitive.
fn concatenates(v: &Value) -> bool {
    matches!(
        v,
        Value::String(_) | Value::Array(_) | Value::Object(_) | Value::Image(_) | Value::Primitive(_)
    )
}

fn compare(l: &Value, r: &Value) -> Option<Ordering> {
    match (l, r) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => l.to_number().partial_cmp(&r.to_number()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/eval.rs"]
mod tests;
