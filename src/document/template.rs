//! Compiled document tree and its per-context resolution.
//!
//! The tree is built once from the normalized document JSON; compilation passes then swap
//! individual nodes (expressions, inline images, typed definitions) at their pointers. The
//! tree is never mutated after compilation: every render resolves the nodes it needs against
//! a fresh [`EvalContext`].

use std::sync::Arc;

use indexmap::IndexMap;

use crate::assets::image::ImageHandle;
use crate::document::pointer::{Pointer, Segment};
use crate::expression::clause::CompiledExpr;
use crate::expression::eval::EvalContext;
use crate::foundation::error::StyleResult;
use crate::foundation::value::Value;
use crate::style::builder::build_definition;

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Literal(serde_json::Value),
    Array(Vec<Node>),
    Object(IndexMap<String, Node>),
    Expr(Arc<CompiledExpr>),
    /// Expression that failed to compile; always resolves to `undefined`.
    Invalid,
    Image(ImageHandle),
    /// Definitions entry with a primitive `type` tag, built on every resolution.
    Definition(Box<Node>),
}

impl Node {
    pub(crate) fn from_json(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Array(items) => Self::Array(items.iter().map(Self::from_json).collect()),
            serde_json::Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
            scalar => Self::Literal(scalar.clone()),
        }
    }

    pub(crate) fn field(&self, key: &str) -> Option<&Node> {
        match self {
            Self::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub(crate) fn get(&self, pointer: &Pointer) -> Option<&Node> {
        pointer
            .segments()
            .iter()
            .try_fold(self, |node, seg| node.child(seg))
    }

    fn child(&self, seg: &Segment) -> Option<&Node> {
        match self {
            Self::Object(map) => map.get(seg.as_key().as_ref()),
            Self::Array(items) => seg.as_index().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, pointer: &Pointer) -> Option<&mut Node> {
        let mut node = self;
        for seg in pointer.segments() {
            node = match node {
                Self::Object(map) => map.get_mut(seg.as_key().as_ref())?,
                Self::Array(items) => items.get_mut(seg.as_index()?)?,
                _ => return None,
            };
        }
        Some(node)
    }

    /// Replace the node at `pointer`. Returns `false` when the pointer does not exist.
    pub(crate) fn install(&mut self, pointer: &Pointer, node: Node) -> bool {
        match self.get_mut(pointer) {
            Some(slot) => {
                *slot = node;
                true
            }
            None => false,
        }
    }

    /// Resolve this subtree against `ctx`.
    ///
    /// Containers never fail: a child whose evaluation fails becomes `undefined` in place.
    pub(crate) fn eval(&self, ctx: &EvalContext<'_>) -> StyleResult<Value> {
        match self {
            Self::Literal(v) => Ok(Value::from_json(v)),
            Self::Array(items) => Ok(Value::Array(items.iter().map(|n| n.resolve(ctx)).collect())),
            Self::Object(map) => Ok(Value::Object(
                map.iter()
                    .map(|(k, n)| (k.clone(), n.resolve(ctx)))
                    .collect(),
            )),
            Self::Expr(expr) => {
                let _depth = ctx.enter()?;
                expr.eval(ctx)
            }
            Self::Invalid => Ok(Value::Undefined),
            Self::Image(handle) => Ok(Value::Image(handle.clone())),
            Self::Definition(body) => {
                let _depth = ctx.enter()?;
                let descriptor = body.eval(ctx)?;
                Ok(build_definition(&descriptor)?.unwrap_or(descriptor))
            }
        }
    }

    /// [`Node::eval`] with failures contained: logged at debug level, resolved as `undefined`.
    pub(crate) fn resolve(&self, ctx: &EvalContext<'_>) -> Value {
        self.eval(ctx).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "field resolved as undefined");
            Value::Undefined
        })
    }

    /// Resolve the member `key` of an object node; `undefined` when absent.
    pub(crate) fn resolve_field(&self, key: &str, ctx: &EvalContext<'_>) -> Value {
        self.field(key).map_or(Value::Undefined, |n| n.resolve(ctx))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/template.rs"]
mod tests;
