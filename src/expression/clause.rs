//! Guarded-clause sources and their compiled form.
//!
//! A field is an expression when it is either a string starting with the expression marker
//! (`"=> F.properties.name"`) or an array of guard strings
//! (`["?F.properties.kind === 'bar' => 8", "default => 4"]`).

use crate::expression::ast::Expr;
use crate::expression::error::ExprError;
use crate::expression::eval::{EvalContext, eval_expr};
use crate::expression::parser::parse_expr;
use crate::foundation::error::StyleResult;
use crate::foundation::value::Value;

pub const EXPRESSION_MARKER: &str = "=>";
const GUARD_PREFIX: char = '?';
const DEFAULT_KEYWORD: &str = "default";

/// True for the two expression source shapes.
pub fn is_expression(v: &serde_json::Value) -> bool {
    match v {
        serde_json::Value::String(s) => s.starts_with(EXPRESSION_MARKER),
        serde_json::Value::Array(items) => items
            .first()
            .and_then(serde_json::Value::as_str)
            .is_some_and(|s| s.starts_with(GUARD_PREFIX)),
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Body {
    Single(Expr),
    Guarded {
        clauses: Vec<(Expr, Expr)>,
        default: Expr,
    },
}

/// A parsed expression source, evaluated afresh against every context it is given.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    body: Body,
}

impl CompiledExpr {
    pub(crate) fn compile(source: &serde_json::Value) -> Result<Self, ExprError> {
        match source {
            serde_json::Value::String(s) => {
                let body = s.strip_prefix(EXPRESSION_MARKER).ok_or_else(|| {
                    ExprError::new(0, format!("expression must start with '{EXPRESSION_MARKER}'"))
                })?;
                let expr = parse_expr(body).map_err(|e| shift(e, EXPRESSION_MARKER.len()))?;
                Ok(Self {
                    body: Body::Single(expr),
                })
            }
            serde_json::Value::Array(lines) => compile_guards(lines),
            _ => Err(ExprError::new(0, "expression source must be a string or an array")),
        }
    }

    pub(crate) fn eval(&self, ctx: &EvalContext<'_>) -> StyleResult<Value> {
        match &self.body {
            Body::Single(expr) => eval_expr(expr, ctx),
            Body::Guarded { clauses, default } => {
                for (cond, value) in clauses {
                    if eval_expr(cond, ctx)?.is_truthy() {
                        return eval_expr(value, ctx);
                    }
                }
                eval_expr(default, ctx)
            }
        }
    }
}

fn compile_guards(lines: &[serde_json::Value]) -> Result<CompiledExpr, ExprError> {
    let mut clauses = Vec::with_capacity(lines.len());
    let mut default = None;

    for (idx, line) in lines.iter().enumerate() {
        let line = line
            .as_str()
            .ok_or_else(|| ExprError::new(0, format!("clause {idx}: guard clauses must be strings")))?;
        if default.is_some() {
            return Err(ExprError::new(
                0,
                format!("clause {idx}: nothing may follow the default clause"),
            ));
        }

        if let Some(rest) = line.strip_prefix(GUARD_PREFIX) {
            let (cond, value) = rest.split_once(EXPRESSION_MARKER).ok_or_else(|| {
                ExprError::new(0, format!("clause {idx}: expected '?<condition> => <value>'"))
            })?;
            let value_offset = 1 + cond.len() + EXPRESSION_MARKER.len();
            let cond = parse_expr(cond).map_err(|e| in_clause(idx, shift(e, 1)))?;
            let value = parse_expr(value).map_err(|e| in_clause(idx, shift(e, value_offset)))?;
            clauses.push((cond, value));
        } else if let Some(rest) = line.trim_start().strip_prefix(DEFAULT_KEYWORD) {
            let value = rest.trim_start().strip_prefix(EXPRESSION_MARKER).ok_or_else(|| {
                ExprError::new(0, format!("clause {idx}: expected 'default => <value>'"))
            })?;
            let value_offset = line.len() - value.len();
            default = Some(parse_expr(value).map_err(|e| in_clause(idx, shift(e, value_offset)))?);
        } else {
            return Err(ExprError::new(
                0,
                format!("clause {idx}: must start with '{GUARD_PREFIX}' or '{DEFAULT_KEYWORD}'"),
            ));
        }
    }

    let default = default.ok_or_else(|| ExprError::new(0, "guard clauses require a default clause"))?;
    Ok(CompiledExpr {
        body: Body::Guarded { clauses, default },
    })
}

fn shift(e: ExprError, by: usize) -> ExprError {
    ExprError::new(e.offset + by, e.message)
}

fn in_clause(idx: usize, e: ExprError) -> ExprError {
    ExprError::new(e.offset, format!("clause {idx}: {}", e.message))
}

#[cfg(test)]
#[path = "../../tests/unit/expression/clause.rs"]
mod tests;
