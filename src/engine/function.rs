use crate::document::model::{Document, DocumentMeta};
use crate::document::pointer::Pointer;
use crate::document::template::Node;
use crate::engine::compile::{CompileDiagnostic, UserdataFn};
use crate::expression::eval::EvalContext;
use crate::foundation::value::{Value, format_number};
use crate::geo::feature::Feature;
use crate::geo::scale::{ScaleBracket, range_scale, scale};
use crate::style::builder::realize_style_set;
use crate::style::cache::{SharedStyleSet, StyleCache};
use crate::style::patch::{Patch, PatchPointer, apply_patches};

static EMPTY: Node = Node::Literal(serde_json::Value::Null);

/// A `dynamic` entry: where to write, and the (possibly expression) value to write.
#[derive(Debug, Clone)]
pub(crate) struct CompiledPatch {
    pub(crate) pointer: PatchPointer,
    pub(crate) value: Node,
}

/// The compiled style resolver for one layer.
///
/// Call it with each feature and the current map resolution; it answers the style set to draw
/// the feature with, or `None` when the feature is not drawn at this resolution.
pub struct StyleFunction {
    document: Document,
    tree: Node,
    patches: Vec<CompiledPatch>,
    userdata: UserdataFn,
    cache: StyleCache,
    last_bracket: Option<ScaleBracket>,
    diagnostics: Vec<CompileDiagnostic>,
}

impl StyleFunction {
    pub(crate) fn new(
        document: Document,
        tree: Node,
        patches: Vec<CompiledPatch>,
        userdata: UserdataFn,
        diagnostics: Vec<CompileDiagnostic>,
    ) -> Self {
        Self {
            document,
            tree,
            patches,
            userdata,
            cache: StyleCache::new(),
            last_bracket: None,
            diagnostics,
        }
    }

    pub fn name(&self) -> &str {
        self.document.name()
    }

    pub fn meta(&self) -> &DocumentMeta {
        self.document.meta()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Rules that failed to compile.
    pub fn diagnostics(&self) -> &[CompileDiagnostic] {
        &self.diagnostics
    }

    pub fn cache(&self) -> &StyleCache {
        &self.cache
    }

    /// Resolve the style set for `feature` at `resolution`.
    ///
    /// Style sets are cached by the resolved `cacheKey`; patches from `dynamic` are reapplied
    /// to the cached set on every call, so the returned handle always carries this feature's
    /// patched values. While a caller still holds a borrow of that set, patching is skipped
    /// and the set is returned as last patched.
    pub fn call(&mut self, feature: &Feature, resolution: f64) -> Option<SharedStyleSet> {
        let scale = scale(feature, resolution);
        if !self.document.scale_in_range(scale) {
            return None;
        }
        let bracket = range_scale(scale, self.document.scales())?;
        let debug = self.document.meta().debug;
        let layer = self.document.name();

        if self.last_bracket != Some(bracket) {
            self.last_bracket = Some(bracket);
            if debug {
                let lower = bracket.lower.map(format_number).unwrap_or_default();
                tracing::info!(
                    layer,
                    "current scale range => [{lower}-{}]",
                    format_number(bracket.upper)
                );
            }
        }

        let userdata = (self.userdata)();
        let tree = &self.tree;
        let ctx = EvalContext::new(
            feature,
            resolution,
            scale,
            bracket.lower,
            Some(bracket.upper),
            tree.field("definitions").unwrap_or(&EMPTY),
            tree.field("constants").unwrap_or(&EMPTY),
            &userdata,
        );

        let key = tree.resolve_field("cacheKey", &ctx);
        let statics = tree.field("static").unwrap_or(&EMPTY);
        let set = self.cache.resolve(&key, |key| {
            let set = realize_style_set(statics, &ctx);
            if debug {
                tracing::info!(layer, "style cached [{key}] => ({})", set.names().join("/"));
            }
            set
        });

        if !self.patches.is_empty() {
            let patches: Vec<Patch> = self
                .patches
                .iter()
                .map(|p| Patch {
                    pointer: p.pointer.clone(),
                    value: p.value.resolve(&ctx),
                })
                .collect();
            match set.try_borrow_mut() {
                Ok(mut styles) => {
                    apply_patches(&patches, &mut styles);
                }
                Err(_) => tracing::debug!(
                    layer,
                    "style set still borrowed by a previous caller, patches skipped"
                ),
            }
        }

        Some(set)
    }

    /// Resolve a document field (e.g. `/static/poi/text/text`) for a feature without realizing
    /// styles. Out-of-range scales still resolve; the bracket is `None` above every breakpoint.
    pub fn resolve(&self, pointer: &str, feature: &Feature, resolution: f64) -> Option<Value> {
        let node = self.tree.get(&Pointer::parse(pointer))?;
        let scale = scale(feature, resolution);
        let bracket = range_scale(scale, self.document.scales());
        let userdata = (self.userdata)();
        let ctx = EvalContext::new(
            feature,
            resolution,
            scale,
            bracket.and_then(|b| b.lower),
            bracket.map(|b| b.upper),
            self.tree.field("definitions").unwrap_or(&EMPTY),
            self.tree.field("constants").unwrap_or(&EMPTY),
            &userdata,
        );
        Some(node.resolve(&ctx))
    }

    /// Turn into a plain closure for callers that only need the resolver.
    pub fn into_fn(mut self) -> impl FnMut(&Feature, f64) -> Option<SharedStyleSet> {
        move |feature, resolution| self.call(feature, resolution)
    }
}

impl std::fmt::Debug for StyleFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleFunction")
            .field("layer", &self.document.name())
            .field("cached", &self.cache.len())
            .field("patches", &self.patches.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/function.rs"]
mod tests;
