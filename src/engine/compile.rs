use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::image::{ImageHandle, ImageLoad, is_svg_markup};
use crate::document::model::Document;
use crate::document::pointer::{Pointer, collect};
use crate::document::template::Node;
use crate::engine::function::{CompiledPatch, StyleFunction};
use crate::expression::clause::{CompiledExpr, is_expression};
use crate::foundation::error::{StyleError, StyleResult};
use crate::style::builder::is_definition_tag;
use crate::style::patch::PatchPointer;

/// Supplies the `U` slot; called again before every style resolution.
pub type UserdataFn = Box<dyn Fn() -> serde_json::Value>;

/// A rule that failed to compile. The field it addresses resolves to `undefined`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileDiagnostic {
    pub pointer: Pointer,
    pub message: String,
}

impl CompileDiagnostic {
    /// The diagnostic as a [`StyleError::Compile`].
    pub fn error(&self) -> StyleError {
        StyleError::compile(self.pointer.to_string(), self.message.clone())
    }
}

impl fmt::Display for CompileDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pointer, self.message)
    }
}

/// A normalized style document that has not been compiled yet.
pub struct StyleEngine {
    document: Document,
    userdata: UserdataFn,
}

impl StyleEngine {
    /// Normalize `json` for layer `name` (`LAYER<n>` when `None`).
    pub fn new(name: Option<&str>, json: serde_json::Value) -> StyleResult<Self> {
        Ok(Self::from_document(Document::parse(name, json)?))
    }

    pub fn from_document(document: Document) -> Self {
        Self {
            document,
            userdata: Box::new(|| serde_json::json!({})),
        }
    }

    pub fn with_userdata<F>(mut self, userdata: F) -> Self
    where
        F: Fn() -> serde_json::Value + 'static,
    {
        self.userdata = Box::new(userdata);
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Compile images and expressions. Image loads are left pending on the returned
    /// [`Compilation`].
    #[tracing::instrument(skip(self), fields(layer = %self.document.name()))]
    pub fn begin_compile(self) -> Compilation {
        let root = self.document.root();
        let mut tree = Node::from_json(root);
        let mut diagnostics = Vec::new();

        let loads = compile_images(root, &mut tree);
        compile_expressions(root, &mut tree, &mut diagnostics);
        let patches = compile_patches(&tree, &mut diagnostics);

        tracing::debug!(
            images = loads.len(),
            diagnostics = diagnostics.len(),
            "expressions compiled"
        );

        Compilation {
            document: self.document,
            userdata: self.userdata,
            tree,
            patches,
            loads,
            diagnostics,
        }
    }

    /// Compile and wait for every image load.
    pub fn compile(self) -> StyleFunction {
        self.begin_compile().finish()
    }
}

/// A document whose expressions are compiled but whose image loads may still be pending.
pub struct Compilation {
    document: Document,
    userdata: UserdataFn,
    tree: Node,
    patches: Vec<CompiledPatch>,
    loads: Vec<ImageLoad>,
    diagnostics: Vec<CompileDiagnostic>,
}

impl Compilation {
    pub fn pending_loads(&self) -> &[ImageLoad] {
        &self.loads
    }

    pub fn diagnostics(&self) -> &[CompileDiagnostic] {
        &self.diagnostics
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Settle every image load, then install typed definitions.
    #[tracing::instrument(skip(self), fields(layer = %self.document.name()))]
    pub fn finish(self) -> StyleFunction {
        let Self {
            document,
            userdata,
            mut tree,
            patches,
            loads,
            diagnostics,
        } = self;

        let requested = loads.len();
        let loaded = settle_loads(loads);
        compile_definitions(&mut tree);

        if document.meta().debug {
            tracing::info!(
                layer = document.name(),
                "{requested} svg images loaded ({} failed)",
                requested - loaded
            );
        }

        StyleFunction::new(document, tree, patches, userdata, diagnostics)
    }
}

/// Replace inline SVG strings with pending image handles.
pub(crate) fn compile_images(root: &serde_json::Value, tree: &mut Node) -> Vec<ImageLoad> {
    let mut loads = Vec::new();
    for (pointer, value) in collect(root, is_svg_markup) {
        let source = value.as_str().unwrap_or_default().to_owned();
        let handle = ImageHandle::pending(pointer.to_string());
        if tree.install(&pointer, Node::Image(handle.clone())) {
            loads.push(ImageLoad::new(handle, source));
        }
    }
    loads
}

/// Replace expression sources with compiled expressions.
///
/// A source that fails to compile is recorded, logged, and installed as an always-`undefined`
/// node; the other expressions still compile.
pub(crate) fn compile_expressions(
    root: &serde_json::Value,
    tree: &mut Node,
    diagnostics: &mut Vec<CompileDiagnostic>,
) {
    for (pointer, source) in collect(root, is_expression) {
        let node = match CompiledExpr::compile(source) {
            Ok(expr) => Node::Expr(Arc::new(expr)),
            Err(err) => {
                let diagnostic = CompileDiagnostic {
                    pointer: pointer.clone(),
                    message: err.to_string(),
                };
                tracing::warn!(source = %source, error = %diagnostic.error(), "expression compilation failed");
                diagnostics.push(diagnostic);
                Node::Invalid
            }
        };
        tree.install(&pointer, node);
    }
}

/// Parse `dynamic` patch pointers. Malformed entries are recorded and left out.
pub(crate) fn compile_patches(
    tree: &Node,
    diagnostics: &mut Vec<CompileDiagnostic>,
) -> Vec<CompiledPatch> {
    let Some(Node::Array(entries)) = tree.field("dynamic") else {
        return Vec::new();
    };

    let mut patches = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let at = Pointer::root().key("dynamic").key(&idx.to_string());
        let pointer = match entry.field("pointer") {
            Some(Node::Literal(serde_json::Value::String(s))) => PatchPointer::parse(s),
            _ => Err(StyleError::patch("patch needs a literal string `pointer`")),
        };
        match pointer {
            Ok(pointer) => patches.push(CompiledPatch {
                pointer,
                value: entry
                    .field("value")
                    .cloned()
                    .unwrap_or(Node::Literal(serde_json::Value::Null)),
            }),
            Err(err) => {
                let diagnostic = CompileDiagnostic {
                    pointer: at.key("pointer"),
                    message: err.to_string(),
                };
                tracing::warn!(error = %diagnostic.error(), "patch ignored");
                diagnostics.push(diagnostic);
            }
        }
    }
    patches
}

/// Run every pending load in parallel; returns how many succeeded.
pub(crate) fn settle_loads(loads: Vec<ImageLoad>) -> usize {
    loads
        .into_par_iter()
        .map(ImageLoad::run)
        .filter(|ok| *ok)
        .count()
}

/// Wrap top-level definitions carrying a known primitive `type` tag so they build on access.
pub(crate) fn compile_definitions(tree: &mut Node) {
    let Some(Node::Object(definitions)) = tree.get_mut(&Pointer::root().key("definitions")) else {
        return;
    };
    for node in definitions.values_mut() {
        let tagged = matches!(
            node.field("type"),
            Some(Node::Literal(serde_json::Value::String(tag))) if is_definition_tag(tag)
        );
        if tagged {
            let body = std::mem::replace(node, Node::Invalid);
            *node = Node::Definition(Box::new(body));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/compile.rs"]
mod tests;
