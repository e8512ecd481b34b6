//! Dynstyle turns declarative, expression-bearing JSON style documents into style functions
//! for geographic vector features.
//!
//! - Parse and normalize a document with [`StyleEngine::new`]
//! - Compile it ([`StyleEngine::compile`], or [`StyleEngine::begin_compile`] to observe pending
//!   image loads)
//! - Call the resulting [`StyleFunction`] with each feature and the map resolution
#![forbid(unsafe_code)]

pub mod assets;
pub mod document;
pub mod engine;
pub(crate) mod expression;
pub mod foundation;
pub mod geo;
pub mod style;

pub use crate::foundation::error::{StyleError, StyleResult};
pub use crate::foundation::value::Value;

pub use crate::assets::color::Color;
pub use crate::assets::image::{ImageData, ImageHandle, ImageLoad};
pub use crate::document::model::{Document, DocumentMeta};
pub use crate::document::pointer::{Pointer, Segment};
pub use crate::engine::compile::{CompileDiagnostic, Compilation, StyleEngine, UserdataFn};
pub use crate::engine::function::StyleFunction;
pub use crate::geo::feature::{Feature, FeatureCollection};
pub use crate::geo::scale::{ScaleBracket, range_scale, scale};
pub use crate::style::cache::{SharedStyleSet, StyleCache};
pub use crate::style::patch::{PatchPointer, VariantSelector};
pub use crate::style::primitives::{
    CircleStyle, ColorStop, Fill, Icon, ImageStyle, LineCap, LineJoin, Paint, Placement,
    Primitive, RegularShape, Stroke, StyleSet, StyleVariant, Text, TextAlign, TextBaseline,
};
