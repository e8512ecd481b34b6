//! Realized drawing primitives.
//!
//! These are plain values: builders produce them from resolved descriptors, the patcher
//! mutates them in place through explicit setter tables, and the rendering side reads them.
//! Option names serialize in camelCase, matching the descriptor keys they were built from.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::assets::image::ImageHandle;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Color,
}

/// What a fill or stroke is painted with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Paint {
    Color(Color),
    Pattern {
        image: ImageHandle,
        repetition: String,
    },
    LinearGradient {
        p0: Point,
        p1: Point,
        stops: Vec<ColorStop>,
    },
    RadialGradient {
        c0: Point,
        r0: f64,
        c1: Point,
        r1: f64,
        stops: Vec<ColorStop>,
    },
    ConicGradient {
        #[serde(rename = "startAngle")]
        start_angle: f64,
        center: Point,
        stops: Vec<ColorStop>,
    },
}

impl Paint {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Color(_) => "Color",
            Self::Pattern { .. } => "CanvasPattern",
            Self::LinearGradient { .. } => "LinearGradient",
            Self::RadialGradient { .. } => "RadialGradient",
            Self::ConicGradient { .. } => "ConicGradient",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fill {
    pub color: Option<Paint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Bevel,
    Round,
    Miter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub color: Option<Paint>,
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_cap: Option<LineCap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_join: Option<LineJoin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_dash: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_dash_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miter_limit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Icon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<ImageHandle>,
    pub anchor: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    pub opacity: f64,
    pub scale: f64,
    pub rotation: f64,
    pub displacement: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegularShape {
    pub points: u32,
    pub radius: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius2: Option<f64>,
    pub angle: f64,
    pub rotation: f64,
    pub scale: f64,
    pub displacement: [f64; 2],
    pub fill: Option<Fill>,
    pub stroke: Option<Stroke>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleStyle {
    pub radius: f64,
    pub rotation: f64,
    pub scale: f64,
    pub displacement: [f64; 2],
    pub fill: Option<Fill>,
    pub stroke: Option<Stroke>,
}

/// Point symbolizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ImageStyle {
    Icon(Icon),
    RegularShape(RegularShape),
    Circle(CircleStyle),
}

impl ImageStyle {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Icon(_) => "Icon",
            Self::RegularShape(_) => "RegularShape",
            Self::Circle(_) => "Circle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Right,
    Center,
    End,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    Bottom,
    Top,
    Middle,
    Alphabetic,
    Hanging,
    Ideographic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    Point,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    pub rotation: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_baseline: Option<TextBaseline>,
    pub placement: Placement,
    pub max_angle: f64,
    pub overflow: bool,
    pub padding: [f64; 4],
    pub fill: Option<Fill>,
    pub stroke: Option<Stroke>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_fill: Option<Fill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_stroke: Option<Stroke>,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            text: None,
            font: None,
            scale: None,
            rotation: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            text_align: None,
            text_baseline: None,
            placement: Placement::Point,
            max_angle: std::f64::consts::FRAC_PI_4,
            overflow: false,
            padding: [0.0; 4],
            fill: None,
            stroke: None,
            background_fill: None,
            background_stroke: None,
        }
    }
}

/// One named `static` entry, realized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleVariant {
    pub name: String,
    pub fill: Option<Fill>,
    pub stroke: Option<Stroke>,
    pub image: Option<ImageStyle>,
    pub text: Option<Text>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<f64>,
}

impl StyleVariant {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Variants whose guard held, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StyleSet(Vec<StyleVariant>);

impl StyleSet {
    pub fn new(variants: Vec<StyleVariant>) -> Self {
        Self(variants)
    }

    pub fn variants(&self) -> &[StyleVariant] {
        &self.0
    }

    pub fn variants_mut(&mut self) -> &mut [StyleVariant] {
        &mut self.0
    }

    pub fn get(&self, name: &str) -> Option<&StyleVariant> {
        self.0.iter().find(|v| v.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A built primitive travelling through expressions (typed definitions).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Primitive {
    Fill(Fill),
    Stroke(Stroke),
    Image(ImageStyle),
    Text(Text),
    Paint(Paint),
}

impl Primitive {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Fill(_) => "Fill",
            Self::Stroke(_) => "Stroke",
            Self::Image(img) => img.kind_name(),
            Self::Text(_) => "Text",
            Self::Paint(p) => p.kind_name(),
        }
    }
}
