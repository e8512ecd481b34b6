use serde::Serialize;

use crate::geo::feature::Feature;

/// Inches per map unit, for metric map units.
pub const INCHES_PER_METER: f64 = 39.37;
/// Nominal screen resolution used to turn a map resolution into a scale denominator.
pub const DOTS_PER_INCH: f64 = 90.0;

/// Scale denominator for a rendering `resolution` (map units per pixel).
///
/// The feature is unused for now; it is part of the signature so unit-aware lookups can be
/// added without touching callers.
pub fn scale(_feature: &Feature, resolution: f64) -> f64 {
    INCHES_PER_METER * DOTS_PER_INCH * resolution
}

/// Breakpoint interval enclosing a scale: `lower < scale <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleBracket {
    /// Greatest breakpoint strictly below the scale, if any.
    pub lower: Option<f64>,
    /// First breakpoint at or above the scale.
    pub upper: f64,
}

/// Find the bracket of `scale` in ascending `breakpoints`.
///
/// `None` when the scale lies above every breakpoint.
pub fn range_scale(scale: f64, breakpoints: &[f64]) -> Option<ScaleBracket> {
    let mut lower = None;
    for &bp in breakpoints {
        if scale > bp {
            lower = Some(bp);
        }
        if scale <= bp {
            return Some(ScaleBracket { lower, upper: bp });
        }
    }
    None
}

#[cfg(test)]
#[path = "../../tests/unit/geo/scale.rs"]
mod tests;
