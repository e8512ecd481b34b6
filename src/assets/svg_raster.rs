use std::sync::Arc;

use anyhow::Context;

use crate::assets::image::ImageData;
use crate::foundation::error::{StyleError, StyleResult};

/// Largest raster edge accepted for an inline image.
const MAX_DIM: u32 = 16_384;

pub fn parse_svg(source: &str) -> StyleResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_str(source, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Pixel size of the SVG at its intrinsic size.
pub fn svg_raster_size(tree: &usvg::Tree) -> StyleResult<(u32, u32)> {
    fn to_px(v: f32) -> StyleResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(StyleError::asset("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let w = to_px(size.width())?;
    let h = to_px(size.height())?;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(StyleError::asset(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> StyleResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| StyleError::asset("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

/// Parse and rasterize inline SVG markup.
pub(crate) fn load_svg(source: &str) -> StyleResult<ImageData> {
    let tree = parse_svg(source)?;
    let (width, height) = svg_raster_size(&tree)?;
    let rgba8_premul = rasterize_svg_to_premul_rgba8(&tree, width, height)?;
    Ok(ImageData {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
