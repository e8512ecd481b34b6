pub mod color;
pub mod image;
pub mod svg_raster;
