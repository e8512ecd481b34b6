pub mod feature;
pub mod scale;
