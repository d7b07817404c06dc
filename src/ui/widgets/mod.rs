//! UI widgets

pub mod minimap;

pub use minimap::{glyph_style, MinimapWidget};
