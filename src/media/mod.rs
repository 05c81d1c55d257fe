//! Frame sources and frame-range selection.

pub mod timeline;
pub mod video;
