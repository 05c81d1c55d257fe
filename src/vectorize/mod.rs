//! Vectorization through an external tracer: bitmap encoding, subprocess plumbing, SVG
//! post-processing.

pub mod bitmap;
pub mod potrace;
pub mod process;
pub mod svg;
