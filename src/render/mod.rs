//! Per-frame raster stages: composite onto the output canvas, tone, edge extraction.

pub mod composite;
pub mod edges;
pub mod pipeline;
pub mod tone;
