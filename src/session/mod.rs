//! Drivers around the per-frame pipeline: the debounced interactive preview and the batch
//! exporter.

pub mod export;
pub mod preview;
