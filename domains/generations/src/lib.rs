//! Atelier Generations Domain
//!
//! The end-to-end pipeline: approve a rendered image into durable storage,
//! turn an approved image into a generated video, and serve the resulting
//! gallery.

pub mod pipeline;

pub use pipeline::{GenerationPipeline, VideoCreation, DEFAULT_VIDEO_PROMPT};
