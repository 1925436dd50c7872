#![forbid(unsafe_code)]

pub mod camera;
pub mod color;
pub mod core;
pub mod delta;
pub mod document;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod project;
pub mod quantize;
pub mod sample;
pub mod scene;

pub use camera::{Camera, Projection};
pub use color::{ColorSample, LinearRgb};
pub use crate::core::{Canvas, Fps, FrameIndex, FrameRange};
pub use delta::DeltaEncoder;
pub use document::{Document, DocumentBuilder, DocumentMeta, DocumentStats};
pub use error::{PolylotError, PolylotResult};
pub use pipeline::{ExportOptions, encode_document, export_scene};
pub use project::Projector;
pub use sample::{PathSample, ShapeSample};
pub use scene::{FrameSample, FrameSource, Scene};
