use std::path::Path;

use crate::{
    color::LinearRgb,
    delta::DeltaEncoder,
    document::{Document, DocumentBuilder, DocumentMeta},
    error::PolylotResult,
    export::write_document,
    project::Projector,
    sample::ShapeSample,
    scene::{FrameSample, FrameSource, Scene},
};

/// Configuration surface consumed by the export pipeline.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Decimal places kept for path coordinates.
    pub position_precision: u8,
    /// Decimal places kept for fill channels.
    pub color_precision: u8,
    /// Written into the document metadata when set.
    pub author: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            position_precision: 2,
            color_precision: 4,
            author: None,
        }
    }
}

/// Walk the scene's timeline and delta-encode it into a Lottie document.
///
/// The walk is a sequential fold: each frame's comparison depends on the
/// previous frame's stored samples.
#[tracing::instrument(skip(scene), fields(scene = %scene.name))]
pub fn encode_document(scene: &Scene, opts: &ExportOptions) -> PolylotResult<Document> {
    scene.validate()?;
    let camera = scene.camera()?;

    let projector = Projector::new(camera, scene.canvas, opts.position_precision);
    let mut encoder = DeltaEncoder::new(scene.range)?;
    let mut builder = DocumentBuilder::new(
        scene.canvas,
        scene.range,
        scene.fps,
        scene.name.clone(),
    );

    for frame in scene.range.iter() {
        let frame_sample = scene.sample_frame(frame)?;
        let samples = normalize_frame(&projector, &frame_sample, opts.color_precision)?;
        encoder.encode_frame(frame, &samples, &mut builder)?;
    }

    let doc = builder.finalize(DocumentMeta {
        author: opts.author.clone(),
        ..DocumentMeta::default()
    })?;

    let stats = doc.stats();
    tracing::debug!(
        groups = stats.groups,
        path_keyframes = stats.path_keyframes,
        fill_keyframes = stats.fill_keyframes,
        "encoded animation document"
    );

    Ok(doc)
}

/// Project and color-normalize one frame's polygons. Pure per frame.
fn normalize_frame(
    projector: &Projector<'_>,
    frame: &FrameSample,
    color_precision: u8,
) -> PolylotResult<Vec<ShapeSample>> {
    frame
        .polygons
        .iter()
        .map(|poly| {
            Ok(ShapeSample {
                index: poly.index,
                path: projector.project_polygon(&poly.vertices)?,
                fill: poly
                    .fill
                    .unwrap_or(LinearRgb::WHITE)
                    .to_display(color_precision),
            })
        })
        .collect()
}

/// Encode the scene and write the document to `out_path`.
pub fn export_scene(scene: &Scene, opts: &ExportOptions, out_path: &Path) -> PolylotResult<()> {
    let doc = encode_document(scene, opts)?;
    write_document(&doc, out_path)
}
