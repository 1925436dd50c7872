use glam::DVec3;

use crate::{
    camera::Camera,
    color::LinearRgb,
    core::{Canvas, Fps, FrameIndex, FrameRange},
    error::{PolylotError, PolylotResult},
};

/// Input document: a baked mesh animation plus everything needed to frame it.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    pub name: String,
    pub canvas: Canvas,
    pub fps: Fps,
    pub range: FrameRange,
    pub camera: Option<Camera>,
    pub mesh: Mesh,
}

/// Fixed polygon topology with per-frame vertex positions.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Mesh {
    pub polygons: Vec<Polygon>,
    /// One entry per frame of the export range, in timeline order.
    pub frames: Vec<MeshFrame>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Polygon {
    /// Indices into the per-frame position arrays, in traversal order.
    pub vertices: Vec<usize>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MeshFrame {
    /// World-space position per mesh vertex.
    pub positions: Vec<DVec3>,
    /// Linear fill color per polygon. Absent means the mesh carries no fill
    /// attribute and every polygon falls back to opaque white.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fills: Option<Vec<LinearRgb>>,
}

/// Immutable per-frame snapshot handed to the projection and encode stages.
#[derive(Clone, Debug)]
pub struct FrameSample {
    pub polygons: Vec<PolygonSample>,
}

#[derive(Clone, Debug)]
pub struct PolygonSample {
    pub index: u32,
    pub vertices: Vec<DVec3>,
    pub fill: Option<LinearRgb>,
}

/// Pure frame sampling: no shared mutable host state, each call returns an
/// independent snapshot.
pub trait FrameSource {
    fn sample_frame(&self, frame: FrameIndex) -> PolylotResult<FrameSample>;
}

impl Scene {
    pub fn validate(&self) -> PolylotResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(PolylotError::validation("canvas width/height must be > 0"));
        }
        if self.range.end.0 <= self.range.start.0 {
            return Err(PolylotError::timeline(format!(
                "range [{}, {}) contains no frames",
                self.range.start.0, self.range.end.0
            )));
        }
        if let Some(camera) = &self.camera {
            camera.validate()?;
        }

        let frame_count = self.mesh.frames.len() as u64;
        if frame_count != self.range.len_frames() {
            return Err(PolylotError::validation(format!(
                "mesh has {} frames but range [{}, {}) spans {}",
                frame_count,
                self.range.start.0,
                self.range.end.0,
                self.range.len_frames()
            )));
        }

        let vertex_count = self
            .mesh
            .frames
            .first()
            .map(|f| f.positions.len())
            .unwrap_or(0);

        for (i, polygon) in self.mesh.polygons.iter().enumerate() {
            if polygon.vertices.len() < 3 {
                return Err(PolylotError::validation(format!(
                    "polygon {i} has fewer than 3 vertices"
                )));
            }
            if let Some(&bad) = polygon.vertices.iter().find(|&&v| v >= vertex_count) {
                return Err(PolylotError::validation(format!(
                    "polygon {i} references vertex {bad}, mesh has {vertex_count}"
                )));
            }
        }

        for (i, frame) in self.mesh.frames.iter().enumerate() {
            if frame.positions.len() != vertex_count {
                return Err(PolylotError::validation(format!(
                    "frame {i} has {} vertex positions, expected {vertex_count}",
                    frame.positions.len()
                )));
            }
            if let Some(fills) = &frame.fills {
                if fills.len() != self.mesh.polygons.len() {
                    return Err(PolylotError::validation(format!(
                        "frame {i} has {} fill colors for {} polygons",
                        fills.len(),
                        self.mesh.polygons.len()
                    )));
                }
            }
        }

        Ok(())
    }

    /// The camera, or `MissingCamera` when the scene has none.
    pub fn camera(&self) -> PolylotResult<&Camera> {
        self.camera
            .as_ref()
            .ok_or_else(|| PolylotError::missing_camera("scene defines no camera"))
    }
}

impl FrameSource for Scene {
    fn sample_frame(&self, frame: FrameIndex) -> PolylotResult<FrameSample> {
        if !self.range.contains(frame) {
            return Err(PolylotError::validation(format!(
                "frame {} is outside range [{}, {})",
                frame.0, self.range.start.0, self.range.end.0
            )));
        }

        let idx = (frame.0 - self.range.start.0) as usize;
        let mesh_frame = self.mesh.frames.get(idx).ok_or_else(|| {
            PolylotError::validation(format!("mesh has no baked data for frame {}", frame.0))
        })?;

        let polygons = self
            .mesh
            .polygons
            .iter()
            .enumerate()
            .map(|(i, polygon)| {
                let vertices = polygon
                    .vertices
                    .iter()
                    .map(|&v| {
                        mesh_frame.positions.get(v).copied().ok_or_else(|| {
                            PolylotError::validation(format!(
                                "polygon {i} references vertex {v} missing from frame {}",
                                frame.0
                            ))
                        })
                    })
                    .collect::<PolylotResult<Vec<_>>>()?;
                Ok(PolygonSample {
                    index: i as u32,
                    vertices,
                    fill: mesh_frame
                        .fills
                        .as_ref()
                        .and_then(|fills| fills.get(i).copied()),
                })
            })
            .collect::<PolylotResult<Vec<_>>>()?;

        Ok(FrameSample { polygons })
    }
}
