use glam::DVec3;

use crate::{
    camera::Camera,
    core::Canvas,
    error::{PolylotError, PolylotResult},
    sample::PathSample,
};

/// Maps world-space polygon outlines onto the raster canvas.
///
/// Screen X grows right and screen Y grows down, so the normalized Y axis is
/// flipped: `y_screen = (1 - y_norm) * height`.
#[derive(Clone, Copy, Debug)]
pub struct Projector<'a> {
    camera: &'a Camera,
    canvas: Canvas,
    decimals: u8,
}

impl<'a> Projector<'a> {
    pub fn new(camera: &'a Camera, canvas: Canvas, decimals: u8) -> Self {
        Self {
            camera,
            canvas,
            decimals,
        }
    }

    /// Project one polygon's world-space vertices into a quantized path sample.
    pub fn project_polygon(&self, world: &[DVec3]) -> PolylotResult<PathSample> {
        let aspect = f64::from(self.canvas.width) / f64::from(self.canvas.height);
        let width = f64::from(self.canvas.width);
        let height = f64::from(self.canvas.height);

        let mut screen = Vec::with_capacity(world.len());
        for &w in world {
            let norm = self.camera.to_normalized(aspect, w);
            if !norm.x.is_finite() || !norm.y.is_finite() {
                return Err(PolylotError::validation(format!(
                    "vertex at ({}, {}, {}) projects to a non-finite screen position",
                    w.x, w.y, w.z
                )));
            }
            screen.push((norm.x * width, (1.0 - norm.y) * height));
        }

        Ok(PathSample::from_screen_points(screen, self.decimals))
    }
}
