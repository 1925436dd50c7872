use glam::{DMat4, DVec2, DVec3};

use crate::error::{PolylotError, PolylotResult};

const Z_NEAR: f64 = 0.1;
const Z_FAR: f64 = 1000.0;

/// Camera projecting world positions into normalized screen space.
///
/// Normalized coordinates put `(0,0)` at the bottom-left and `(1,1)` at the
/// top-right of the viewport; the projector applies the raster Y flip.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct Camera {
    pub position: DVec3,
    pub target: DVec3,
    #[serde(default = "default_up")]
    pub up: DVec3,
    pub projection: Projection,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in degrees, in `(0, 180)`.
        fov_y_deg: f64,
    },
    Orthographic {
        /// Vertical extent of the view volume in world units.
        scale: f64,
    },
}

fn default_up() -> DVec3 {
    DVec3::Z
}

impl Camera {
    pub fn validate(&self) -> PolylotResult<()> {
        if self.position == self.target {
            return Err(PolylotError::validation(
                "camera position and target must differ",
            ));
        }
        match self.projection {
            Projection::Perspective { fov_y_deg } => {
                if !(fov_y_deg > 0.0 && fov_y_deg < 180.0) {
                    return Err(PolylotError::validation(
                        "camera fov_y_deg must be in (0, 180)",
                    ));
                }
            }
            Projection::Orthographic { scale } => {
                if scale <= 0.0 {
                    return Err(PolylotError::validation("camera scale must be > 0"));
                }
            }
        }
        Ok(())
    }

    /// Project a world position into normalized `[0,1]²` viewport coordinates.
    ///
    /// Positions outside the frustum project outside the unit square; they are
    /// still valid samples. Positions on the camera plane produce non-finite
    /// coordinates, which the projector rejects.
    pub fn to_normalized(&self, aspect: f64, world: DVec3) -> DVec2 {
        let view = DMat4::look_at_rh(self.position, self.target, self.up);
        let proj = match self.projection {
            Projection::Perspective { fov_y_deg } => {
                DMat4::perspective_rh(fov_y_deg.to_radians(), aspect, Z_NEAR, Z_FAR)
            }
            Projection::Orthographic { scale } => {
                let half_h = scale * 0.5;
                let half_w = half_h * aspect;
                DMat4::orthographic_rh(-half_w, half_w, -half_h, half_h, Z_NEAR, Z_FAR)
            }
        };

        let clip = proj * view * world.extend(1.0);
        let ndc = DVec2::new(clip.x / clip.w, clip.y / clip.w);
        (ndc + DVec2::ONE) * 0.5
    }
}
