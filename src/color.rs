use crate::quantize::round_dp;

/// Light-linear RGB triplet as stored in mesh color attributes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LinearRgb(pub [f64; 3]);

impl LinearRgb {
    /// Fallback fill when a mesh carries no color attribute.
    pub const WHITE: Self = Self([1.0, 1.0, 1.0]);

    /// Convert to display space and quantize each channel.
    pub fn to_display(self, decimals: u8) -> ColorSample {
        ColorSample(self.0.map(|c| round_dp(linear_to_display(c), decimals)))
    }
}

/// Gamma-encoded RGB triplet quantized for keyframe comparison.
///
/// Two samples built from the same precision compare equal exactly when every
/// channel quantized to the same decimal value.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct ColorSample(pub [f64; 3]);

/// Piecewise sRGB transfer function, linear to display.
pub fn linear_to_display(c: f64) -> f64 {
    if c <= 0.0 {
        0.0
    } else if c <= 0.003_130_8 {
        c * 12.92
    } else if c < 1.0 {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    } else {
        1.0
    }
}

/// Inverse transfer, display to linear.
pub fn display_to_linear(c: f64) -> f64 {
    if c <= 0.0 {
        0.0
    } else if c <= 0.040_45 {
        c / 12.92
    } else if c < 1.0 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        1.0
    }
}
