/// Round `value` to `decimals` decimal places using round-half-to-even.
///
/// Keyframe emission compares quantized samples bit-for-bit, so every value
/// that feeds an equality check must pass through this one function. Ties
/// round to even for reproducibility across platforms.
pub fn round_dp(value: f64, decimals: u8) -> f64 {
    let scale = 10f64.powi(i32::from(decimals));
    (value * scale).round_ties_even() / scale
}
