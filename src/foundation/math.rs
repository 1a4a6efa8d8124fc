pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Linear interpolation written so that `s == 0` yields exactly `a` and `s == 1` exactly `b`.
pub(crate) fn lerp_exact(a: f64, b: f64, s: f64) -> f64 {
    a * (1.0 - s) + b * s
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
