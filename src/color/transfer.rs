use super::SigmoidParams;

/// `s <= 0.04045 -> s/12.92`; else `((s+0.055)/1.055)^2.4` (spec §4.3).
pub fn srgb_to_linear(s: f32) -> f32 {
  if s <= 0.04045 {
    s / 12.92
  } else {
    ((s + 0.055) / 1.055).powf(2.4)
  }
}

/// `c <= 0.0031308 -> 12.92*c*255`; else `1.055*255*c^(1/2.4) - 14.025`
/// (spec §4.3). Returns a value already scaled to the 0..255 byte range.
pub fn linear_to_srgb(c: f32) -> f32 {
  if c <= 0.0031308 {
    12.92 * c * 255.0
  } else {
    1.055 * 255.0 * c.max(0.0).powf(1.0 / 2.4) - 14.025
  }
}

fn sigmoid_raw(t: f32, p: SigmoidParams) -> f32 {
  let r = p.a * t + p.b;
  r / (r.abs() + p.z)
}

/// `k = r/(|r|+z)`, `r = a*x+b`, renormalised so `sigmoid(0) == 0` and
/// `sigmoid(1) == 1` (spec §4.3).
pub fn sigmoid(x: f32, p: SigmoidParams) -> f32 {
  let f0 = sigmoid_raw(0.0, p);
  let f1 = sigmoid_raw(1.0, p);
  (sigmoid_raw(x, p) - f0) / (f1 - f0)
}

/// Inverts [`sigmoid`]: recovers `r` from `k = r/(|r|+z)`, then `x` from `r`.
pub fn inverse_sigmoid(y: f32, p: SigmoidParams) -> f32 {
  let f0 = sigmoid_raw(0.0, p);
  let f1 = sigmoid_raw(1.0, p);
  let k = y * (f1 - f0) + f0;
  let r = k * p.z / (1.0 - k.abs());
  (r - p.b) / p.a
}
