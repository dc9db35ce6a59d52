use std::f32::consts::PI;

pub fn triangle(t: f32) -> f32 {
  (1.0 - t.abs()).max(0.0)
}

pub fn boxcar(t: f32, window: f32) -> f32 {
  if t >= -1.0 && t < 1.0 {
    1.0 / (2.0 * window)
  } else {
    0.0
  }
}

/// Bicubic family (spec §4.5): derives (p1,p2,p3) and (q1,q2,q3,q4) from
/// (B, C) and evaluates the Horner-form piecewise cubic.
pub fn bicubic_weight(t: f32, b: f32, c: f32) -> f32 {
  let x = t.abs();
  if x < 1.0 {
    let p1 = (6.0 - 2.0 * b) / 6.0;
    let p2 = (-18.0 + 12.0 * b + 6.0 * c) / 6.0;
    let p3 = (12.0 - 9.0 * b - 6.0 * c) / 6.0;
    p1 + x * (x * (p2 + x * p3))
  } else if x < 2.0 {
    let q1 = (8.0 * b + 24.0 * c) / 6.0;
    let q2 = (-12.0 * b - 48.0 * c) / 6.0;
    let q3 = (6.0 * b + 30.0 * c) / 6.0;
    let q4 = (-b - 6.0 * c) / 6.0;
    q1 + x * (q2 + x * (q3 + x * q4))
  } else {
    0.0
  }
}

/// `(1-2t^2+t^3)` on `[0,1)`, `(4-8t+5t^2-t^3)` on `[1,2)` (spec §4.5).
pub fn cubic_fast(t: f32) -> f32 {
  let x = t.abs();
  if x < 1.0 {
    1.0 - 2.0 * x * x + x * x * x
  } else if x < 2.0 {
    4.0 - 8.0 * x + 5.0 * x * x - x * x * x
  } else {
    0.0
  }
}

fn sinc(x: f32) -> f32 {
  if x.abs() < 1e-8 {
    1.0
  } else {
    x.sin() / x
  }
}

/// `sinc(pi x) / (pi x)` over `[-window, window]` (spec §4.5 "Raw-Lanczos").
pub fn raw_sinc(t: f32, window: f32) -> f32 {
  if t.abs() >= window {
    0.0
  } else {
    sinc(PI * t)
  }
}

/// `sinc(pi x) * sinc(pi x / window) / (pi^2 x^2 / window)`, i.e. sinc
/// windowed by a wider sinc lobe (spec §4.5 Lanczos).
pub fn lanczos_windowed_sinc(t: f32, window: f32, _blur_already_applied: f32) -> f32 {
  if t.abs() >= window {
    0.0
  } else {
    sinc(PI * t) * sinc(PI * t / window)
  }
}

/// Order-1 Bessel function of the first kind, rational approximation
/// (Abramowitz & Stegun 9.4.4/9.4.6), accurate to ~1e-5 for |x| up to ~30.
fn bessel_j1(x: f32) -> f32 {
  let ax = x.abs();
  let result = if ax < 8.0 {
    let y = x * x;
    let p = x
      * (72362614232.0
        + y * (-7895059235.0
          + y * (242396853.1 + y * (-2972611.439 + y * (15704.48260 + y * (-30.16036606))))));
    let q = 144725228442.0
      + y * (2300535178.0
        + y * (18583304.74 + y * (99447.43394 + y * (376.9991397 + y))));
    p / q
  } else {
    let z = 8.0 / ax;
    let y = z * z;
    let p0 = 1.0
      + y * (0.183105e-2 + y * (-0.3516396496e-4 + y * (0.2457520174e-5 + y * -0.240337019e-6)));
    let q0 = 0.04687499995
      + y * (-0.2002690873e-3 + y * (0.8449199096e-5 + y * (-0.88228987e-6 + y * 0.105787412e-6)));
    let chi = ax - 2.356194491;
    let sqrt_term = (0.636619772 / ax).sqrt();
    let amplitude = sqrt_term * (chi.cos() * p0 - z * chi.sin() * q0);
    if x < 0.0 {
      -amplitude
    } else {
      amplitude
    }
  };
  result
}

/// `2 * J1(pi x) / (pi x)` (spec §4.5).
pub fn jinc(t: f32) -> f32 {
  if t.abs() < 1e-8 {
    1.0
  } else {
    let px = PI * t;
    2.0 * bessel_j1(px) / px
  }
}

/// Sinc windowed by jinc instead of a wider sinc lobe (spec §4.5
/// "Ginseng").
pub fn ginseng(t: f32, window: f32, _blur_already_applied: f32) -> f32 {
  if t.abs() >= window {
    0.0
  } else {
    sinc(PI * t) * jinc(t / window)
  }
}
