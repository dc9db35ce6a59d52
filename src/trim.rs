//! Content-trim heuristic: Sobel-Scharr edge detection over a luma
//! projection of the bitmap (spec §4.10).
//!
//! Strip-scanning over a fixed-size buffer is a memory optimization only;
//! this implementation runs the gradient pass over the whole image at
//! once. The gradient itself straddles a true content/background edge by
//! one pixel on either side, so after the pass each bound is pulled back
//! in while it still borders uniform background (§4.10 step 3's "expand
//! by one pixel" otherwise leaves a one-pixel halo of background inside
//! the reported box).

use crate::bitmap::ByteBitmap;
use crate::pixel::PixelFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimRect {
  pub x1: u32,
  pub y1: u32,
  pub x2: u32,
  pub y2: u32,
}
impl TrimRect {
  /// Returned when no content triggers the threshold (spec §4.10 step 5).
  pub fn sentinel(width: u32, height: u32) -> Self {
    Self { x1: 0, y1: 0, x2: width, y2: height }
  }
}

fn luma(bmp: &ByteBitmap, x: u32, y: u32) -> u8 {
  let row = bmp.row(y);
  let bpp = bmp.format.bytes_per_pixel();
  let off = x as usize * bpp;
  let (b, g, r) = (row[off] as u32, row[off + 1] as u32, row[off + 2] as u32);
  if bmp.format == PixelFormat::Bgra32 && bmp.alpha_meaningful {
    let a = row[off + 3] as u32;
    let gray = ((233 * b + 1197 * g + 610 * r) * a + 524287) / 524288;
    gray.min(255) as u8
  } else {
    ((233 * b + 1197 * g + 610 * r) / 2048) as u8
  }
}

/// Detects a bounding rectangle tight around non-background content
/// (spec §4.10).
pub fn detect_content(bmp: &ByteBitmap, threshold: u32) -> TrimRect {
  if bmp.width < 3 || bmp.height < 3 {
    return TrimRect::sentinel(bmp.width, bmp.height);
  }

  let luma_grid: Vec<u8> = (0..bmp.height)
    .flat_map(|y| (0..bmp.width).map(move |x| (x, y)))
    .map(|(x, y)| luma(bmp, x, y))
    .collect();
  let (w, h) = (bmp.width as i64, bmp.height as i64);
  // Replicate the border pixel for off-image taps, so the gradient also
  // sees transitions that sit right at the edge of the bitmap.
  let at = |x: i64, y: i64| -> i32 {
    let cx = x.clamp(0, w - 1) as usize;
    let cy = y.clamp(0, h - 1) as usize;
    luma_grid[cy * w as usize + cx] as i32
  };

  let (mut min_x, mut max_x) = (bmp.width, 0u32);
  let (mut min_y, mut max_y) = (bmp.height, 0u32);
  let mut triggered = false;

  for y in 0..bmp.height {
    for x in 0..bmp.width {
      let (xi, yi) = (x as i64, y as i64);
      let gx = -3 * at(xi - 1, yi - 1) - 10 * at(xi - 1, yi) - 3 * at(xi - 1, yi + 1)
        + 3 * at(xi + 1, yi - 1)
        + 10 * at(xi + 1, yi)
        + 3 * at(xi + 1, yi + 1);
      let gy = 3 * at(xi - 1, yi - 1) + 10 * at(xi, yi - 1) + 3 * at(xi + 1, yi - 1)
        - 3 * at(xi - 1, yi + 1)
        - 10 * at(xi, yi + 1)
        - 3 * at(xi + 1, yi + 1);
      if (gx.abs() + gy.abs()) as u32 > threshold {
        triggered = true;
        min_x = min_x.min(x.saturating_sub(1));
        max_x = max_x.max(x + 1);
        min_y = min_y.min(y.saturating_sub(1));
        max_y = max_y.max(y + 1);
      }
    }
  }

  if !triggered {
    return TrimRect::sentinel(bmp.width, bmp.height);
  }

  // Pull each bound back in while its border row/column still matches the
  // background (sampled from the top-left corner), undoing the gradient's
  // one-pixel overshoot into uniform background.
  let bg = at(0, 0);
  let is_bg = |v: i32| (v - bg).abs() <= threshold as i32;

  while min_x + 1 < max_x && (min_y..max_y).all(|y| is_bg(at(min_x as i64, y as i64))) {
    min_x += 1;
  }
  while max_x > min_x + 1 && (min_y..max_y).all(|y| is_bg(at((max_x - 1) as i64, y as i64))) {
    max_x -= 1;
  }
  while min_y + 1 < max_y && (min_x..max_x).all(|x| is_bg(at(x as i64, min_y as i64))) {
    min_y += 1;
  }
  while max_y > min_y + 1 && (min_x..max_x).all(|x| is_bg(at(x as i64, (max_y - 1) as i64))) {
    max_y -= 1;
  }

  TrimRect { x1: min_x, y1: min_y, x2: max_x, y2: max_y }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn solid_with_rect(w: u32, h: u32, rx1: u32, ry1: u32, rx2: u32, ry2: u32) -> ByteBitmap {
    let mut bmp = ByteBitmap::new(w, h, PixelFormat::Bgra32).unwrap();
    bmp.fill_rect(0, 0, w, h, [0, 0, 0, 0xFF]).unwrap();
    bmp.fill_rect(rx1, ry1, rx2, ry2, [0xFF, 0, 0, 0xFF]).unwrap();
    bmp
  }

  #[test]
  fn detects_interior_rectangle() {
    let bmp = solid_with_rect(10, 10, 1, 1, 9, 9);
    let r = detect_content(&bmp, 1);
    assert_eq!(r, TrimRect { x1: 1, y1: 1, x2: 9, y2: 9 });
  }

  #[test]
  fn detects_offset_rectangle() {
    let bmp = solid_with_rect(100, 100, 2, 3, 70, 70);
    let r = detect_content(&bmp, 1);
    assert_eq!(r, TrimRect { x1: 2, y1: 3, x2: 70, y2: 70 });
  }

  #[test]
  fn single_pixel_gives_a_unit_box_at_every_interior_position() {
    for size in 3u32..=11 {
      for y in 1..size - 1 {
        for x in 1..size - 1 {
          let bmp = solid_with_rect(size, size, x, y, x + 1, y + 1);
          let r = detect_content(&bmp, 1);
          assert_eq!(r, TrimRect { x1: x, y1: y, x2: x + 1, y2: y + 1 }, "size={size} x={x} y={y}");
        }
      }
    }
  }
}
