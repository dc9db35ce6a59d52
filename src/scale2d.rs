//! The vertical+horizontal resample engine with a rolling row cache
//! (spec §4.7).

use crate::bitmap::ByteBitmap;
use crate::color::{ColorContext, TransferFunction};
use crate::contribution::{ContributionTable, ZERO_WEIGHT_THRESHOLD};
use crate::error::{EngineError, EngineResult};
use crate::filters::InterpolationFilter;
use crate::pixel::{CompositingMode, PixelFormat};
use crate::scanline;

#[derive(Debug, Clone, Copy)]
pub struct Rect {
  pub x: u32,
  pub y: u32,
  pub w: u32,
  pub h: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct ScaleParams {
  pub filter: InterpolationFilter,
  pub sharpen_percent: f32,
  pub transfer: TransferFunction,
}
impl Default for ScaleParams {
  fn default() -> Self {
    Self { filter: InterpolationFilter::Robidoux, sharpen_percent: 0.0, transfer: TransferFunction::Srgb }
  }
}

struct RowSlot {
  index: Option<i64>,
  coefficient: f32,
  data: Vec<f32>,
}

fn require_4bpp(format: PixelFormat) -> EngineResult<()> {
  match format {
    PixelFormat::Bgra32 | PixelFormat::Bgr32 => Ok(()),
    other => Err(EngineError::NotImplemented(format!("scale2d on {other:?}"))),
  }
}

/// Resamples `src` into the `window` subregion of `dst` (spec §4.7).
/// Both bitmaps must be BGRA32 or BGR32.
pub fn scale2d(src: &ByteBitmap, dst: &mut ByteBitmap, window: Rect, params: ScaleParams) -> EngineResult<()> {
  debug!(
    "scale2d: {}x{} -> {}x{} (window {:?}, filter {:?})",
    src.width, src.height, window.w, window.h, params.filter
  );
  require_4bpp(src.format)?;
  require_4bpp(dst.format)?;

  let cc = ColorContext::new(params.transfer, None);
  let v_filter = params.filter.details(params.sharpen_percent);
  let h_filter = params.filter.details(params.sharpen_percent);
  let vertical = ContributionTable::build(window.h as usize, src.height as usize, &v_filter);
  let horizontal = ContributionTable::build(window.w as usize, src.width as usize, &h_filter);

  let max_input_rows =
    vertical.rows.iter().map(|r| (r.right - r.left + 1).max(0) as usize).max().unwrap_or(1);

  let src_channels = 4usize;
  let mut pool: Vec<RowSlot> = (0..=max_input_rows)
    .map(|_| RowSlot { index: None, coefficient: 1.0, data: vec![0.0f32; src.width as usize * src_channels] })
    .collect();

  let mut accumulator = vec![0.0f32; src.width as usize * src_channels];
  let mut h_accum_in = vec![0.0f32; src.width as usize * src_channels];
  let mut h_out = vec![0.0f32; window.w as usize * src_channels];

  for (out_row, v_row) in vertical.rows.iter().enumerate() {
    for v in accumulator.iter_mut() {
      *v = 0.0;
    }

    let left = v_row.left;
    let v_weights = vertical.weights_for(out_row);
    for (offset, &w) in v_weights.iter().enumerate() {
      let input_row = v_row.left + offset as i64;

      // Evict anything no longer reachable by the current or next window.
      for slot in pool.iter_mut() {
        if let Some(idx) = slot.index {
          if idx < left {
            slot.index = None;
          }
        }
      }

      let slot_pos = pool.iter().position(|s| s.index == Some(input_row)).unwrap_or_else(|| {
        let free = pool.iter().position(|s| s.index.is_none()).unwrap_or(0);
        scanline::linearise_row(
          &cc,
          src.row(input_row as u32),
          src.format,
          src.alpha_meaningful,
          &mut pool[free].data,
        )
        .expect("row format validated above");
        pool[free].index = Some(input_row);
        pool[free].coefficient = 1.0;
        free
      });

      if w.abs() > ZERO_WEIGHT_THRESHOLD {
        let slot = &mut pool[slot_pos];
        let scale = w / slot.coefficient;
        for v in h_accum_in.iter_mut() {
          *v = 0.0;
        }
        for (d, s) in slot.data.iter_mut().zip(h_accum_in.iter_mut()) {
          *d *= scale;
          *s = *d;
        }
        slot.coefficient = w;
        for (acc, s) in accumulator.iter_mut().zip(h_accum_in.iter()) {
          *acc += *s;
        }
      }
    }

    // Horizontal resample of the vertically-scaled accumulator row.
    for out_x in 0..window.w as usize {
      let h_row = &horizontal.rows[out_x];
      let h_weights = horizontal.weights_for(out_x);
      let out_px = &mut h_out[out_x * src_channels..out_x * src_channels + src_channels];
      out_px.iter_mut().for_each(|v| *v = 0.0);
      for (offset, &w) in h_weights.iter().enumerate() {
        if w == 0.0 {
          continue;
        }
        let src_x = (h_row.left + offset as i64) as usize;
        let src_px = &accumulator[src_x * src_channels..src_x * src_channels + src_channels];
        for c in 0..src_channels {
          out_px[c] += src_px[c] * w;
        }
      }
    }

    let compositing_mode = dst.compositing_mode;
    let matte = dst.matte;
    let dst_format = dst.format;
    let dst_row = dst.row_mut(window.y + out_row as u32);
    let dst_off = window.x as usize * dst_format.bytes_per_pixel();
    let dst_len = window.w as usize * dst_format.bytes_per_pixel();
    let dst_slice = &mut dst_row[dst_off..dst_off + dst_len];

    match compositing_mode {
      CompositingMode::Replace => {
        scanline::copy_row_to_bytes(&cc, &h_out, src_channels, src.alpha_meaningful, dst_slice, dst_format);
      }
      CompositingMode::BlendWithSelf => {
        scanline::composite_row_to_bytes(&cc, &h_out, dst_slice, dst_format);
      }
      CompositingMode::BlendWithMatte => {
        scanline::matte_blend_row(&cc, &mut h_out, matte);
        scanline::copy_row_to_bytes(&cc, &h_out, src_channels, src.alpha_meaningful, dst_slice, dst_format);
      }
    }
  }

  debug!("scale2d complete");
  Ok(())
}
