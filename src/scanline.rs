//! Byte<->float row conversion with premultiplication, compositing and
//! matte blending (spec §4.4).

use crate::color::ColorContext;
use crate::error::{EngineError, EngineResult};
use crate::pixel::PixelFormat;

/// Byte -> float linearise, premultiplying by alpha when the source carries
/// meaningful alpha (spec §4.4).
pub fn linearise_row(
  cc: &ColorContext, src: &[u8], format: PixelFormat, alpha_meaningful: bool, dst: &mut [f32],
) -> EngineResult<()> {
  match (format, alpha_meaningful) {
    (PixelFormat::Bgra32, true) => {
      for (px, out) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let a = px[3] as f32 / 255.0;
        out[0] = cc.linear(px[0]) * a;
        out[1] = cc.linear(px[1]) * a;
        out[2] = cc.linear(px[2]) * a;
        out[3] = a;
      }
      Ok(())
    }
    (PixelFormat::Bgr24, _) | (PixelFormat::Bgr32, _) | (PixelFormat::Bgra32, false) => {
      let bpp = format.bytes_per_pixel();
      let channels = dst.len() / (src.len() / bpp);
      for (px, out) in src.chunks_exact(bpp).zip(dst.chunks_exact_mut(channels)) {
        out[0] = cc.linear(px[0]);
        out[1] = cc.linear(px[1]);
        out[2] = cc.linear(px[2]);
      }
      Ok(())
    }
    _ => Err(EngineError::UnsupportedPixelFormat(format!("{format:?} linearise"))),
  }
}

/// Float -> byte copy, clamped to `0..=255`; writes opaque alpha if the
/// destination is BGRA32 but the source carries none (spec §4.4).
/// Divides by alpha before quantizing RGB, undoing `linearise_row`'s
/// premultiplication (spec §4.4 "Demultiply").
pub fn copy_row_to_bytes(
  cc: &ColorContext, src: &[f32], src_channels: usize, alpha_meaningful: bool, dst: &mut [u8],
  dst_format: PixelFormat,
) {
  let dst_bpp = dst_format.bytes_per_pixel();
  let demultiply = alpha_meaningful && src_channels == 4;
  for (px, out) in src.chunks_exact(src_channels).zip(dst.chunks_exact_mut(dst_bpp)) {
    let a = if demultiply { px[3] } else { 1.0 };
    let norm = if a > 0.0 { 1.0 / a } else { 0.0 };
    out[0] = cc.to_byte(px[0] * norm);
    out[1] = cc.to_byte(px[1] * norm);
    out[2] = cc.to_byte(px[2] * norm);
    if dst_format == PixelFormat::Bgra32 {
      out[3] = if demultiply { (a * 255.0).round().clamp(0.0, 255.0) as u8 } else { 0xFF };
    }
  }
}

/// Float -> byte composite: blends premultiplied source over the
/// destination's current pixel in linear space, then re-normalises (spec
/// §4.4).
pub fn composite_row_to_bytes(
  cc: &ColorContext, src: &[f32], dst: &mut [u8], dst_format: PixelFormat,
) {
  let dst_bpp = dst_format.bytes_per_pixel();
  for (px, out) in src.chunks_exact(4).zip(dst.chunks_exact_mut(dst_bpp)) {
    let src_a = px[3];
    let dst_a = if dst_format == PixelFormat::Bgra32 { out[3] as f32 / 255.0 } else { 1.0 };
    let dst_lin = [cc.linear(out[0]) * dst_a, cc.linear(out[1]) * dst_a, cc.linear(out[2]) * dst_a];
    let out_a = src_a + dst_a * (1.0 - src_a);
    let blended = [
      px[0] + dst_lin[0] * (1.0 - src_a),
      px[1] + dst_lin[1] * (1.0 - src_a),
      px[2] + dst_lin[2] * (1.0 - src_a),
    ];
    let norm = if out_a > 0.0 { 1.0 / out_a } else { 0.0 };
    out[0] = cc.to_byte(blended[0] * norm);
    out[1] = cc.to_byte(blended[1] * norm);
    out[2] = cc.to_byte(blended[2] * norm);
    if dst_format == PixelFormat::Bgra32 {
      out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
  }
}

/// Matte blend: replaces transparent source pixels with `matte` (sRGB
/// BGRA), alpha-weighted in linear space, then marks alpha opaque (spec
/// §4.4).
pub fn matte_blend_row(cc: &ColorContext, src: &mut [f32], matte: [u8; 4]) {
  let matte_lin = [cc.linear(matte[0]), cc.linear(matte[1]), cc.linear(matte[2])];
  for px in src.chunks_exact_mut(4) {
    let a = px[3];
    px[0] += matte_lin[0] * (1.0 - a);
    px[1] += matte_lin[1] * (1.0 - a);
    px[2] += matte_lin[2] * (1.0 - a);
    px[3] = 1.0;
  }
}
