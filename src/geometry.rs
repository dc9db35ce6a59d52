//! Rotation and EXIF-orientation composition (spec §4.9).

use crate::bitmap::ByteBitmap;
use crate::error::EngineResult;

/// Clockwise 90-degree rotation: transpose, then mirror each row.
pub fn rotate_90_cw(src: &ByteBitmap) -> EngineResult<ByteBitmap> {
  let mut out = src.transpose()?;
  out.flip_horizontal();
  Ok(out)
}

/// 180-degree rotation: both mirrors, in either order.
pub fn rotate_180(src: &ByteBitmap) -> EngineResult<ByteBitmap> {
  let mut out = src.clone();
  out.flip_horizontal();
  out.flip_vertical();
  Ok(out)
}

/// Clockwise 270-degree rotation (counter-clockwise 90): transpose, then
/// mirror top-to-bottom.
pub fn rotate_270_cw(src: &ByteBitmap) -> EngineResult<ByteBitmap> {
  let mut out = src.transpose()?;
  out.flip_vertical();
  Ok(out)
}

/// Applies one of the 8 EXIF orientation codes (spec §4.9, SPEC_FULL §4.9
/// composition table).
pub fn apply_orientation(src: &ByteBitmap, exif_code: u8) -> EngineResult<ByteBitmap> {
  Ok(match exif_code {
    1 => src.clone(),
    2 => {
      let mut b = src.clone();
      b.flip_horizontal();
      b
    }
    3 => rotate_180(src)?,
    4 => {
      let mut b = src.clone();
      b.flip_vertical();
      b
    }
    5 => src.transpose()?,
    6 => rotate_90_cw(src)?,
    7 => rotate_180(&src.transpose()?)?,
    8 => rotate_270_cw(src)?,
    _ => src.clone(),
  })
}
