use crate::error::{EngineError, EngineResult};

/// Round up `elems` to the next multiple of 16, spec §4.2's float-stride
/// padding.
const fn pad_float_stride(elems: usize) -> usize {
  (elems + 15) & !15
}

/// A linear-light, channel-interleaved float canvas (spec §3 "Float
/// Bitmap"). Channel 3, when present, is alpha; channels 0/1/2 are B/G/R
/// in working space, premultiplied by alpha when `alpha_meaningful`.
#[derive(Debug, Clone)]
pub struct FloatBitmap {
  pub width: u32,
  pub height: u32,
  pub channels: u8,
  pub float_stride: usize,
  pub pixels: Vec<f32>,
  pub alpha_premultiplied: bool,
  pub alpha_meaningful: bool,
}
impl FloatBitmap {
  pub fn new(width: u32, height: u32, channels: u8) -> EngineResult<Self> {
    if !(channels == 3 || channels == 4) {
      return Err(EngineError::InvalidArgument(format!("float bitmap channels {channels}")));
    }
    let float_stride = pad_float_stride(width as usize * channels as usize);
    let total = float_stride
      .checked_mul(height as usize)
      .ok_or_else(|| EngineError::InvalidDimensions("float bitmap overflow".into()))?;
    Ok(Self {
      width,
      height,
      channels,
      float_stride,
      pixels: vec![0.0f32; total],
      alpha_premultiplied: false,
      alpha_meaningful: channels == 4,
    })
  }

  #[inline]
  pub fn row(&self, y: u32) -> &[f32] {
    let start = y as usize * self.float_stride;
    &self.pixels[start..start + self.width as usize * self.channels as usize]
  }

  #[inline]
  pub fn row_mut(&mut self, y: u32) -> &mut [f32] {
    let start = y as usize * self.float_stride;
    let len = self.width as usize * self.channels as usize;
    &mut self.pixels[start..start + len]
  }

  /// Divides B/G/R by alpha for every pixel with alpha > 0 (spec §4.4
  /// "Demultiply").
  pub fn demultiply(&mut self) {
    if self.channels != 4 || !self.alpha_premultiplied {
      return;
    }
    for y in 0..self.height {
      let row = self.row_mut(y);
      for px in row.chunks_exact_mut(4) {
        let a = px[3];
        if a > 0.0 {
          px[0] /= a;
          px[1] /= a;
          px[2] /= a;
        }
      }
    }
    self.alpha_premultiplied = false;
  }
}
