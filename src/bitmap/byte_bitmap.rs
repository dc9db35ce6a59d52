use crate::error::{EngineError, EngineResult};
use crate::pixel::{CompositingMode, PixelFormat};

/// Round `bytes` up to the next multiple of 64, spec §4.2's stride padding.
const fn pad_stride(bytes: usize) -> usize {
  (bytes + 63) & !63
}

/// An owned byte-oriented canvas (spec §3 "Byte Bitmap").
///
/// `pixels` always spans at least `height * stride` bytes; `stride` may
/// exceed `width * format.bytes_per_pixel()` to honor the padding rule, or
/// may be a caller-supplied value narrower than the padded default when the
/// bitmap was constructed to alias externally-owned memory layout.
#[derive(Debug, Clone)]
pub struct ByteBitmap {
  pub width: u32,
  pub height: u32,
  pub stride: usize,
  pub format: PixelFormat,
  pub pixels: Vec<u8>,
  pub alpha_meaningful: bool,
  pub compositing_mode: CompositingMode,
  pub matte: [u8; 4],
}
impl ByteBitmap {
  /// Allocates a zero-filled canvas with stride padded to a 64-byte
  /// multiple, per spec §4.2.
  pub fn new(width: u32, height: u32, format: PixelFormat) -> EngineResult<Self> {
    if width == 0 || height == 0 {
      return Err(EngineError::InvalidDimensions(format!("{width}x{height}")));
    }
    let bpp = format.bytes_per_pixel();
    let unpadded = (width as usize)
      .checked_mul(bpp)
      .ok_or_else(|| EngineError::InvalidDimensions("width overflow".into()))?;
    let stride = pad_stride(unpadded);
    let total = stride
      .checked_mul(height as usize)
      .ok_or_else(|| EngineError::InvalidDimensions("height overflow".into()))?;
    Ok(Self {
      width,
      height,
      stride,
      format,
      pixels: vec![0u8; total],
      alpha_meaningful: format.has_alpha_channel(),
      compositing_mode: CompositingMode::Replace,
      matte: [0, 0, 0, 0xFF],
    })
  }

  #[inline]
  pub fn row(&self, y: u32) -> &[u8] {
    let start = y as usize * self.stride;
    &self.pixels[start..start + self.content_row_bytes()]
  }

  #[inline]
  pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
    let start = y as usize * self.stride;
    let len = self.content_row_bytes();
    &mut self.pixels[start..start + len]
  }

  #[inline]
  fn content_row_bytes(&self) -> usize {
    self.width as usize * self.format.bytes_per_pixel()
  }

  /// Bit-exact row comparison over content width only, ignoring stride
  /// padding (spec §4.2 "Compare").
  pub fn content_equals(&self, other: &Self) -> bool {
    if self.width != other.width || self.height != other.height || self.format != other.format {
      return false;
    }
    (0..self.height).all(|y| self.row(y) == other.row(y))
  }

  /// Whole-row swap using one temporary row buffer (spec §4.2).
  pub fn flip_vertical(&mut self) {
    let row_bytes = self.content_row_bytes();
    let mut tmp = vec![0u8; row_bytes];
    let (mut top, mut bottom) = (0u32, self.height.saturating_sub(1));
    while top < bottom {
      let (lo, hi) = (top as usize * self.stride, bottom as usize * self.stride);
      tmp.copy_from_slice(&self.pixels[lo..lo + row_bytes]);
      let (head, tail) = self.pixels.split_at_mut(hi);
      head[lo..lo + row_bytes].copy_from_slice(&tail[..row_bytes]);
      tail[..row_bytes].copy_from_slice(&tmp);
      top += 1;
      bottom -= 1;
    }
  }

  /// In-place pixel swap along each row (spec §4.2).
  pub fn flip_horizontal(&mut self) {
    let bpp = self.format.bytes_per_pixel();
    let width = self.width as usize;
    for y in 0..self.height {
      let row = self.row_mut(y);
      let (mut l, mut r) = (0usize, width - 1);
      while l < r {
        let (lo, hi) = (l * bpp, r * bpp);
        for b in 0..bpp {
          row.swap(lo + b, hi + b);
        }
        l += 1;
        r -= 1;
      }
    }
  }

  /// Transpose into a freshly allocated bitmap with swapped dimensions
  /// (spec §4.2, §4.9). The teacher's SSE block-transpose becomes a plain
  /// per-pixel copy here; correctness does not depend on vectorization
  /// (Design Note "SIMD").
  pub fn transpose(&self) -> EngineResult<Self> {
    let mut out = Self::new(self.height, self.width, self.format)?;
    let bpp = self.format.bytes_per_pixel();
    for y in 0..self.height {
      let src_row = self.row(y);
      for x in 0..self.width {
        let s = x as usize * bpp;
        let dst_row = out.row_mut(x);
        let d = y as usize * bpp;
        dst_row[d..d + bpp].copy_from_slice(&src_row[s..s + bpp]);
      }
    }
    Ok(out)
  }

  /// fill-rect (spec §4.9): `x1<x2, y1<y2, x2<=w, y2<=h` required.
  pub fn fill_rect(&mut self, x1: u32, y1: u32, x2: u32, y2: u32, color: [u8; 4]) -> EngineResult<()> {
    if self.format == PixelFormat::Gray8 {
      return Err(EngineError::UnsupportedPixelFormat("GRAY8 fill_rect".into()));
    }
    if !(x1 < x2 && y1 < y2 && x2 <= self.width && y2 <= self.height) {
      return Err(EngineError::InvalidArgument(format!(
        "fill_rect bounds ({x1},{y1})-({x2},{y2}) outside {}x{}",
        self.width, self.height
      )));
    }
    let bpp = self.format.bytes_per_pixel();
    for y in y1..y2 {
      let row = self.row_mut(y);
      for x in x1..x2 {
        let o = x as usize * bpp;
        row[o..o + bpp].copy_from_slice(&color[..bpp]);
      }
    }
    Ok(())
  }

  /// copy-rect-to-canvas (spec §4.9): requires matching formats and bounds.
  pub fn copy_rect_to_canvas(
    &mut self, from: &Self, from_x: u32, from_y: u32, w: u32, h: u32, to_x: u32, to_y: u32,
  ) -> EngineResult<()> {
    if self.format != from.format {
      return Err(EngineError::UnsupportedPixelFormat("copy_rect_to_canvas format mismatch".into()));
    }
    if from_x + w > from.width
      || from_y + h > from.height
      || to_x + w > self.width
      || to_y + h > self.height
    {
      return Err(EngineError::InvalidDimensions("copy_rect_to_canvas out of bounds".into()));
    }
    let bpp = self.format.bytes_per_pixel();
    let row_bytes = w as usize * bpp;
    for row in 0..h {
      let src_row = from.row(from_y + row);
      let src_off = from_x as usize * bpp;
      let src = &src_row[src_off..src_off + row_bytes];
      let dst_row = self.row_mut(to_y + row);
      let dst_off = to_x as usize * bpp;
      dst_row[dst_off..dst_off + row_bytes].copy_from_slice(src);
    }
    Ok(())
  }

  /// Borrows a subregion as a [`ByteBitmapView`] (spec §4.9 "crop-alias").
  /// The view shares the parent's pixel storage; it must not outlive it.
  pub fn crop_alias(&mut self, x1: u32, y1: u32, x2: u32, y2: u32) -> EngineResult<ByteBitmapView<'_>> {
    if !(x1 < x2 && y1 < y2 && x2 <= self.width && y2 <= self.height) {
      return Err(EngineError::InvalidDimensions("crop_alias out of bounds".into()));
    }
    Ok(ByteBitmapView {
      width: x2 - x1,
      height: y2 - y1,
      stride: self.stride,
      format: self.format,
      x_offset: x1,
      y_offset: y1,
      pixels: &mut self.pixels,
    })
  }
}

/// A borrowed alias over a rectangular subregion of a parent [`ByteBitmap`].
pub struct ByteBitmapView<'a> {
  pub width: u32,
  pub height: u32,
  pub stride: usize,
  pub format: PixelFormat,
  x_offset: u32,
  y_offset: u32,
  pixels: &'a mut [u8],
}
impl<'a> ByteBitmapView<'a> {
  #[inline]
  pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
    let bpp = self.format.bytes_per_pixel();
    let start = (self.y_offset + y) as usize * self.stride + self.x_offset as usize * bpp;
    let len = self.width as usize * bpp;
    &mut self.pixels[start..start + len]
  }

  #[inline]
  pub fn row(&self, y: u32) -> &[u8] {
    let bpp = self.format.bytes_per_pixel();
    let start = (self.y_offset + y) as usize * self.stride + self.x_offset as usize * bpp;
    let len = self.width as usize * bpp;
    &self.pixels[start..start + len]
  }
}
