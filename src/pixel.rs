//! Byte pixel formats, fixed for ABI stability (spec §6).

/// Byte-oriented pixel format. Discriminant values are part of the public
/// contract and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PixelFormat {
  Gray8 = 1,
  Bgr24 = 3,
  Bgra32 = 4,
  Bgr32 = 70,
}
impl PixelFormat {
  pub const fn bytes_per_pixel(self) -> usize {
    match self {
      PixelFormat::Gray8 => 1,
      PixelFormat::Bgr24 => 3,
      PixelFormat::Bgra32 | PixelFormat::Bgr32 => 4,
    }
  }

  /// Whether this format carries a real (not filler) alpha byte.
  pub const fn has_alpha_channel(self) -> bool {
    matches!(self, PixelFormat::Bgra32)
  }
}

/// Compositing mode for writes onto a destination canvas (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositingMode {
  #[default]
  Replace,
  BlendWithSelf,
  BlendWithMatte,
}
