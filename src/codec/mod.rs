//! The codec interface (spec §4.8): a uniform decoder/encoder contract
//! over JPEG and PNG, EXIF orientation, and ICC pass-through.

pub mod exif;
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png")]
pub mod png;

use crate::bitmap::ByteBitmap;
use crate::error::EngineResult;

/// Decoder/encoder lifecycle (spec §4.8). `Failed` is reachable from any
/// other state; callers observe it rather than panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Null,
  NotStarted,
  BeginRead,
  FinishRead,
  Failed,
}

/// Decoder hints (spec §3 "Downscale Hints", §6).
#[derive(Debug, Clone, Copy)]
pub struct DownscaleHints {
  pub downscale_if_wider_than: Option<u32>,
  pub or_if_taller_than: Option<u32>,
  pub downscaled_min_width: u32,
  pub downscaled_min_height: u32,
  pub scale_luma_spatially: bool,
  pub gamma_correct_for_srgb_during_spatial_luma_scaling: bool,
  /// Resolved Open Question (SPEC_FULL §9): whether a mid-stream JPEG EOF
  /// is tolerated via a synthesized `0xFFD9` marker.
  pub jpeg_allow_synthetic_eoi: bool,
}
impl Default for DownscaleHints {
  fn default() -> Self {
    Self {
      downscale_if_wider_than: None,
      or_if_taller_than: None,
      downscaled_min_width: 0,
      downscaled_min_height: 0,
      scale_luma_spatially: false,
      gamma_correct_for_srgb_during_spatial_luma_scaling: false,
      jpeg_allow_synthetic_eoi: true,
    }
  }
}

/// Encoder hints (spec §6).
#[derive(Debug, Clone, Copy)]
pub struct EncoderHints {
  pub disable_png_alpha: bool,
  /// `-1..=9`; `-1` means "library default" (spec maps this to best
  /// compression, matching `Z_BEST_COMPRESSION`).
  pub zlib_compression_level: i32,
  pub jpeg_quality: u8,
}
impl Default for EncoderHints {
  fn default() -> Self {
    Self { disable_png_alpha: false, zlib_compression_level: -1, jpeg_quality: 90 }
  }
}

/// Where color info came from (spec §6 "Colour info exposed by
/// decoders").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSourceTag {
  None,
  Icc,
  IccGray,
  GammaChromaticities,
  Srgb,
}

#[derive(Debug, Clone)]
pub struct ColorInfo {
  pub source: ColorSourceTag,
  pub profile: Option<Vec<u8>>,
  pub gamma: f32,
  pub chromaticities: Option<[(f32, f32); 4]>,
}
impl Default for ColorInfo {
  fn default() -> Self {
    Self { source: ColorSourceTag::None, profile: None, gamma: 0.45455, chromaticities: None }
  }
}

#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
  pub width: u32,
  pub height: u32,
}

/// A decoded frame plus the metadata the core needs to use it (spec §4.8
/// `read_frame`): the canvas in BGRA32/BGR32, its color info, and the
/// EXIF orientation code (1 when absent).
pub struct DecodedFrame {
  pub bitmap: ByteBitmap,
  pub color_info: ColorInfo,
  pub exif_orientation: u8,
}

pub trait Decoder {
  fn get_info(&mut self) -> EngineResult<FrameInfo>;
  fn read_frame(&mut self, hints: &DownscaleHints) -> EngineResult<DecodedFrame>;
}

pub trait Encoder {
  fn write_frame(&mut self, bitmap: &ByteBitmap, hints: &EncoderHints) -> EngineResult<()>;
}
