//! The end-to-end operation pipeline the CLI drives: decode, normalize
//! orientation, apply geometric/compositing operations, resample, encode
//! (spec §4.8 "decode wraps into a `DecodedFrame`" through §4.10).

use std::io::Cursor;

#[cfg(feature = "jpeg")]
use crate::codec::jpeg::{JpegDecoder, JpegEncoder};
#[cfg(feature = "png")]
use crate::codec::png::{PngDecoder, PngEncoder};
use crate::codec::{DecodedFrame, Decoder, DownscaleHints, Encoder, EncoderHints};
use crate::context::Context;
use crate::error::{EngineError, EngineResult};
use crate::filters::InterpolationFilter;
use crate::geometry;
use crate::pixel::CompositingMode;
use crate::record_error;
use crate::scale2d::{self, Rect, ScaleParams};
use crate::trim;
use crate::bitmap::ByteBitmap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
  Png,
  Jpeg,
}
impl ImageFormat {
  pub fn from_extension(ext: &str) -> EngineResult<Self> {
    match ext.to_ascii_lowercase().as_str() {
      "png" => Ok(Self::Png),
      "jpg" | "jpeg" => Ok(Self::Jpeg),
      other => Err(EngineError::InvalidArgument(format!("unrecognized image extension: .{other}"))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
  Horizontal,
  Vertical,
}

#[derive(Debug, Clone, Copy)]
pub struct RectSpec {
  pub x1: u32,
  pub y1: u32,
  pub x2: u32,
  pub y2: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct FillSpec {
  pub rect: RectSpec,
  pub color: [u8; 4],
}

/// Everything the CLI surface (SPEC_FULL §6) can ask the pipeline to do,
/// in the fixed order applied by [`run`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
  pub crop: Option<RectSpec>,
  pub trim: bool,
  pub trim_threshold: u32,
  pub fill: Option<FillSpec>,
  pub target_size: Option<(u32, u32)>,
  pub filter: InterpolationFilter,
  pub sharpen_percent: f32,
  pub flip: Option<Flip>,
  pub rotate_degrees: u16,
  pub matte: Option<[u8; 4]>,
  pub jpeg_quality: u8,
  pub png_zlib_level: i32,
  pub disable_png_alpha: bool,
}
impl Default for PipelineOptions {
  fn default() -> Self {
    Self {
      crop: None,
      trim: false,
      trim_threshold: 1,
      fill: None,
      target_size: None,
      filter: InterpolationFilter::Robidoux,
      sharpen_percent: 0.0,
      flip: None,
      rotate_degrees: 0,
      matte: None,
      jpeg_quality: 90,
      png_zlib_level: -1,
      disable_png_alpha: false,
    }
  }
}

fn decode(bytes: &[u8], format: ImageFormat) -> EngineResult<DecodedFrame> {
  let hints = DownscaleHints::default();
  match format {
    #[cfg(feature = "png")]
    ImageFormat::Png => PngDecoder::new(bytes).read_frame(&hints),
    #[cfg(not(feature = "png"))]
    ImageFormat::Png => Err(EngineError::NotImplemented("png decoding disabled at build time".to_string())),
    #[cfg(feature = "jpeg")]
    ImageFormat::Jpeg => JpegDecoder::new(bytes).read_frame(&hints),
    #[cfg(not(feature = "jpeg"))]
    ImageFormat::Jpeg => Err(EngineError::NotImplemented("jpeg decoding disabled at build time".to_string())),
  }
}

fn encode(bitmap: &ByteBitmap, format: ImageFormat, opts: &PipelineOptions) -> EngineResult<Vec<u8>> {
  let mut out = Cursor::new(Vec::new());
  match format {
    #[cfg(feature = "png")]
    ImageFormat::Png => {
      let hints = EncoderHints {
        disable_png_alpha: opts.disable_png_alpha,
        zlib_compression_level: opts.png_zlib_level,
        jpeg_quality: opts.jpeg_quality,
      };
      PngEncoder::new(&mut out).write_frame(bitmap, &hints)?;
    }
    #[cfg(not(feature = "png"))]
    ImageFormat::Png => return Err(EngineError::NotImplemented("png encoding disabled at build time".to_string())),
    #[cfg(feature = "jpeg")]
    ImageFormat::Jpeg => {
      let hints = EncoderHints {
        disable_png_alpha: opts.disable_png_alpha,
        zlib_compression_level: opts.png_zlib_level,
        jpeg_quality: opts.jpeg_quality,
      };
      JpegEncoder::new(&mut out).write_frame(bitmap, &hints)?;
    }
    #[cfg(not(feature = "jpeg"))]
    ImageFormat::Jpeg => return Err(EngineError::NotImplemented("jpeg encoding disabled at build time".to_string())),
  }
  Ok(out.into_inner())
}

fn crop(bitmap: &ByteBitmap, r: RectSpec) -> EngineResult<ByteBitmap> {
  if !(r.x1 < r.x2 && r.y1 < r.y2 && r.x2 <= bitmap.width && r.y2 <= bitmap.height) {
    return Err(EngineError::InvalidDimensions(format!(
      "crop ({},{})-({},{}) outside {}x{}",
      r.x1, r.y1, r.x2, r.y2, bitmap.width, bitmap.height
    )));
  }
  let mut out = ByteBitmap::new(r.x2 - r.x1, r.y2 - r.y1, bitmap.format)?;
  out.copy_rect_to_canvas(bitmap, r.x1, r.y1, r.x2 - r.x1, r.y2 - r.y1, 0, 0)?;
  Ok(out)
}

fn rotate(bitmap: ByteBitmap, degrees: u16) -> EngineResult<ByteBitmap> {
  match degrees % 360 {
    0 => Ok(bitmap),
    90 => geometry::rotate_90_cw(&bitmap),
    180 => geometry::rotate_180(&bitmap),
    270 => geometry::rotate_270_cw(&bitmap),
    other => Err(EngineError::InvalidArgument(format!("rotation must be 0/90/180/270, got {other}"))),
  }
}

/// Runs decode through encode for a single image, recording any failure
/// into `ctx`'s error state before returning it (spec §4.1 "deepest
/// detector records"). Operation order: EXIF normalization, trim, crop,
/// fill, scale, flip, rotate, encode.
pub fn run(
  ctx: &mut Context, input: &[u8], input_format: ImageFormat, output_format: ImageFormat,
  opts: &PipelineOptions,
) -> EngineResult<Vec<u8>> {
  let result = run_inner(input, input_format, output_format, opts);
  if let Err(ref e) = result {
    record_error!(ctx, clone_for_record(e));
  }
  result
}

/// [`EngineError`] does not derive `Clone` (its `Io` variant wraps
/// `std::io::Error`); recording still needs an owned copy, so this
/// re-describes the error as its message rather than cloning it.
fn clone_for_record(e: &EngineError) -> EngineError {
  EngineError::InvalidInternalState(format!("{e}"))
}

fn run_inner(
  input: &[u8], input_format: ImageFormat, output_format: ImageFormat, opts: &PipelineOptions,
) -> EngineResult<Vec<u8>> {
  let frame = decode(input, input_format)?;
  let mut bitmap = geometry::apply_orientation(&frame.bitmap, frame.exif_orientation)?;

  if opts.trim {
    let rect = trim::detect_content(&bitmap, opts.trim_threshold);
    bitmap = crop(&bitmap, RectSpec { x1: rect.x1, y1: rect.y1, x2: rect.x2, y2: rect.y2 })?;
  }

  if let Some(r) = opts.crop {
    bitmap = crop(&bitmap, r)?;
  }

  if let Some(fill) = opts.fill {
    bitmap.fill_rect(fill.rect.x1, fill.rect.y1, fill.rect.x2, fill.rect.y2, fill.color)?;
  }

  if let Some((w, h)) = opts.target_size {
    let mut dst = ByteBitmap::new(w, h, bitmap.format)?;
    if let Some(matte) = opts.matte {
      dst.compositing_mode = CompositingMode::BlendWithMatte;
      dst.matte = matte;
    }
    let params = ScaleParams { filter: opts.filter, sharpen_percent: opts.sharpen_percent, ..ScaleParams::default() };
    scale2d::scale2d(&bitmap, &mut dst, Rect { x: 0, y: 0, w, h }, params)?;
    bitmap = dst;
  }

  if let Some(flip) = opts.flip {
    match flip {
      Flip::Horizontal => bitmap.flip_horizontal(),
      Flip::Vertical => bitmap.flip_vertical(),
    }
  }

  if opts.rotate_degrees != 0 {
    bitmap = rotate(bitmap, opts.rotate_degrees)?;
  }

  encode(&bitmap, output_format, opts)
}
