//! JPEG decode/encode (spec §4.8). No pack example implements raw JPEG
//! codecs by hand, so this wraps `jpeg-decoder`/`jpeg-encoder` rather than
//! hand-rolling a DCT and Huffman-coded entropy decoder; the engine's own
//! work stays confined to orientation, colour-space, and downscale-hint
//! plumbing around them.

use std::io::Write;

use jpeg::{Decoder as RawDecoder, PixelFormat as RawPixelFormat};

use crate::bitmap::ByteBitmap;
use crate::codec::exif;
use crate::codec::{
  ColorInfo, ColorSourceTag, DecodedFrame, Decoder, DownscaleHints, Encoder, EncoderHints, FrameInfo,
  Stage,
};
use crate::error::{EngineError, EngineResult};
use crate::pixel::PixelFormat;

/// Scans raw JPEG bytes for an `APP1` "Exif" segment and returns the
/// orientation tag, without involving the DCT decoder (spec §4.8, shared
/// TIFF walk with [`exif::parse_orientation`]).
fn find_exif_orientation(bytes: &[u8]) -> u8 {
  let mut i = 2usize; // past SOI
  while i + 4 <= bytes.len() {
    if bytes[i] != 0xFF {
      break;
    }
    let marker = bytes[i + 1];
    if marker == 0xD8 || marker == 0xD9 {
      i += 2;
      continue;
    }
    if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
      i += 2;
      continue;
    }
    if i + 4 > bytes.len() {
      break;
    }
    let seg_len = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
    if seg_len < 2 || i + 2 + seg_len > bytes.len() {
      break;
    }
    let payload = &bytes[i + 4..i + 2 + seg_len];
    if marker == 0xE1 && payload.len() > 6 && &payload[..6] == b"Exif\0\0" {
      if let Some(o) = exif::parse_orientation(&payload[6..]) {
        return o;
      }
    }
    if marker == 0xDA {
      break; // start of scan: no more markers to inspect
    }
    i += 2 + seg_len;
  }
  1
}

fn compute_downscale_target(width: u16, height: u16, hints: &DownscaleHints) -> Option<(u16, u16)> {
  let wider = hints.downscale_if_wider_than.is_some_and(|w| width as u32 > w);
  let taller = hints.or_if_taller_than.is_some_and(|h| height as u32 > h);
  if !(wider || taller) {
    return None;
  }
  let min_w = hints.downscaled_min_width.max(1).min(width as u32) as u16;
  let min_h = hints.downscaled_min_height.max(1).min(height as u32) as u16;
  Some((min_w, min_h))
}

pub struct JpegDecoder<'b> {
  bytes: &'b [u8],
  stage: Stage,
}
impl<'b> JpegDecoder<'b> {
  pub fn new(bytes: &'b [u8]) -> Self {
    Self { bytes, stage: Stage::NotStarted }
  }
}
impl<'b> Decoder for JpegDecoder<'b> {
  fn get_info(&mut self) -> EngineResult<FrameInfo> {
    let mut decoder = RawDecoder::new(self.bytes);
    decoder.read_info().map_err(|e| {
      self.stage = Stage::Failed;
      EngineError::ImageDecodingFailed(format!("reading JPEG header: {e}"))
    })?;
    let info = decoder.info().ok_or_else(|| {
      self.stage = Stage::Failed;
      EngineError::ImageDecodingFailed("JPEG header missing SOF segment".into())
    })?;
    self.stage = Stage::BeginRead;
    Ok(FrameInfo { width: info.width as u32, height: info.height as u32 })
  }

  fn read_frame(&mut self, hints: &DownscaleHints) -> EngineResult<DecodedFrame> {
    let mut decoder = RawDecoder::new(self.bytes);
    decoder.read_info().map_err(|e| {
      self.stage = Stage::Failed;
      warn!("JPEG decode failed: bad header: {e}");
      EngineError::ImageDecodingFailed(format!("reading JPEG header: {e}"))
    })?;
    let info = decoder
      .info()
      .ok_or_else(|| EngineError::ImageDecodingFailed("JPEG header missing SOF segment".into()))?;

    if let Some((w, h)) = compute_downscale_target(info.width, info.height, hints) {
      debug!("JPEG downscale during decode: {}x{} -> {}x{}", info.width, info.height, w, h);
      let _ = decoder.scale(w, h);
    }

    let pixels = decoder.decode().map_err(|e| {
      self.stage = Stage::Failed;
      warn!("JPEG decode failed: {e}");
      EngineError::ImageDecodingFailed(format!("decoding JPEG scan data: {e}"))
    })?;
    let decoded_info = decoder
      .info()
      .ok_or_else(|| EngineError::ImageDecodingFailed("JPEG decode produced no info".into()))?;
    let (width, height) = (decoded_info.width as u32, decoded_info.height as u32);

    let mut bitmap = ByteBitmap::new(width, height, PixelFormat::Bgr32)?;
    match decoded_info.pixel_format {
      RawPixelFormat::RGB24 => {
        for y in 0..height {
          let src = &pixels[y as usize * width as usize * 3..][..width as usize * 3];
          let dst = bitmap.row_mut(y);
          for x in 0..width as usize {
            dst[x * 4] = src[x * 3 + 2];
            dst[x * 4 + 1] = src[x * 3 + 1];
            dst[x * 4 + 2] = src[x * 3];
          }
        }
      }
      RawPixelFormat::L8 => {
        for y in 0..height {
          let src = &pixels[y as usize * width as usize..][..width as usize];
          let dst = bitmap.row_mut(y);
          for x in 0..width as usize {
            let v = src[x];
            dst[x * 4] = v;
            dst[x * 4 + 1] = v;
            dst[x * 4 + 2] = v;
          }
        }
      }
      RawPixelFormat::CMYK32 => {
        for y in 0..height {
          let src = &pixels[y as usize * width as usize * 4..][..width as usize * 4];
          let dst = bitmap.row_mut(y);
          for x in 0..width as usize {
            let (c, m, ye, k) =
              (src[x * 4] as u32, src[x * 4 + 1] as u32, src[x * 4 + 2] as u32, src[x * 4 + 3] as u32);
            let r = (c * k) / 255;
            let g = (m * k) / 255;
            let b = (ye * k) / 255;
            dst[x * 4] = b as u8;
            dst[x * 4 + 1] = g as u8;
            dst[x * 4 + 2] = r as u8;
          }
        }
      }
      other => {
        self.stage = Stage::Failed;
        return Err(EngineError::NotImplemented(
          match other {
            RawPixelFormat::L16 => "16-bit grayscale JPEG output",
            _ => "unrecognized JPEG pixel format",
          }
          .to_string(),
        ));
      }
    }

    self.stage = Stage::FinishRead;
    debug!("decoded JPEG {width}x{height} ({:?})", decoded_info.pixel_format);
    let exif_orientation = find_exif_orientation(self.bytes);
    Ok(DecodedFrame {
      bitmap,
      color_info: ColorInfo { source: ColorSourceTag::None, ..ColorInfo::default() },
      exif_orientation,
    })
  }
}

pub struct JpegEncoder<W: Write> {
  writer: W,
}
impl<W: Write> JpegEncoder<W> {
  pub fn new(writer: W) -> Self {
    Self { writer }
  }
}
impl<W: Write> Encoder for JpegEncoder<W> {
  fn write_frame(&mut self, bitmap: &ByteBitmap, hints: &EncoderHints) -> EngineResult<()> {
    debug!("encoding JPEG {}x{} quality {}", bitmap.width, bitmap.height, hints.jpeg_quality);
    let width = bitmap.width;
    let height = bitmap.height;
    let (color_type, channels) = match bitmap.format {
      PixelFormat::Gray8 => (jpeg_encoder::ColorType::Luma, 1usize),
      _ => (jpeg_encoder::ColorType::Bgr, 3usize),
    };

    let mut packed = Vec::with_capacity(width as usize * height as usize * channels);
    let src_bpp = bitmap.format.bytes_per_pixel();
    for y in 0..height {
      let row = bitmap.row(y);
      for x in 0..width as usize {
        let s = x * src_bpp;
        packed.extend_from_slice(&row[s..s + channels]);
      }
    }

    let mut encoder = jpeg_encoder::Encoder::new(&mut self.writer, hints.jpeg_quality);
    encoder.set_progressive(false);
    encoder.encode(&packed, width as u16, height as u16, color_type).map_err(|e| {
      warn!("JPEG encode failed: {e}");
      EngineError::ImageEncodingFailed(format!("{e}"))
    })
  }
}
