//! PNG decode/encode (spec §4.8). Chunk framing and CRC are hand-rolled
//! (adapted from a from-scratch PNG reader); the zlib layer is delegated to
//! `miniz_oxide` rather than reimplementing inflate/deflate and Huffman
//! tables by hand.

pub mod ancillary;
pub mod chunk;
pub mod header;

use chunk::{write_chunk, ChunkType, PngChunkIter};
use header::{PngColorType, PngHeader};

use crate::bitmap::ByteBitmap;
use crate::codec::{DecodedFrame, Decoder, DownscaleHints, Encoder, EncoderHints, FrameInfo, Stage};
use crate::codec::exif;
use crate::error::{EngineError, EngineResult};
use crate::pixel::PixelFormat;

pub struct PngDecoder<'b> {
  bytes: &'b [u8],
  header: Option<PngHeader>,
  stage: Stage,
}
impl<'b> PngDecoder<'b> {
  pub fn new(bytes: &'b [u8]) -> Self {
    Self { bytes, header: None, stage: Stage::NotStarted }
  }

  fn parse_header(&self) -> EngineResult<PngHeader> {
    let mut chunks =
      PngChunkIter::from_png_bytes(self.bytes).ok_or_else(|| {
        EngineError::ImageDecodingFailed("not a PNG (bad signature)".into())
      })?;
    let ihdr = chunks
      .find(|c| c.chunk_type == ChunkType::IHDR)
      .ok_or_else(|| EngineError::ImageDecodingFailed("missing IHDR".into()))?;
    if !ihdr.crc_is_valid() {
      return Err(EngineError::ImageDecodingFailed("CRC mismatch in IHDR chunk".into()));
    }
    PngHeader::from_ihdr_chunk(ihdr)
      .ok_or_else(|| EngineError::ImageDecodingFailed("malformed IHDR".into()))
  }
}
impl<'b> Decoder for PngDecoder<'b> {
  fn get_info(&mut self) -> EngineResult<FrameInfo> {
    let header = match self.header {
      Some(h) => h,
      None => {
        let h = self.parse_header().map_err(|e| {
          self.stage = Stage::Failed;
          e
        })?;
        self.header = Some(h);
        h
      }
    };
    self.stage = Stage::BeginRead;
    Ok(FrameInfo { width: header.width, height: header.height })
  }

  fn read_frame(&mut self, _hints: &DownscaleHints) -> EngineResult<DecodedFrame> {
    let header = match self.header {
      Some(h) => h,
      None => self.get_info().map(|_| self.header.unwrap())?,
    };
    if header.is_interlaced {
      self.stage = Stage::Failed;
      return Err(EngineError::NotImplemented("interlaced PNG decoding".to_string()));
    }

    let mut idat = Vec::new();
    let mut palette: Option<Vec<u8>> = None;
    let mut trns: Option<Vec<u8>> = None;
    let mut has_srgb = false;
    let mut iccp = None;
    let mut gamma = None;
    let mut chrm = None;
    let mut exif_orientation = 1u8;

    let chunks = PngChunkIter::from_png_bytes(self.bytes)
      .ok_or_else(|| EngineError::ImageDecodingFailed("not a PNG (bad signature)".into()))?;
    for c in chunks {
      if !c.crc_is_valid() {
        self.stage = Stage::Failed;
        warn!("PNG decode failed: CRC mismatch in {:?} chunk", c.chunk_type);
        return Err(EngineError::ImageDecodingFailed(format!("CRC mismatch in {:?} chunk", c.chunk_type)));
      }
      match c.chunk_type {
        ChunkType::IDAT => idat.extend_from_slice(c.chunk_data),
        ChunkType::PLTE => palette = Some(c.chunk_data.to_vec()),
        ChunkType::TRNS => trns = Some(c.chunk_data.to_vec()),
        ChunkType::SRGB => has_srgb = true,
        ChunkType::ICCP => iccp = ancillary::parse_iccp(c),
        ChunkType::GAMA => gamma = ancillary::parse_gama(c),
        ChunkType::CHRM => chrm = ancillary::parse_chrm(c),
        ChunkType::EXIF => {
          if let Some(o) = exif::parse_orientation(c.chunk_data) {
            exif_orientation = o;
          }
        }
        ChunkType::IEND => break,
        _ => {}
      }
    }

    if idat.is_empty() {
      self.stage = Stage::Failed;
      warn!("PNG decode failed: no IDAT data");
      return Err(EngineError::ImageDecodingFailed("no IDAT data".into()));
    }
    let mut decompressed = miniz_oxide::inflate::decompress_to_vec_zlib(&idat).map_err(|e| {
      self.stage = Stage::Failed;
      warn!("PNG decode failed: zlib inflate error: {e:?}");
      EngineError::ImageDecodingFailed(format!("zlib inflate failed: {e:?}"))
    })?;

    let bitmap = decode_pixels(&header, &mut decompressed, palette.as_deref(), trns.as_deref()).map_err(|e| {
      self.stage = Stage::Failed;
      e
    })?;
    let color_info = ancillary::resolve_color_info(has_srgb, iccp, gamma, chrm);
    self.stage = Stage::FinishRead;
    debug!("decoded PNG {}x{} ({:?})", header.width, header.height, header.color_type);
    Ok(DecodedFrame { bitmap, color_info, exif_orientation })
  }
}

fn expand_bit_depth_row(data: &[u8], bit_depth: u8, width: usize) -> Vec<u8> {
  match bit_depth {
    1 => data.iter().flat_map(|&b| bitfrob::u8_bit_split_1x8_rev(b)).take(width).collect(),
    2 => data.iter().flat_map(|&b| bitfrob::u8_bit_split_2x4_rev(b)).take(width).collect(),
    4 => data.iter().flat_map(|&b| bitfrob::u8_bit_split_4x2_rev(b)).take(width).collect(),
    8 => data[..width.min(data.len())].to_vec(),
    _ => unreachable!("validated in PngHeader::from_ihdr_chunk"),
  }
}

const fn gray_scale_factor(bit_depth: u8) -> u8 {
  match bit_depth {
    1 => 255,
    2 => 85,
    4 => 17,
    _ => 1,
  }
}

/// Unfilters `decompressed` in place and assembles the final BGRA32/BGR32
/// canvas. No interlacing support: callers must reject that earlier.
fn decode_pixels(
  header: &PngHeader, decompressed: &mut [u8], palette: Option<&[u8]>, trns: Option<&[u8]>,
) -> EngineResult<ByteBitmap> {
  let bytes_per_filterline = header.bytes_per_filterline();
  let needed = bytes_per_filterline * header.height as usize;
  if decompressed.len() < needed {
    return Err(EngineError::ImageDecodingFailed("truncated PNG scanline data".into()));
  }
  let rows = &mut decompressed[..needed];
  let row_iter = rows.chunks_exact_mut(bytes_per_filterline);
  match (header.color_type, header.bit_depth) {
    (PngColorType::Gray, 16) => png_filters::unfilter_lines::<2>(row_iter),
    (PngColorType::Gray, 8 | 4 | 2 | 1) => png_filters::unfilter_lines::<1>(row_iter),
    (PngColorType::Rgb, 8) => png_filters::unfilter_lines::<3>(row_iter),
    (PngColorType::Rgb, 16) => png_filters::unfilter_lines::<6>(row_iter),
    (PngColorType::Index, 8 | 4 | 2 | 1) => png_filters::unfilter_lines::<1>(row_iter),
    (PngColorType::GrayAlpha, 8) => png_filters::unfilter_lines::<2>(row_iter),
    (PngColorType::GrayAlpha, 16) => png_filters::unfilter_lines::<4>(row_iter),
    (PngColorType::Rgba, 8) => png_filters::unfilter_lines::<4>(row_iter),
    (PngColorType::Rgba, 16) => png_filters::unfilter_lines::<8>(row_iter),
    _ => return Err(EngineError::ImageDecodingFailed("unsupported bit depth/colour type".into())),
  };

  let has_alpha = header.color_type.has_alpha()
    || (header.color_type == PngColorType::Index && trns.is_some());
  let out_format = if has_alpha { PixelFormat::Bgra32 } else { PixelFormat::Bgr32 };
  let mut out = ByteBitmap::new(header.width, header.height, out_format)?;
  let width = header.width as usize;
  let out_bpp = out_format.bytes_per_pixel();

  for y in 0..header.height as usize {
    let line = &rows[y * bytes_per_filterline..(y + 1) * bytes_per_filterline];
    let (_filter_byte, data) = line.split_first().expect("filterline carries a filter byte");
    let dst_row = out.row_mut(y as u32);
    match header.color_type {
      PngColorType::Gray => {
        let stride = if header.bit_depth == 16 { 2 } else { 1 };
        let scale = gray_scale_factor(header.bit_depth);
        let samples =
          if header.bit_depth == 16 { Vec::new() } else { expand_bit_depth_row(data, header.bit_depth, width) };
        for x in 0..width {
          let v = if header.bit_depth == 16 { data[x * stride] } else { samples[x].wrapping_mul(scale) };
          let o = x * out_bpp;
          dst_row[o] = v;
          dst_row[o + 1] = v;
          dst_row[o + 2] = v;
        }
      }
      PngColorType::Index => {
        let palette = palette
          .ok_or_else(|| EngineError::ImageDecodingFailed("indexed PNG missing PLTE".into()))?;
        let indices = expand_bit_depth_row(data, header.bit_depth, width);
        for x in 0..width {
          let idx = indices[x] as usize;
          let p = idx * 3;
          let o = x * out_bpp;
          if p + 2 >= palette.len() {
            return Err(EngineError::ImageDecodingFailed("palette index out of range".into()));
          }
          dst_row[o] = palette[p + 2];
          dst_row[o + 1] = palette[p + 1];
          dst_row[o + 2] = palette[p];
          if has_alpha {
            dst_row[o + 3] = trns.and_then(|t| t.get(idx)).copied().unwrap_or(0xFF);
          }
        }
      }
      PngColorType::GrayAlpha => {
        // channel order in the filterline is gray, alpha; each channel is
        // one byte (depth 8) or two big-endian bytes (depth 16).
        let stride = if header.bit_depth == 16 { 2 } else { 1 };
        for x in 0..width {
          let base = x * 2 * stride;
          let v = data[base];
          let a = data[base + stride];
          let o = x * out_bpp;
          dst_row[o] = v;
          dst_row[o + 1] = v;
          dst_row[o + 2] = v;
          dst_row[o + 3] = a;
        }
      }
      PngColorType::Rgb => {
        let stride = if header.bit_depth == 16 { 2 } else { 1 };
        for x in 0..width {
          let base = x * 3 * stride;
          let o = x * out_bpp;
          dst_row[o] = data[base + 2 * stride];
          dst_row[o + 1] = data[base + stride];
          dst_row[o + 2] = data[base];
        }
      }
      PngColorType::Rgba => {
        let stride = if header.bit_depth == 16 { 2 } else { 1 };
        for x in 0..width {
          let base = x * 4 * stride;
          let o = x * out_bpp;
          dst_row[o] = data[base + 2 * stride];
          dst_row[o + 1] = data[base + stride];
          dst_row[o + 2] = data[base];
          dst_row[o + 3] = data[base + 3 * stride];
        }
      }
    }
  }
  Ok(out)
}

pub struct PngEncoder<W: std::io::Write> {
  writer: W,
}
impl<W: std::io::Write> PngEncoder<W> {
  pub fn new(writer: W) -> Self {
    Self { writer }
  }

  fn resolve_level(level: i32) -> u8 {
    if (0..=9).contains(&level) {
      level as u8
    } else {
      9
    }
  }
}
impl<W: std::io::Write> Encoder for PngEncoder<W> {
  fn write_frame(&mut self, bitmap: &ByteBitmap, hints: &EncoderHints) -> EngineResult<()> {
    debug!("encoding PNG {}x{} ({:?})", bitmap.width, bitmap.height, bitmap.format);
    let emit_alpha = bitmap.format.has_alpha_channel() && !hints.disable_png_alpha;
    let (color_type, out_channels): (PngColorType, usize) = match bitmap.format {
      PixelFormat::Gray8 => (PngColorType::Gray, 1),
      _ if emit_alpha => (PngColorType::Rgba, 4),
      _ => (PngColorType::Rgb, 3),
    };

    let mut raw = Vec::with_capacity((1 + bitmap.width as usize * out_channels) * bitmap.height as usize);
    for y in 0..bitmap.height {
      raw.push(0u8);
      let row = bitmap.row(y);
      let src_bpp = bitmap.format.bytes_per_pixel();
      for x in 0..bitmap.width as usize {
        let s = x * src_bpp;
        match color_type {
          PngColorType::Gray => raw.push(row[s]),
          PngColorType::Rgb => {
            raw.push(row[s + 2]);
            raw.push(row[s + 1]);
            raw.push(row[s]);
          }
          PngColorType::Rgba => {
            raw.push(row[s + 2]);
            raw.push(row[s + 1]);
            raw.push(row[s]);
            raw.push(if src_bpp == 4 { row[s + 3] } else { 0xFF });
          }
          PngColorType::Index | PngColorType::GrayAlpha => unreachable!("encoder never selects these"),
        }
      }
    }

    let level = Self::resolve_level(hints.zlib_compression_level);
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, level);

    let mut out = Vec::new();
    out.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);
    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&bitmap.width.to_be_bytes());
    ihdr.extend_from_slice(&bitmap.height.to_be_bytes());
    ihdr.push(8);
    ihdr.push(color_type as u8);
    ihdr.push(0);
    ihdr.push(0);
    ihdr.push(0);
    write_chunk(&mut out, *b"IHDR", &ihdr);
    write_chunk(&mut out, *b"sRGB", &[0]);
    write_chunk(&mut out, *b"IDAT", &compressed);
    write_chunk(&mut out, *b"IEND", &[]);

    self.writer.write_all(&out).map_err(|e| {
      warn!("PNG encode failed: {e}");
      EngineError::ImageEncodingFailed(format!("writing PNG bytes: {e}"))
    })?;
    debug!("encoded PNG ({} bytes)", out.len());
    Ok(())
  }
}
