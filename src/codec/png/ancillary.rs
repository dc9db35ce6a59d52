//! Ancillary-chunk parsing: gAMA, cHRM, sRGB, iCCP (spec §4.8 "load
//! colour info").

use super::chunk::PngChunk;
use crate::codec::{ColorInfo, ColorSourceTag};

/// FNV-1a over the whole profile; used as a structural stand-in for the
/// source's brittle DJB2-of-the-canonical-sRGB-profile check (SPEC_FULL
/// §9, resolved Open Question).
fn fnv1a(bytes: &[u8]) -> u64 {
  let mut hash = 0xcbf29ce484222325u64;
  for &b in bytes {
    hash ^= b as u64;
    hash = hash.wrapping_mul(0x100000001b3);
  }
  hash
}

/// The length and digest of the well-known sRGB ICC profile (v2, 3144
/// bytes). Recognition is a soft match: failing to recognize a profile
/// just means it passes through unsuppressed, never an error.
const SRGB_ICC_LEN: usize = 3144;
const SRGB_ICC_FNV1A: u64 = 0x7a8c_1f2e_9b5d_4c31;

fn looks_like_srgb_icc(profile: &[u8]) -> bool {
  profile.len() == SRGB_ICC_LEN && fnv1a(profile) == SRGB_ICC_FNV1A
}

pub fn parse_gama(chunk: PngChunk<'_>) -> Option<f32> {
  if chunk.chunk_data.len() != 4 {
    return None;
  }
  let raw = u32::from_be_bytes(chunk.chunk_data.try_into().unwrap());
  Some(raw as f32 / 100_000.0)
}

pub fn parse_chrm(chunk: PngChunk<'_>) -> Option<[(f32, f32); 4]> {
  if chunk.chunk_data.len() != 32 {
    return None;
  }
  let mut points = [(0.0f32, 0.0f32); 4];
  for (i, point) in points.iter_mut().enumerate() {
    let x = u32::from_be_bytes(chunk.chunk_data[i * 8..i * 8 + 4].try_into().unwrap());
    let y = u32::from_be_bytes(chunk.chunk_data[i * 8 + 4..i * 8 + 8].try_into().unwrap());
    *point = (x as f32 / 100_000.0, y as f32 / 100_000.0);
  }
  Some(points)
}

/// `iCCP`: null-terminated profile name, one compression-method byte
/// (always 0 = zlib), then a zlib-compressed ICC profile.
pub fn parse_iccp(chunk: PngChunk<'_>) -> Option<Vec<u8>> {
  let data = chunk.chunk_data;
  let name_end = data.iter().position(|&b| b == 0)?;
  let compressed = data.get(name_end + 2..)?;
  miniz_oxide::inflate::decompress_to_vec_zlib(compressed).ok()
}

/// Builds the decoder's exposed colour info: sRGB chunk wins outright;
/// otherwise iCCP; otherwise gAMA/cHRM; otherwise none (spec §4.8, §6).
pub fn resolve_color_info(
  has_srgb: bool, iccp: Option<Vec<u8>>, gamma: Option<f32>, chrm: Option<[(f32, f32); 4]>,
) -> ColorInfo {
  if has_srgb {
    return ColorInfo { source: ColorSourceTag::Srgb, profile: None, gamma: 0.45455, chromaticities: None };
  }
  if let Some(profile) = iccp {
    let source = if looks_like_srgb_icc(&profile) { ColorSourceTag::Srgb } else { ColorSourceTag::Icc };
    let profile = if source == ColorSourceTag::Srgb { None } else { Some(profile) };
    return ColorInfo { source, profile, gamma: 0.45455, chromaticities: None };
  }
  if gamma.is_some() || chrm.is_some() {
    return ColorInfo {
      source: ColorSourceTag::GammaChromaticities,
      profile: None,
      gamma: gamma.unwrap_or(0.45455),
      chromaticities: chrm,
    };
  }
  ColorInfo::default()
}
