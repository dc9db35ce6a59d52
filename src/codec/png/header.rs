use super::chunk::{ChunkType, PngChunk};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PngColorType {
  Gray = 0,
  Rgb = 2,
  Index = 3,
  GrayAlpha = 4,
  Rgba = 6,
}
impl PngColorType {
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Gray | Self::Index => 1,
      Self::GrayAlpha => 2,
      Self::Rgb => 3,
      Self::Rgba => 4,
    }
  }
  pub const fn has_alpha(self) -> bool {
    matches!(self, Self::GrayAlpha | Self::Rgba)
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = ();
  fn try_from(value: u8) -> Result<Self, ()> {
    Ok(match value {
      0 => Self::Gray,
      2 => Self::Rgb,
      3 => Self::Index,
      4 => Self::GrayAlpha,
      6 => Self::Rgba,
      _ => return Err(()),
    })
  }
}

#[derive(Debug, Clone, Copy)]
pub struct PngHeader {
  pub width: u32,
  pub height: u32,
  pub bit_depth: u8,
  pub color_type: PngColorType,
  pub is_interlaced: bool,
}
impl PngHeader {
  pub fn from_ihdr_chunk(chunk: PngChunk<'_>) -> Option<Self> {
    if chunk.chunk_type != ChunkType::IHDR || chunk.length != 13 {
      return None;
    }
    let d = chunk.chunk_data;
    let width = u32::from_be_bytes(d[0..4].try_into().unwrap());
    let height = u32::from_be_bytes(d[4..8].try_into().unwrap());
    let bit_depth = d[8];
    let color_type = PngColorType::try_from(d[9]).ok()?;
    let valid_depth = match color_type {
      PngColorType::Gray => [1, 2, 4, 8, 16].contains(&bit_depth),
      PngColorType::Rgb | PngColorType::GrayAlpha | PngColorType::Rgba => {
        [8, 16].contains(&bit_depth)
      }
      PngColorType::Index => [1, 2, 4, 8].contains(&bit_depth),
    };
    if !valid_depth || width == 0 || height == 0 {
      return None;
    }
    let is_interlaced = match d[12] {
      0 => false,
      1 => true,
      _ => return None,
    };
    Some(Self { width, height, bit_depth, color_type, is_interlaced })
  }

  pub const fn bits_per_pixel(&self) -> usize {
    self.bit_depth as usize * self.color_type.channel_count()
  }

  pub const fn bytes_per_filterline(&self) -> usize {
    1 + (self.bits_per_pixel() * self.width as usize + 7) / 8
  }
}
