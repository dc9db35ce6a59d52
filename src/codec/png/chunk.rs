//! Chunk iteration and CRC verification, adapted from hand-written
//! chunk-level PNG parsing (no external PNG crate).

#[derive(Debug, Copy, Clone)]
pub struct PngChunk<'b> {
  pub length: u32,
  pub chunk_type: ChunkType,
  pub chunk_data: &'b [u8],
  pub declared_crc: u32,
}
impl<'b> PngChunk<'b> {
  pub fn get_actual_crc(&self) -> u32 {
    chunk_crc32(self.chunk_type.0, self.chunk_data)
  }

  pub fn crc_is_valid(&self) -> bool {
    self.get_actual_crc() == self.declared_crc
  }
}

const fn make_crc_table() -> [u32; 256] {
  let mut n = 0_usize;
  let mut table = [0_u32; 256];
  while n < 256 {
    let mut c = n as u32;
    let mut k = 0;
    while k < 8 {
      c = if c & 1 != 0 { 0xedb88320 ^ (c >> 1) } else { c >> 1 };
      k += 1;
    }
    table[n] = c;
    n += 1;
  }
  table
}
const CRC_TABLE: [u32; 256] = make_crc_table();

/// CRC-32 over a chunk type plus its data, shared by decode (verification)
/// and encode (chunk assembly).
pub fn chunk_crc32(chunk_type: [u8; 4], data: &[u8]) -> u32 {
  let mut crc = u32::MAX;
  for b in chunk_type.iter().copied().chain(data.iter().copied()) {
    crc = CRC_TABLE[(crc ^ b as u32) as usize & 0xFF] ^ (crc >> 8);
  }
  crc ^ u32::MAX
}

/// Appends a complete length-prefixed, CRC-suffixed chunk to `out` (spec
/// §4.8 PNG encoder).
pub fn write_chunk(out: &mut Vec<u8>, chunk_type: [u8; 4], data: &[u8]) {
  out.extend_from_slice(&(data.len() as u32).to_be_bytes());
  out.extend_from_slice(&chunk_type);
  out.extend_from_slice(data);
  out.extend_from_slice(&chunk_crc32(chunk_type, data).to_be_bytes());
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct ChunkType(pub [u8; 4]);
impl ChunkType {
  pub const IHDR: Self = ChunkType(*b"IHDR");
  pub const PLTE: Self = ChunkType(*b"PLTE");
  pub const IDAT: Self = ChunkType(*b"IDAT");
  pub const IEND: Self = ChunkType(*b"IEND");
  pub const TRNS: Self = ChunkType(*b"tRNS");
  pub const GAMA: Self = ChunkType(*b"gAMA");
  pub const CHRM: Self = ChunkType(*b"cHRM");
  pub const SRGB: Self = ChunkType(*b"sRGB");
  pub const ICCP: Self = ChunkType(*b"iCCP");
  pub const EXIF: Self = ChunkType(*b"eXIf");
}
impl core::fmt::Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    let [a, b, c, d] = self.0;
    write!(f, "{}{}{}{}", a as char, b as char, c as char, d as char)
  }
}

pub struct PngChunkIter<'b> {
  bytes: &'b [u8],
}
impl<'b> PngChunkIter<'b> {
  pub fn from_png_bytes(bytes: &'b [u8]) -> Option<Self> {
    const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];
    if bytes.len() < 8 || bytes[..8] != PNG_SIGNATURE {
      None
    } else {
      Some(Self { bytes: &bytes[8..] })
    }
  }
}
impl<'b> Iterator for PngChunkIter<'b> {
  type Item = PngChunk<'b>;

  fn next(&mut self) -> Option<PngChunk<'b>> {
    if self.bytes.len() < 12 {
      return None;
    }
    let length = u32::from_be_bytes(self.bytes[0..4].try_into().unwrap());
    let chunk_type = ChunkType(self.bytes[4..8].try_into().unwrap());
    if self.bytes.len() < (length as usize) + 12 {
      return None;
    }
    let chunk_data = &self.bytes[8..(8 + length as usize)];
    let crc_off = 8 + length as usize;
    let declared_crc = u32::from_be_bytes(self.bytes[crc_off..crc_off + 4].try_into().unwrap());
    self.bytes = &self.bytes[crc_off + 4..];
    Some(PngChunk { length, chunk_type, chunk_data, declared_crc })
  }
}
