//! TIFF-directory walk for EXIF orientation (tag `0x0112`), shared between
//! the PNG `eXIf` chunk and the JPEG `APP1` segment (spec §4.8).

const ORIENTATION_TAG: u16 = 0x0112;

#[derive(Clone, Copy)]
enum ByteOrder {
  Little,
  Big,
}
impl ByteOrder {
  fn u16(self, b: &[u8]) -> u16 {
    match self {
      ByteOrder::Little => u16::from_le_bytes([b[0], b[1]]),
      ByteOrder::Big => u16::from_be_bytes([b[0], b[1]]),
    }
  }
  fn u32(self, b: &[u8]) -> u32 {
    match self {
      ByteOrder::Little => u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
      ByteOrder::Big => u32::from_be_bytes([b[0], b[1], b[2], b[3]]),
    }
  }
}

/// Parses a TIFF-structured EXIF payload and returns the orientation code
/// (`1..=8`), or `None` if absent or malformed (never an error: orientation
/// is advisory metadata).
pub fn parse_orientation(tiff: &[u8]) -> Option<u8> {
  if tiff.len() < 8 {
    return None;
  }
  let order = match &tiff[0..2] {
    b"II" => ByteOrder::Little,
    b"MM" => ByteOrder::Big,
    _ => return None,
  };
  if order.u16(&tiff[2..4]) != 42 {
    return None;
  }
  let ifd0_offset = order.u32(&tiff[4..8]) as usize;
  if ifd0_offset + 2 > tiff.len() {
    return None;
  }
  let entry_count = order.u16(&tiff[ifd0_offset..ifd0_offset + 2]) as usize;
  let entries_start = ifd0_offset + 2;
  for i in 0..entry_count {
    let entry_off = entries_start + i * 12;
    if entry_off + 12 > tiff.len() {
      break;
    }
    let entry = &tiff[entry_off..entry_off + 12];
    let tag = order.u16(&entry[0..2]);
    if tag == ORIENTATION_TAG {
      let value = order.u16(&entry[8..10]);
      if (1..=8).contains(&value) {
        return Some(value as u8);
      }
      return None;
    }
  }
  None
}
