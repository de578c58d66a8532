use bytemuck::{Pod, Zeroable};
use log::{debug, warn};

use super::{chunk_crc, ChunkRef, PngChunkTy};
use crate::{PngError, PngResult, U32BE};

/// The kinds of color that a PNG header can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// We can't measure these, see [`PngColorType::channel_count`].
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of channels in this type of color.
  ///
  /// Indexed color gives `None`, that mode isn't supported here.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> Option<u64> {
    match self {
      Self::Y => Some(1),
      Self::RGB => Some(3),
      Self::Index => None,
      Self::YA => Some(2),
      Self::RGBA => Some(4),
    }
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Y,
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      4 => PngColorType::YA,
      6 => PngColorType::RGBA,
      _ => return Err(PngError::UnsupportedColorType(value)),
    })
  }
}

/// The exact 13 content bytes of an `IHDR` chunk.
///
/// Everything has an alignment of 1, so this can be read from (and written
/// back to) any position in the file bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub(crate) struct IhdrFields {
  pub(crate) width: U32BE,
  pub(crate) height: U32BE,
  pub(crate) bit_depth: u8,
  pub(crate) color_type: u8,
  pub(crate) compression_method: u8,
  pub(crate) filter_method: u8,
  pub(crate) interlace_method: u8,
}
impl IhdrFields {
  pub(crate) const SIZE: usize = core::mem::size_of::<Self>();

  /// Reads the fields from the content of an `IHDR` chunk.
  pub(crate) fn read(raw: &[u8], chunk: &ChunkRef) -> PngResult<Self> {
    let content = chunk.content(raw)?;
    if content.len() != Self::SIZE {
      return Err(PngError::MalformedChunk { offset: chunk.length_offset });
    }
    Ok(bytemuck::pod_read_unaligned(content))
  }
}

/// Image Header
///
/// This is the decoded content of the `IHDR` chunk, along with the CRC that
/// was stored after it in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeaderRecord {
  /// width in pixels
  pub width: u32,
  /// height in pixels, as declared
  pub height: u32,
  /// bits per channel
  pub bit_depth: u8,
  /// raw color type byte
  pub color_type: u8,
  /// always 0 in a valid PNG
  pub compression_method: u8,
  /// always 0 in a valid PNG
  pub filter_method: u8,
  /// 0 for none, 1 for Adam7
  pub interlaced: u8,
  /// The CRC stored in the file after the header content.
  pub declared_checksum: u32,
}
impl HeaderRecord {
  #[inline]
  #[must_use]
  const fn fields(&self) -> IhdrFields {
    IhdrFields {
      width: U32BE::from_u32(self.width),
      height: U32BE::from_u32(self.height),
      bit_depth: self.bit_depth,
      color_type: self.color_type,
      compression_method: self.compression_method,
      filter_method: self.filter_method,
      interlace_method: self.interlaced,
    }
  }

  /// The CRC that these header values should have.
  #[inline]
  #[must_use]
  pub fn actual_checksum(&self) -> u32 {
    chunk_crc(PngChunkTy::IHDR, bytemuck::bytes_of(&self.fields()))
  }

  /// If the stored CRC agrees with the header values.
  ///
  /// A header that was hand-edited without fixing the CRC will fail this, but
  /// the analysis doesn't care either way.
  #[inline]
  #[must_use]
  pub fn checksum_is_valid(&self) -> bool {
    self.actual_checksum() == self.declared_checksum
  }

  /// The color type, if it's one PNG defines.
  #[inline]
  pub fn color(&self) -> PngResult<PngColorType> {
    PngColorType::try_from(self.color_type)
  }
}

/// Decodes the header record from the `IHDR` chunk given.
///
/// Only the color type is checked. Indexed color is rejected with
/// [`PngError::UnsupportedColorType`], every other value (including odd bit
/// depths) is passed along as-is.
pub fn decode_header(raw: &[u8], chunk: &ChunkRef) -> PngResult<HeaderRecord> {
  let fields = IhdrFields::read(raw, chunk)?;
  if fields.color_type == PngColorType::Index as u8 {
    return Err(PngError::UnsupportedColorType(fields.color_type));
  }
  let header = HeaderRecord {
    width: fields.width.to_u32(),
    height: fields.height.to_u32(),
    bit_depth: fields.bit_depth,
    color_type: fields.color_type,
    compression_method: fields.compression_method,
    filter_method: fields.filter_method,
    interlaced: fields.interlace_method,
    declared_checksum: chunk.declared_crc(raw)?,
  };
  debug!("{header:?}");
  if header.interlaced != 0 {
    warn!("header is marked interlaced, measured height assumes a single pass");
  }
  Ok(header)
}

/// Bytes per decompressed scanline, including the leading filter byte.
///
/// This is `floor(width * bits_per_pixel / 8) + 1`. Note that it's a *floor*:
/// when a line's bits don't fill a whole number of bytes the partial byte
/// isn't counted, which undercounts compared to a real decoder. That's how
/// the measurement has always been made and it's kept that way.
pub fn scanline_length(header: &HeaderRecord) -> PngResult<u64> {
  let channels = header
    .color()?
    .channel_count()
    .ok_or(PngError::UnsupportedColorType(header.color_type))?;
  let bits_per_pixel = channels * u64::from(header.bit_depth);
  let bits_per_scanline = u64::from(header.width) * bits_per_pixel;
  Ok(bits_per_scanline / 8 + 1)
}
