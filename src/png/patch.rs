use alloc::vec::Vec;

use log::debug;

use super::{chunk_crc, ihdr::IhdrFields, ChunkRef};
use crate::{PngError, PngResult, U32BE};

/// A copy of PNG bytes with a corrected header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatchedPng(Vec<u8>);
impl PatchedPng {
  /// The patched file bytes.
  #[inline]
  #[must_use]
  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }
  /// Unwraps the patched file bytes.
  #[inline]
  #[must_use]
  pub fn into_inner(self) -> Vec<u8> {
    self.0
  }
}
impl AsRef<[u8]> for PatchedPng {
  #[inline]
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

/// Copies `raw` and sets a new height in the copy's header.
///
/// See [`patch_height_in_place`].
pub fn patch_height(
  raw: &[u8], header_chunk: &ChunkRef, corrected_height: u32,
) -> PngResult<PatchedPng> {
  let mut buf = raw.to_vec();
  patch_height_in_place(&mut buf, header_chunk, corrected_height)?;
  Ok(PatchedPng(buf))
}

/// Overwrites the height of the `IHDR` at `header_chunk`, then fixes its CRC.
///
/// Only those 8 bytes change. The chunk keeps its size so nothing else in the
/// file moves. The new height isn't checked against anything, callers
/// normally get it from a height measurement that didn't match.
pub fn patch_height_in_place(
  buf: &mut [u8], header_chunk: &ChunkRef, corrected_height: u32,
) -> PngResult<()> {
  let mut fields = IhdrFields::read(buf, header_chunk)?;
  fields.height = U32BE::from_u32(corrected_height);
  let new_crc = chunk_crc(header_chunk.name, bytemuck::bytes_of(&fields));

  let malformed = PngError::MalformedChunk { offset: header_chunk.length_offset };
  buf
    .get_mut(header_chunk.content_offset..header_chunk.crc_offset)
    .ok_or(malformed)?
    .copy_from_slice(bytemuck::bytes_of(&fields));
  buf
    .get_mut(header_chunk.crc_offset..header_chunk.end_offset())
    .ok_or(malformed)?
    .copy_from_slice(&new_crc.to_be_bytes());
  debug!("patched height to {corrected_height:#x}, new IHDR crc {new_crc:#010x}");
  Ok(())
}
