use core::iter::FusedIterator;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use log::{debug, trace};

use super::{chunk_crc, PNG_SIGNATURE};
use crate::{PngError, PngResult};

/// The four byte name of a PNG chunk.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PngChunkTy(pub [u8; 4]);
impl PngChunkTy {
  /// Image Header
  pub const IHDR: Self = Self(*b"IHDR");
  /// Image Data
  pub const IDAT: Self = Self(*b"IDAT");
  /// Image End
  pub const IEND: Self = Self(*b"IEND");
}
impl core::fmt::Debug for PngChunkTy {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    core::fmt::Debug::fmt(core::str::from_utf8(self.0.as_slice()).unwrap_or("?"), f)
  }
}
impl core::fmt::Display for PngChunkTy {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    // non-ascii names still print something, they're just not pretty
    for ch in self.0.iter().copied().map(|u| u as char) {
      core::fmt::Write::write_char(f, ch)?;
    }
    Ok(())
  }
}

/// Where a single chunk lives within the PNG bytes.
///
/// All offsets are absolute positions in the full byte slice that was
/// scanned (signature included). A `ChunkRef` produced by [`ChunkScanner`] is
/// always fully in bounds for the slice it was scanned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkRef {
  /// Offset of the 4-byte big-endian length field.
  pub length_offset: usize,
  /// Number of content bytes, as declared by the length field.
  pub content_length: u32,
  /// The chunk's name.
  pub name: PngChunkTy,
  /// Offset of the first content byte.
  pub content_offset: usize,
  /// Offset of the 4-byte CRC that trails the content.
  pub crc_offset: usize,
}
impl ChunkRef {
  /// Offset just past this chunk's CRC, which is where the next chunk starts.
  #[inline]
  #[must_use]
  pub const fn end_offset(&self) -> usize {
    self.crc_offset + 4
  }

  /// The content bytes of this chunk.
  #[inline]
  pub fn content<'b>(&self, raw: &'b [u8]) -> PngResult<&'b [u8]> {
    raw
      .get(self.content_offset..self.crc_offset)
      .ok_or(PngError::MalformedChunk { offset: self.length_offset })
  }

  /// The CRC stored in the file after this chunk's content.
  #[inline]
  pub fn declared_crc(&self, raw: &[u8]) -> PngResult<u32> {
    raw
      .get(self.crc_offset..self.end_offset())
      .and_then(|bytes| bytes.try_into().ok())
      .map(u32::from_be_bytes)
      .ok_or(PngError::MalformedChunk { offset: self.length_offset })
  }

  /// The CRC that the name and content bytes actually produce.
  #[inline]
  pub fn actual_crc(&self, raw: &[u8]) -> PngResult<u32> {
    Ok(chunk_crc(self.name, self.content(raw)?))
  }
}

/// Walks the chunk framing of PNG bytes, one [`ChunkRef`] at a time.
///
/// * The scanner ends (`None`) when it lands exactly on the end of the data.
/// * If a chunk's framing would run past the end of the data you get a single
///   [`PngError::MalformedChunk`] and then the scanner is finished.
///
/// Scanners are cheap to clone, and you can start one at any offset, so
/// restarting a scan is just making a new scanner.
#[derive(Debug, Clone)]
pub struct ChunkScanner<'b> {
  raw: &'b [u8],
  offset: usize,
  failed: bool,
}
impl<'b> ChunkScanner<'b> {
  /// Starts scanning at `offset`, which should point at a chunk length field.
  #[inline]
  #[must_use]
  pub const fn new(raw: &'b [u8], offset: usize) -> Self {
    Self { raw, offset, failed: false }
  }

  /// Starts scanning at the first chunk, just past the PNG signature.
  ///
  /// The signature itself isn't checked.
  #[inline]
  #[must_use]
  pub const fn after_signature(raw: &'b [u8]) -> Self {
    Self::new(raw, PNG_SIGNATURE.len())
  }

  /// Offset of the next chunk this scanner will look at.
  #[inline]
  #[must_use]
  pub const fn offset(&self) -> usize {
    self.offset
  }

  /// The name of the next chunk, without checking if its body fits.
  #[inline]
  #[must_use]
  pub fn peek_name(&self) -> Option<PngChunkTy> {
    if self.failed {
      return None;
    }
    let start = self.offset.checked_add(4)?;
    let end = start.checked_add(4)?;
    let name: [u8; 4] = self.raw.get(start..end)?.try_into().ok()?;
    Some(PngChunkTy(name))
  }

  fn read_chunk_ref(&self) -> Option<ChunkRef> {
    let length_offset = self.offset;
    let content_offset = length_offset.checked_add(8)?;
    let len_bytes: [u8; 4] = self.raw.get(length_offset..length_offset + 4)?.try_into().ok()?;
    let content_length = u32::from_be_bytes(len_bytes);
    let name = self.peek_name()?;
    let crc_offset = content_offset.checked_add(usize::try_from(content_length).ok()?)?;
    if crc_offset.checked_add(4)? > self.raw.len() {
      return None;
    }
    Some(ChunkRef { length_offset, content_length, name, content_offset, crc_offset })
  }
}
impl Iterator for ChunkScanner<'_> {
  type Item = PngResult<ChunkRef>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if self.failed || self.offset >= self.raw.len() {
      return None;
    }
    match self.read_chunk_ref() {
      Some(chunk) => {
        trace!("{} chunk at {:#x}, {} bytes", chunk.name, chunk.length_offset, chunk.content_length);
        self.offset = chunk.end_offset();
        Some(Ok(chunk))
      }
      None => {
        self.failed = true;
        Some(Err(PngError::MalformedChunk { offset: self.offset }))
      }
    }
  }
}
impl FusedIterator for ChunkScanner<'_> {}

/// Finds the first chunk with the given name.
pub fn find_chunk(raw: &[u8], name: PngChunkTy) -> PngResult<ChunkRef> {
  for chunk in ChunkScanner::after_signature(raw) {
    let chunk = chunk?;
    if chunk.name == name {
      debug!("found {} at {:#x}", name, chunk.length_offset);
      return Ok(chunk);
    }
  }
  Err(PngError::MissingChunk(name))
}

/// Finds the `IHDR` chunk.
///
/// The header has to come before the image data, so reaching an `IDAT` first
/// counts as the header being missing.
pub fn find_header_chunk(raw: &[u8]) -> PngResult<ChunkRef> {
  for chunk in ChunkScanner::after_signature(raw) {
    let chunk = chunk?;
    match chunk.name {
      PngChunkTy::IHDR => {
        debug!("found IHDR at {:#x}", chunk.length_offset);
        return Ok(chunk);
      }
      PngChunkTy::IDAT => break,
      _ => (),
    }
  }
  Err(PngError::MissingChunk(PngChunkTy::IHDR))
}

/// Iterator over the contiguous run of `IDAT` chunks.
///
/// All image data chunks are supposed to be stored one after the other. The
/// run ends at the first chunk with any other name, or at the end of the data.
/// Anything after that isn't even looked at, so a truncated trailing `IEND`
/// (or similar) doesn't break the run.
#[derive(Debug, Clone)]
pub struct ImageDataRun<'b> {
  first: Option<ChunkRef>,
  scanner: ChunkScanner<'b>,
}
impl<'b> ImageDataRun<'b> {
  /// Locates the first `IDAT` chunk and prepares to walk the run from there.
  pub fn new(raw: &'b [u8]) -> PngResult<Self> {
    let first = find_chunk(raw, PngChunkTy::IDAT)?;
    Ok(Self { first: Some(first), scanner: ChunkScanner::new(raw, first.end_offset()) })
  }
}
impl Iterator for ImageDataRun<'_> {
  type Item = PngResult<ChunkRef>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if let Some(first) = self.first.take() {
      return Some(Ok(first));
    }
    if self.scanner.peek_name() == Some(PngChunkTy::IDAT) {
      self.scanner.next()
    } else {
      None
    }
  }
}
impl FusedIterator for ImageDataRun<'_> {}

/// Gathers the full contiguous run of `IDAT` chunks.
#[cfg(feature = "alloc")]
pub fn image_data_chunks(raw: &[u8]) -> PngResult<Vec<ChunkRef>> {
  let chunks = ImageDataRun::new(raw)?.collect::<PngResult<Vec<_>>>()?;
  debug!("image data is split over {} IDAT chunk(s)", chunks.len());
  Ok(chunks)
}

/// Concatenates the content of the chunks given, in order.
///
/// The result is the single zlib stream that the `IDAT` chunks form together.
#[cfg(feature = "alloc")]
pub fn collect_image_data(raw: &[u8], chunks: &[ChunkRef]) -> PngResult<Vec<u8>> {
  let total: usize = chunks.iter().map(|c| c.content_length as usize).sum();
  let mut out = Vec::with_capacity(total);
  for chunk in chunks {
    out.extend_from_slice(chunk.content(raw)?);
  }
  Ok(out)
}
