//! Holds all the tools for checking PNG heights.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! The general format of a PNG is that the information is stored in "chunks".
//! Two of them matter here:
//! * **Header** (`IHDR`) - The image's dimensions and pixel format. The height
//!   stored here is what viewers believe.
//! * **Image Data** (`IDAT`) - One or more chunks of compressed data. All of
//!   the compressed data forms a single zlib data stream, and all of the image
//!   data chunks should appear one after the other.
//!
//! Once inflated, the image data is a series of scanlines, each one being a
//! filter type byte followed by the pixel bytes for that line. Divide the
//! inflated size by the scanline size and you know how many lines are really
//! there, whatever the header says.
//!
//! ## Automatic Checking
//!
//! Call [`analyze`] with the full file bytes and a decompressor. You get back
//! an [`Analysis`], and if its report doesn't match you can call
//! [`Analysis::repair`] to get fixed bytes.
//!
//! ```no_run
//! # #[cfg(feature = "miniz_oxide")]
//! # fn or_png_error(png: &[u8]) -> Result<(), pngheight::PngError> {
//! use pngheight::png::*;
//! let analysis = analyze(png, ZlibInflater::default())?;
//! if !analysis.report.matches {
//!   let fixed = analysis.repair(png)?;
//!   std::fs::write("fixed.png", fixed.as_bytes()).unwrap();
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Checking Step By Step
//!
//! 1) [`find_header_chunk`] and [`decode_header`] give a [`HeaderRecord`].
//! 2) [`image_data_chunks`] and [`collect_image_data`] give the zlib stream.
//! 3) [`validate_height`] inflates that stream and gives a [`HeightReport`].
//! 4) [`patch_height`] writes a new height (and CRC) into a copy of the bytes.
//!
//! Limitations: indexed color images are rejected, interlaced images are
//! measured as if they weren't interlaced, and only the `IHDR` CRC is ever
//! looked at.

mod crc32;
pub use crc32::*;

mod chunk;
pub use chunk::*;

mod ihdr;
pub use ihdr::*;

mod inflate;
pub use inflate::*;

#[cfg(feature = "alloc")]
mod height;
#[cfg(feature = "alloc")]
pub use height::*;

#[cfg(feature = "alloc")]
mod patch;
#[cfg(feature = "alloc")]
pub use patch::*;


#[cfg(feature = "alloc")]
use crate::{PngError, PngResult};

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Checks if the PNG's initial 8 bytes are correct.
#[inline]
#[must_use]
pub const fn is_png_signature_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}

/// Everything learned from checking one PNG.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Analysis {
  /// Where the `IHDR` chunk is.
  pub header_chunk: ChunkRef,
  /// The decoded header.
  pub header: HeaderRecord,
  /// How many `IDAT` chunks made up the image data.
  pub image_data_chunks: usize,
  /// Declared vs measured height.
  pub report: HeightReport,
}
#[cfg(feature = "alloc")]
impl Analysis {
  /// The measured height, as a value that fits the header.
  ///
  /// A height of zero isn't a valid PNG, so that's an error too.
  #[inline]
  pub fn corrected_height(&self) -> PngResult<u32> {
    match u32::try_from(self.report.computed_height) {
      Ok(0) => Err(PngError::HeightZero),
      Ok(h) => Ok(h),
      Err(_) => Err(PngError::HeightOutOfRange(self.report.computed_height)),
    }
  }

  /// Copies `raw` with the header height set to the measured height.
  ///
  /// `raw` must be the same bytes that were analyzed.
  #[inline]
  pub fn repair(&self, raw: &[u8]) -> PngResult<PatchedPng> {
    patch_height(raw, &self.header_chunk, self.corrected_height()?)
  }
}

/// Checks a full PNG file's declared height against its image data.
#[cfg(feature = "alloc")]
pub fn analyze<D: Decompress>(raw: &[u8], decompressor: D) -> PngResult<Analysis> {
  if !is_png_signature_correct(raw) {
    return Err(PngError::NotAPng);
  }
  let header_chunk = find_header_chunk(raw)?;
  let header = decode_header(raw, &header_chunk)?;
  if !header.checksum_is_valid() {
    log::warn!(
      "IHDR crc is {:#010x} but the header content gives {:#010x}",
      header.declared_checksum,
      header.actual_checksum()
    );
  }
  let chunks = image_data_chunks(raw)?;
  let image_data = collect_image_data(raw, &chunks)?;
  let report = validate_height(&header, &image_data, decompressor)?;
  Ok(Analysis { header_chunk, header, image_data_chunks: chunks.len(), report })
}
