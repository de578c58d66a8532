use log::{debug, warn};

use super::{scanline_length, Decompress, HeaderRecord};
use crate::PngResult;

/// The outcome of measuring an image's real height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeightReport {
  /// Height claimed by the header.
  pub declared_height: u32,
  /// Whole scanlines found in the decompressed image data.
  pub computed_height: u64,
  /// If the two heights agree.
  pub matches: bool,
  /// Bytes per scanline (filter byte included) used for the measurement.
  pub scanline_length: u64,
  /// Total decompressed bytes.
  pub decompressed_len: usize,
  /// Bytes left over after the last whole scanline.
  ///
  /// These don't make the measurement fail, the height is simply rounded
  /// down.
  pub trailing_bytes: u64,
}

/// Measures how many scanlines the image data really holds.
///
/// `image_data` is the concatenated content of every `IDAT` chunk. It gets
/// inflated with `decompressor`, and the decompressed length is floor-divided
/// by the [`scanline_length`] of the header.
pub fn validate_height<D: Decompress>(
  header: &HeaderRecord, image_data: &[u8], mut decompressor: D,
) -> PngResult<HeightReport> {
  let scanline_length = scanline_length(header)?;
  let decompressed = decompressor.decompress(image_data)?;
  let decompressed_len = decompressed.len();
  debug!("{} compressed bytes inflated to {}", image_data.len(), decompressed_len);
  let computed_height = decompressed_len as u64 / scanline_length;
  let trailing_bytes = decompressed_len as u64 % scanline_length;
  if trailing_bytes != 0 {
    warn!("{trailing_bytes} byte(s) after the last whole scanline were ignored");
  }
  Ok(HeightReport {
    declared_height: header.height,
    computed_height,
    matches: u64::from(header.height) == computed_height,
    scanline_length,
    decompressed_len,
    trailing_bytes,
  })
}
