//! Decompression of the image data.
//!
//! The analysis doesn't care how the zlib stream gets inflated, only how many
//! bytes come out. Anything implementing [`Decompress`] will do, and with the
//! `miniz_oxide` feature there's [`ZlibInflater`] ready to go.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Why the image data couldn't be inflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InflateError {
  /// The stream ended before the final deflate block.
  Truncated,
  /// The stream inflated fully but the Adler-32 trailer didn't match.
  ChecksumMismatch,
  /// More output was produced than the decompressor allows.
  OutputLimit,
  /// The stream isn't valid zlib/deflate data.
  Failed,
}
impl core::fmt::Display for InflateError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str(match self {
      Self::Truncated => "compressed stream is truncated",
      Self::ChecksumMismatch => "adler32 checksum mismatch",
      Self::OutputLimit => "decompressed size limit exceeded",
      Self::Failed => "malformed compressed stream",
    })
  }
}
impl core::error::Error for InflateError {}

/// Something that can inflate a PNG's zlib stream.
#[cfg(feature = "alloc")]
pub trait Decompress {
  /// Inflates the full compressed stream into a new buffer.
  fn decompress(&mut self, compressed: &[u8]) -> Result<Vec<u8>, InflateError>;
}
#[cfg(feature = "alloc")]
impl<D: Decompress + ?Sized> Decompress for &mut D {
  #[inline]
  fn decompress(&mut self, compressed: &[u8]) -> Result<Vec<u8>, InflateError> {
    (**self).decompress(compressed)
  }
}

/// Zlib decompression using `miniz_oxide`.
///
/// The output is capped at `limit` bytes so that a hostile stream can't eat all
/// your memory.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZlibInflater {
  limit: usize,
}
#[cfg(feature = "miniz_oxide")]
impl ZlibInflater {
  /// Output limit used by [`Default`], 1 GiB.
  pub const DEFAULT_LIMIT: usize = 1 << 30;

  /// Makes an inflater that fails once more than `limit` bytes come out.
  #[inline]
  #[must_use]
  pub const fn with_limit(limit: usize) -> Self {
    Self { limit }
  }

  /// The output limit in bytes.
  #[inline]
  #[must_use]
  pub const fn limit(&self) -> usize {
    self.limit
  }
}
#[cfg(feature = "miniz_oxide")]
impl Default for ZlibInflater {
  #[inline]
  fn default() -> Self {
    Self::with_limit(Self::DEFAULT_LIMIT)
  }
}
#[cfg(feature = "miniz_oxide")]
impl Decompress for ZlibInflater {
  fn decompress(&mut self, compressed: &[u8]) -> Result<Vec<u8>, InflateError> {
    use miniz_oxide::inflate::{decompress_to_vec_zlib_with_limit, TINFLStatus};
    decompress_to_vec_zlib_with_limit(compressed, self.limit).map_err(|e| {
      log::debug!("inflate stopped with {:?} after {} bytes", e.status, e.output.len());
      match e.status {
        TINFLStatus::Adler32Mismatch => InflateError::ChecksumMismatch,
        TINFLStatus::HasMoreOutput => InflateError::OutputLimit,
        TINFLStatus::FailedCannotMakeProgress | TINFLStatus::NeedsMoreInput => {
          InflateError::Truncated
        }
        _ => InflateError::Failed,
      }
    })
  }
}
