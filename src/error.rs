use crate::png::{InflateError, PngChunkTy};

/// An error from the `pngheight` crate.
///
/// Every one of these is terminal for the analysis of a single file. The input
/// is always a fully in-memory byte slice, so there's nothing to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngError {
  /// The first 8 bytes aren't the PNG signature (or there aren't 8 bytes).
  NotAPng,

  /// A chunk that the analysis can't do without was never found.
  MissingChunk(PngChunkTy),

  /// Chunk framing at this absolute offset runs past the end of the data.
  MalformedChunk {
    /// Offset of the chunk's length field.
    offset: usize,
  },

  /// The header uses a color type we can't measure.
  ///
  /// Indexed color (`3`) is always rejected.
  UnsupportedColorType(u8),

  /// The image data didn't inflate.
  Decompression(InflateError),

  /// The measured height doesn't fit in the header's 32-bit height field.
  HeightOutOfRange(u64),

  /// The image data doesn't hold even one whole scanline, so there's no
  /// height that the header could be fixed to.
  HeightZero,
}
impl From<InflateError> for PngError {
  #[inline]
  fn from(e: InflateError) -> Self {
    Self::Decompression(e)
  }
}
impl core::fmt::Display for PngError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::NotAPng => write!(f, "input is not a PNG file"),
      Self::MissingChunk(ty) => write!(f, "required {ty} chunk is missing"),
      Self::MalformedChunk { offset } => {
        write!(f, "chunk at offset {offset:#x} runs past the end of the file")
      }
      Self::UnsupportedColorType(3) => {
        write!(f, "indexed color (color type 3) is not supported")
      }
      Self::UnsupportedColorType(ct) => write!(f, "unsupported color type {ct}"),
      Self::Decompression(e) => write!(f, "image data failed to decompress: {e}"),
      Self::HeightOutOfRange(h) => write!(f, "measured height {h:#x} does not fit in 32 bits"),
      Self::HeightZero => write!(f, "image data holds no whole scanline"),
    }
  }
}
impl core::error::Error for PngError {}

/// Shorthand for results in this crate.
pub type PngResult<T> = Result<T, PngError>;
