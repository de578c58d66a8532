//! The CRC-32 used by every PNG chunk.
//!
//! This is the ISO-HDLC / zlib flavor: reflected polynomial `0xEDB88320`,
//! initial value all ones, output inverted. It runs over the chunk's 4 name
//! bytes followed by its content (the length field isn't included).

use super::PngChunkTy;

/// Lookup table for byte-at-a-time CRC updates.
pub const CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
  let mut out = [0; 256];
  let mut n = 0;
  while n < 256 {
    let mut c = n as u32;
    let mut k = 0;
    while k < 8 {
      if (c & 1) != 0 {
        c = 0xEDB8_8320_u32 ^ (c >> 1);
      } else {
        c = c >> 1;
      }
      //
      k += 1;
    }
    out[n] = c;
    //
    n += 1;
  }
  out
}

/// Runs bytes through a CRC accumulator without the final inversion.
#[inline]
#[must_use]
pub fn update_crc(mut crc: u32, iter: impl Iterator<Item = u8>) -> u32 {
  for byte in iter {
    let i = (crc ^ u32::from(byte)) as u8 as usize;
    crc = CRC_TABLE[i] ^ (crc >> 8);
  }
  crc
}

/// Full PNG CRC (init and final xor included) of the bytes given.
#[inline]
#[must_use]
pub fn png_crc(iter: impl Iterator<Item = u8>) -> u32 {
  update_crc(u32::MAX, iter) ^ u32::MAX
}

/// CRC of a plain byte slice.
#[inline]
#[must_use]
pub fn checksum(bytes: &[u8]) -> u32 {
  png_crc(bytes.iter().copied())
}

/// CRC of a chunk, which covers `name || content`.
#[inline]
#[must_use]
pub fn chunk_crc(name: PngChunkTy, content: &[u8]) -> u32 {
  png_crc(name.0.iter().copied().chain(content.iter().copied()))
}
