#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A crate for finding PNG files whose declared height is a lie.
//!
//! A PNG header (`IHDR`) says how tall the image is, but the compressed image
//! data (`IDAT`) says how many scanlines actually exist. When someone edits
//! only the header, viewers will happily show fewer rows than are really
//! stored. This crate measures the real height from the image data and can
//! rewrite the header (and its CRC) so the hidden rows show up again.
//!
//! See the [`png`] module for the details.

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

mod int_endian;
pub use int_endian::*;

pub mod png;
