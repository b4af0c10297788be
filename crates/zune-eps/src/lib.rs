/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! An Encapsulated PostScript raster decoder
//!
//! This crate reads the raster copy image editors embed in EPS files,
//! it doesn't run PostScript.
//!
//! # What is read
//! - Raw 8-bit grayscale, RGB and CMYK samples described by an `%ImageData` comment
//! - ASCII85 wrapped JPEG data (`%ImageData` data types 5 and 6), decoded with `zune-jpeg`
//! - The TIFF preview of files starting with a DOS EPS binary header, returned as raw
//!   bytes to be decoded by a TIFF decoder
//!
//! Lab images are recognised but cannot be decoded.
//!
//! # Example
//! - Reading part of an eps file
//! ```no_run
//! use zune_eps::errors::EpsDecodeErrors;
//! use zune_eps::{EpsDecoder, Rect, RegionSpec};
//!
//! fn main() -> Result<(), EpsDecodeErrors> {
//!     use zune_core::bytestream::ZCursor;
//!     let mut decoder = EpsDecoder::new(ZCursor::new(b""));
//!     decoder.decode_headers()?;
//!
//!     let spec = RegionSpec::new()
//!         .set_source_region(Rect::new(10, 10, 100, 100))
//!         .set_subsampling(2, 2);
//!     let pixels = decoder.decode_region(&spec)?;
//!
//!     assert_eq!((pixels.width(), pixels.height()), (50, 50));
//!     Ok(())
//! }
//! ```
//!
//! # Features
//! - `std`: implements `std::error::Error` and enables std readers from `zune-core`
//! - `log`: logs header details through the `log` crate
#![cfg_attr(not(feature = "std"), no_std)]
#![macro_use]
extern crate alloc;

pub use zune_core;

pub use crate::ascii85::decode_ascii85;
pub use crate::constants::{
    ColorMode, DataEncoding, CMYK_PROFILE_NAME, EPS_BINARY_HEADER_MAGIC, EPS_BINARY_HEADER_SIZE
};
pub use crate::decoder::EpsDecoder;
pub use crate::header::EpsHeader;
pub use crate::preview::{EpsBinaryHeader, PreviewBlob};
pub use crate::profile::ColorProfileProvider;
pub use crate::raster::{PixelBuffer, Rect, RegionSpec};

mod ascii85;
mod constants;
pub mod decoder;
pub mod errors;
mod header;
mod preview;
mod profile;
mod raster;
