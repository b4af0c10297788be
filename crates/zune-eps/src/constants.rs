/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![allow(clippy::upper_case_acronyms)]

use zune_core::colorspace::ColorSpace;

/// First bytes of every PostScript program
pub const PS_SIGNATURE: [u8; 4] = *b"%!PS";

/// Magic bytes of the DOS EPS binary header that wraps the
/// PostScript section together with WMF/TIFF previews
pub const EPS_BINARY_HEADER_MAGIC: [u8; 4] = [0xC5, 0xD0, 0xD3, 0xC6];

/// Size of the DOS EPS binary header in bytes
pub const EPS_BINARY_HEADER_SIZE: usize = 30;

/// Name of the CMYK profile paired with CMYK images
pub const CMYK_PROFILE_NAME: &str = "USSheetfedCoated.icc";

pub(crate) const IMAGE_DATA_DIRECTIVE: &str = "%ImageData:";
pub(crate) const BEGIN_BINARY_DIRECTIVE: &str = "%%BeginBinary:";

/// Color mode code carried by the `%ImageData:` directive
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColorMode {
    /// One 8-bit grayscale band
    Bitmap = 1,
    /// CIE Lab, cannot be decoded
    Lab = 2,
    RGB = 3,
    CMYK = 4
}

impl ColorMode {
    pub fn from_int(int: u32) -> Option<ColorMode> {
        match int {
            1 => Some(Self::Bitmap),
            2 => Some(Self::Lab),
            3 => Some(Self::RGB),
            4 => Some(Self::CMYK),
            _ => None
        }
    }

    /// The colorspace raw samples of this mode decode to,
    /// or `None` for modes we cannot decode
    pub const fn colorspace(self) -> Option<ColorSpace> {
        match self {
            ColorMode::Bitmap => Some(ColorSpace::Luma),
            ColorMode::RGB => Some(ColorSpace::RGB),
            ColorMode::CMYK => Some(ColorSpace::CMYK),
            ColorMode::Lab => None
        }
    }
}

/// How the image samples following the data start marker are stored
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DataEncoding {
    /// Raw 8-bit samples, one band-planar row after another
    Binary = 1,
    /// An ASCII85 wrapped CMYK JPEG stream
    Ascii85JpegCMYK = 5,
    /// An ASCII85 wrapped RGB JPEG stream
    Ascii85JpegRGB = 6
}

impl DataEncoding {
    pub fn from_int(int: u32) -> Option<DataEncoding> {
        match int {
            1 => Some(Self::Binary),
            5 => Some(Self::Ascii85JpegCMYK),
            6 => Some(Self::Ascii85JpegRGB),
            _ => None
        }
    }

    /// Colorspace the embedded JPEG stream is decoded to,
    /// `None` for raw samples
    pub const fn jpeg_colorspace(self) -> Option<ColorSpace> {
        match self {
            DataEncoding::Binary => None,
            DataEncoding::Ascii85JpegCMYK => Some(ColorSpace::CMYK),
            DataEncoding::Ascii85JpegRGB => Some(ColorSpace::RGB)
        }
    }
}
