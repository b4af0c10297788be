/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::string::String;
use core::fmt::{Debug, Display, Formatter};

use zune_core::bytestream::ZByteIoError;
use zune_jpeg::errors::DecodeErrors;

/// Reasons an ASCII85 payload is rejected
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Ascii85Error {
    /// A byte outside `!`..`u`, `z`, `~` and whitespace
    InvalidCharacter { byte: u8, position: usize },
    /// `~` not followed by `>`
    BadTerminator { position: usize },
    /// `z` appeared inside a group
    MisplacedZ { position: usize },
    /// A five character group whose value does not fit in 32 bits
    GroupOverflow { position: usize },
    /// Input ended before `~>`
    UnexpectedEnd
}

impl Debug for Ascii85Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Ascii85Error::InvalidCharacter { byte, position } => {
                write!(
                    f,
                    "bad character {byte:#04x} ({:?}) at offset {position}",
                    char::from(*byte)
                )
            }
            Ascii85Error::BadTerminator { position } => {
                write!(f, "expected `~>` at offset {position}")
            }
            Ascii85Error::MisplacedZ { position } => {
                write!(f, "`z` inside a group at offset {position}")
            }
            Ascii85Error::GroupOverflow { position } => {
                write!(f, "group ending at offset {position} overflows 32 bits")
            }
            Ascii85Error::UnexpectedEnd => {
                write!(f, "data ended before `~>` terminator")
            }
        }
    }
}

/// Part of the stream that ended early
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Truncation {
    /// A raw sample row, by row index
    Row(usize),
    /// The `%%BeginBinary` block starting at `offset`
    Block { offset: u64, length: u64 }
}

impl Debug for Truncation {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Truncation::Row(row) => write!(f, "row {row}"),
            Truncation::Block { offset, length } => {
                write!(f, "binary block of {length} bytes at offset {offset}")
            }
        }
    }
}

/// Errors that can occur during EPS decoding
pub enum EpsDecodeErrors {
    /// No `%!PS` signature, or a signature line with a malformed version
    MalformedSignature(String),
    /// A required header field or the data start marker is absent
    MissingHeaderFields(&'static str),
    /// A recognised directive whose fields could not be parsed
    MalformedDirective(String),
    UnsupportedColorMode(u32),
    UnsupportedEncoding(u32),
    /// Maximum supported, found
    LargeDimensions(usize, usize),
    TruncatedData(Truncation),
    MalformedAscii85(Ascii85Error),
    /// Source region, subsampling or band selection cannot be honoured
    InvalidRegionSpec(&'static str),
    /// The binary header announced a TIFF preview that could not be read
    PreviewExtractionFailed(String),
    JpegDecodeErrors(DecodeErrors),
    IoErrors(ZByteIoError),
    Generic(&'static str)
}

impl Debug for EpsDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            EpsDecodeErrors::MalformedSignature(line) => {
                writeln!(f, "Bad file signature: {line:?}")
            }
            EpsDecodeErrors::MissingHeaderFields(what) => {
                writeln!(f, "Incomplete EPS header: {what}")
            }
            EpsDecodeErrors::MalformedDirective(line) => {
                writeln!(f, "Could not parse header directive {line:?}")
            }
            EpsDecodeErrors::UnsupportedColorMode(mode) => {
                writeln!(
                    f,
                    "Unsupported color mode {mode}, supported modes are 1 (bitmap), 3 (RGB) and 4 (CMYK)"
                )
            }
            EpsDecodeErrors::UnsupportedEncoding(encoding) => {
                writeln!(
                    f,
                    "Data type {encoding} not supported, known types are 1 (binary), 5 (JPEG CMYK) and 6 (JPEG RGB)"
                )
            }
            EpsDecodeErrors::LargeDimensions(supported, found) => {
                writeln!(
                    f,
                    "Too large dimensions, supported {supported} but found {found}"
                )
            }
            EpsDecodeErrors::TruncatedData(part) => {
                writeln!(f, "Not enough data while reading {part:?}")
            }
            EpsDecodeErrors::MalformedAscii85(err) => {
                writeln!(f, "Bad ASCII85 data: {err:?}")
            }
            EpsDecodeErrors::InvalidRegionSpec(reason) => {
                writeln!(f, "Invalid region: {reason}")
            }
            EpsDecodeErrors::PreviewExtractionFailed(reason) => {
                writeln!(f, "Could not extract TIFF preview: {reason}")
            }
            EpsDecodeErrors::JpegDecodeErrors(err) => {
                writeln!(f, "Embedded JPEG error: {err:?}")
            }
            EpsDecodeErrors::IoErrors(err) => {
                writeln!(f, "I/O error: {err:?}")
            }
            EpsDecodeErrors::Generic(reason) => {
                writeln!(f, "{reason}")
            }
        }
    }
}

impl Display for EpsDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EpsDecodeErrors {}

impl From<&'static str> for EpsDecodeErrors {
    fn from(r: &'static str) -> Self {
        Self::Generic(r)
    }
}

impl From<ZByteIoError> for EpsDecodeErrors {
    fn from(r: ZByteIoError) -> Self {
        Self::IoErrors(r)
    }
}

impl From<DecodeErrors> for EpsDecodeErrors {
    fn from(r: DecodeErrors) -> Self {
        Self::JpegDecodeErrors(r)
    }
}

impl From<Ascii85Error> for EpsDecodeErrors {
    fn from(r: Ascii85Error) -> Self {
        Self::MalformedAscii85(r)
    }
}
