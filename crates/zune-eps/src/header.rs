/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! EPS header scanning
//!
//! EPS files carry their raster description in PostScript comments:
//!
//! ```text
//! %!PS-Adobe-3.0 EPSF-3.0
//! %ImageData: <columns> <rows> <depth> <mode> <pad channels> <block size> <encoding> "<data start>"
//! %%BeginBinary: <length>
//! <data start>
//! ...samples...
//! ```
//!
//! The scanner finds the signature, folds each following line into a [`HeaderScan`]
//! and stops right after the data start line.
use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;

use zune_core::bytestream::{ZByteReaderTrait, ZReader, ZSeekFrom};
use zune_core::colorspace::ColorSpace;
use zune_core::log::{trace, warn};
use zune_core::options::DecoderOptions;

use crate::constants::{
    ColorMode, DataEncoding, BEGIN_BINARY_DIRECTIVE, CMYK_PROFILE_NAME, IMAGE_DATA_DIRECTIVE,
    PS_SIGNATURE
};
use crate::errors::EpsDecodeErrors;

/// Image description extracted from the EPS comments
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EpsHeader {
    pub(crate) width:               usize,
    pub(crate) height:              usize,
    pub(crate) bit_depth:           u32,
    pub(crate) color_mode:          ColorMode,
    pub(crate) padding_bands:       usize,
    pub(crate) block_size:          u32,
    pub(crate) data_encoding:       DataEncoding,
    pub(crate) data_start_marker:   String,
    pub(crate) binary_block_length: Option<u64>,
    pub(crate) data_start:          u64,
    pub(crate) signature:           String
}

impl EpsHeader {
    pub const fn width(&self) -> usize {
        self.width
    }
    pub const fn height(&self) -> usize {
        self.height
    }
    /// Bit depth as written in `%ImageData`, samples are always read as 8 bits
    pub const fn bit_depth(&self) -> u32 {
        self.bit_depth
    }
    pub const fn color_mode(&self) -> ColorMode {
        self.color_mode
    }
    /// Number of per-pixel bytes after the color bands that carry no color
    pub const fn padding_bands(&self) -> usize {
        self.padding_bands
    }
    pub const fn block_size(&self) -> u32 {
        self.block_size
    }
    pub const fn data_encoding(&self) -> DataEncoding {
        self.data_encoding
    }
    /// The line that precedes the image samples, without quotes
    pub fn data_start_marker(&self) -> &str {
        &self.data_start_marker
    }
    /// Length announced by `%%BeginBinary`, if one preceded the data start line
    pub const fn binary_block_length(&self) -> Option<u64> {
        self.binary_block_length
    }
    /// Absolute stream offset of the first sample byte
    pub const fn data_start(&self) -> u64 {
        self.data_start
    }
    /// The full `%!PS` signature line
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Colorspace of decoded pixels, `None` when they cannot be decoded
    pub const fn output_colorspace(&self) -> Option<ColorSpace> {
        match self.data_encoding.jpeg_colorspace() {
            Some(colorspace) => Some(colorspace),
            None => self.color_mode.colorspace()
        }
    }

    /// Name of the color profile decoded pixels are expressed in, if any
    pub fn profile_name(&self) -> Option<&'static str> {
        match self.output_colorspace() {
            Some(ColorSpace::CMYK) => Some(CMYK_PROFILE_NAME),
            _ => None
        }
    }
}

/// Fields of a `%ImageData:` directive
#[derive(Clone, Debug, Default)]
struct ImageData {
    width:         usize,
    height:        usize,
    depth:         u32,
    mode:          u32,
    padding_bands: usize,
    block_size:    u32,
    encoding:      u32,
    marker:        String
}

impl ImageData {
    fn parse(line: &str) -> Result<ImageData, EpsDecodeErrors> {
        let malformed = || EpsDecodeErrors::MalformedDirective(line.to_owned());

        let mut fields = line[IMAGE_DATA_DIRECTIVE.len()..].split_ascii_whitespace();

        let mut number = || -> Result<usize, EpsDecodeErrors> {
            fields
                .next()
                .and_then(|field| field.parse::<usize>().ok())
                .ok_or_else(malformed)
        };
        let width = number()?;
        let height = number()?;
        let depth = u32::try_from(number()?).map_err(|_| malformed())?;
        let mode = u32::try_from(number()?).map_err(|_| malformed())?;
        let padding_bands = number()?;
        let block_size = u32::try_from(number()?).map_err(|_| malformed())?;
        let encoding = u32::try_from(number()?).map_err(|_| malformed())?;

        let marker = fields
            .next()
            .map(|token| token.trim_matches('"'))
            .filter(|token| !token.is_empty())
            .ok_or_else(malformed)?;

        Ok(ImageData {
            width,
            height,
            depth,
            mode,
            padding_bands,
            block_size,
            encoding,
            marker: marker.to_owned()
        })
    }
}

/// Header fields gathered so far
#[derive(Clone, Debug, Default)]
pub(crate) struct HeaderScan {
    image_data:          Option<ImageData>,
    binary_block_length: Option<u64>
}

/// Outcome of feeding one line to a [`HeaderScan`]
pub(crate) enum ScanStep {
    Continue(HeaderScan),
    /// The line was the data start marker, samples follow it
    DataStart(HeaderScan)
}

impl HeaderScan {
    pub(crate) fn apply_line(mut self, line: &str) -> Result<ScanStep, EpsDecodeErrors> {
        if line.starts_with(IMAGE_DATA_DIRECTIVE) {
            self.image_data = Some(ImageData::parse(line)?);
        } else if let Some(rest) = line.strip_prefix(BEGIN_BINARY_DIRECTIVE) {
            let length = rest
                .split_ascii_whitespace()
                .next()
                .and_then(|token| token.parse::<u64>().ok())
                .ok_or_else(|| EpsDecodeErrors::MalformedDirective(line.to_owned()))?;

            self.binary_block_length = Some(length);
        } else if self
            .image_data
            .as_ref()
            .is_some_and(|data| line.eq_ignore_ascii_case(&data.marker))
        {
            return Ok(ScanStep::DataStart(self));
        }
        Ok(ScanStep::Continue(self))
    }

    /// Validate gathered fields and build the header
    ///
    /// `data_start` is `None` when the stream ended before the data start line.
    pub(crate) fn finish(
        self, signature: String, data_start: Option<u64>, options: &DecoderOptions
    ) -> Result<EpsHeader, EpsDecodeErrors> {
        let data = self
            .image_data
            .ok_or(EpsDecodeErrors::MissingHeaderFields("no %ImageData directive"))?;

        let data_encoding = match (DataEncoding::from_int(data.encoding), data.encoding) {
            (Some(encoding), _) => encoding,
            (None, 0) if !options.strict_mode() => {
                warn!("Data type 0 in %ImageData, reading samples as binary");
                DataEncoding::Binary
            }
            (None, code) => return Err(EpsDecodeErrors::UnsupportedEncoding(code))
        };

        if data.width == 0 || data.height == 0 || data.mode == 0 {
            return Err(EpsDecodeErrors::MissingHeaderFields(
                "width, height and color mode must be non-zero"
            ));
        }
        let color_mode = ColorMode::from_int(data.mode)
            .ok_or(EpsDecodeErrors::UnsupportedColorMode(data.mode))?;

        if data.width > options.max_width() {
            return Err(EpsDecodeErrors::LargeDimensions(
                options.max_width(),
                data.width
            ));
        }
        if data.height > options.max_height() {
            return Err(EpsDecodeErrors::LargeDimensions(
                options.max_height(),
                data.height
            ));
        }
        if data.depth != 8 {
            warn!("Bit depth {} in %ImageData, samples read as 8 bit", data.depth);
        }
        let data_start = data_start.ok_or(EpsDecodeErrors::MissingHeaderFields(
            "data start marker not found"
        ))?;

        Ok(EpsHeader {
            width: data.width,
            height: data.height,
            bit_depth: data.depth,
            color_mode,
            padding_bands: data.padding_bands,
            block_size: data.block_size,
            data_encoding,
            data_start_marker: data.marker,
            binary_block_length: self.binary_block_length,
            data_start,
            signature
        })
    }
}

/// Read one line ending in `\n`, `\r` or `\r\n` into `line`, without the terminator.
///
/// Returns `false` if the stream was already exhausted.
fn read_line<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>, line: &mut Vec<u8>
) -> Result<bool, EpsDecodeErrors> {
    line.clear();

    if stream.eof()? {
        return Ok(false);
    }
    while !stream.eof()? {
        match stream.read_u8_err()? {
            b'\n' => break,
            b'\r' => {
                if !stream.eof()? && stream.read_u8_err()? != b'\n' {
                    stream.rewind(1)?;
                }
                break;
            }
            byte => line.push(byte)
        }
    }
    Ok(true)
}

/// Number of bytes between the current position and the end of the stream.
///
/// The position is left where it was.
pub(crate) fn bytes_left<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>
) -> Result<u64, EpsDecodeErrors> {
    let position = stream.position()?;
    let end = stream.seek(ZSeekFrom::End(0))?;
    stream.seek(ZSeekFrom::Start(position))?;

    Ok(end.saturating_sub(position))
}

/// Slide over the stream until `%!PS` and return the whole signature line
fn read_signature<T: ZByteReaderTrait>(stream: &mut ZReader<T>) -> Result<String, EpsDecodeErrors> {
    let mut window = [0_u8; 4];

    stream
        .read_exact_bytes(&mut window)
        .map_err(|_| EpsDecodeErrors::MalformedSignature("<empty>".to_owned()))?;

    while window != PS_SIGNATURE {
        if stream.eof()? {
            return Err(EpsDecodeErrors::MalformedSignature(
                "<no %!PS found>".to_owned()
            ));
        }
        window.copy_within(1.., 0);
        window[3] = stream.read_u8_err()?;
    }
    let mut rest = Vec::new();
    read_line(stream, &mut rest)?;

    let mut signature = String::from("%!PS");
    signature.push_str(&String::from_utf8_lossy(&rest));

    Ok(signature)
}

fn is_version(version: &str) -> bool {
    let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    version
        .split_once('.')
        .is_some_and(|(major, minor)| is_number(major) && is_number(minor))
}

/// Check version tokens of a signature line such as `%!PS-Adobe-3.0 EPSF-3.0`
///
/// `PS-Adobe-` and `EPSF-` tokens must carry a `major.minor` version.
/// A line without an `EPSF-` token is plain PostScript, rejected in strict mode.
pub(crate) fn validate_signature(signature: &str, strict: bool) -> Result<(), EpsDecodeErrors> {
    let mut is_eps = false;

    for token in signature.split_ascii_whitespace() {
        let version = if let Some(version) = token.strip_prefix("%!PS-Adobe-") {
            version
        } else if let Some(version) = token.strip_prefix("EPSF-") {
            is_eps = true;
            version
        } else {
            continue;
        };
        if !is_version(version) {
            return Err(EpsDecodeErrors::MalformedSignature(signature.to_owned()));
        }
    }
    if !is_eps {
        if strict {
            return Err(EpsDecodeErrors::MalformedSignature(signature.to_owned()));
        }
        warn!("Signature {:?} has no EPSF version, continuing", signature);
    }
    Ok(())
}

/// Parse the header from the current stream position, leaving the stream
/// right after the data start line.
pub(crate) fn parse_header<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>, options: &DecoderOptions
) -> Result<EpsHeader, EpsDecodeErrors> {
    let signature = read_signature(stream)?;
    validate_signature(&signature, options.strict_mode())?;

    let mut scan = HeaderScan::default();
    let mut data_start = None;
    let mut line = Vec::new();

    while read_line(stream, &mut line)? {
        match scan.apply_line(&String::from_utf8_lossy(&line))? {
            ScanStep::Continue(next) => scan = next,
            ScanStep::DataStart(next) => {
                scan = next;
                data_start = Some(stream.position()?);
                break;
            }
        }
    }
    let header = scan.finish(signature, data_start, options)?;

    trace!("Image width: {}", header.width);
    trace!("Image height: {}", header.height);
    trace!("Color mode: {:?}", header.color_mode);
    trace!("Data encoding: {:?}", header.data_encoding);
    trace!("Padding bands: {}", header.padding_bands);
    trace!("Data start: {}", header.data_start);

    Ok(header)
}
