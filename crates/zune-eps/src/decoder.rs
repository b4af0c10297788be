/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Encapsulated PostScript raster decoder
//!
//! EPS files written by image editors carry a raster copy of the image next to
//! the PostScript program, either as raw samples or as an ASCII85 wrapped JPEG,
//! and optionally a TIFF preview in a DOS binary header. This decoder reads the
//! raster copy and extracts the TIFF preview, it does not interpret PostScript.
use alloc::vec;
use alloc::vec::Vec;

use zune_core::bit_depth::BitDepth;
use zune_core::bytestream::{ZByteReaderTrait, ZCursor, ZReader, ZSeekFrom};
use zune_core::colorspace::ColorSpace;
use zune_core::log::{trace, warn};
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

use crate::ascii85::decode_ascii85;
use crate::constants::DataEncoding;
use crate::errors::{EpsDecodeErrors, Truncation};
use crate::header::{bytes_left, parse_header, EpsHeader};
use crate::preview::{read_binary_header, read_blob, EpsBinaryHeader, PreviewBlob};
use crate::profile::ColorProfileProvider;
use crate::raster::{copy_raster, decode_rows, PixelBuffer, RegionPlan, RegionSpec, RowLayout};

/// Where decoded samples come from
enum Source {
    /// Raw rows right after the data start marker
    Rows(RowLayout, ColorSpace),
    /// A fully decoded embedded JPEG
    Raster(PixelBuffer)
}

impl Source {
    fn dimensions(&self) -> (usize, usize) {
        match self {
            Source::Rows(layout, _) => (layout.width, layout.height),
            Source::Raster(raster) => (raster.width(), raster.height())
        }
    }

    fn colorspace(&self) -> ColorSpace {
        match self {
            Source::Rows(_, colorspace) => *colorspace,
            Source::Raster(raster) => raster.colorspace()
        }
    }
}

/// Location and expected size of an ASCII85 JPEG block
#[derive(Copy, Clone)]
struct EmbeddedBlock {
    offset: u64,
    length: Option<u64>,
    width:  usize,
    height: usize
}

/// An EPS decoder
///
/// The decoder reads the `%ImageData` raster of an EPS file and its
/// TIFF preview, if present.
///
/// # Example
/// ```no_run
/// use zune_core::bytestream::ZCursor;
/// use zune_eps::{EpsDecoder, RegionSpec};
///
/// let mut decoder = EpsDecoder::new(ZCursor::new(b""));
/// // whole image, interleaved
/// let pixels = decoder.decode().unwrap();
/// // every other pixel
/// let half = decoder
///     .decode_region(&RegionSpec::new().set_subsampling(2, 2))
///     .unwrap();
/// // raw TIFF bytes, if the file has a preview
/// let preview = decoder.read_preview().unwrap();
/// ```
pub struct EpsDecoder<T>
where
    T: ZByteReaderTrait
{
    stream:  ZReader<T>,
    options: DecoderOptions,
    header:  Option<EpsHeader>
}

impl<T> EpsDecoder<T>
where
    T: ZByteReaderTrait
{
    /// Create a new decoder reading an EPS file from `data`
    ///
    /// Default options are strict: signatures without an `EPSF-` version and
    /// `%ImageData` data type 0 are rejected. Use [`new_with_options`](Self::new_with_options)
    /// with `set_strict_mode(false)` to read such files.
    pub fn new(data: T) -> EpsDecoder<T> {
        Self::new_with_options(data, DecoderOptions::default())
    }

    /// Create a new decoder with options that influence decoding
    ///
    /// Respected options are the maximum width and height, strict mode,
    /// which rejects signatures without an `EPSF-` version and unknown data types,
    /// and the JPEG options for embedded JPEG streams.
    pub fn new_with_options(data: T, options: DecoderOptions) -> EpsDecoder<T> {
        EpsDecoder {
            stream: ZReader::new(data),
            options,
            header: None
        }
    }

    /// Decode the header from the current stream position
    ///
    /// Calling this again after it succeeded does nothing.
    pub fn decode_headers(&mut self) -> Result<(), EpsDecodeErrors> {
        if self.header.is_some() {
            return Ok(());
        }
        self.header = Some(parse_header(&mut self.stream, &self.options)?);

        Ok(())
    }

    /// The decoded header or `None` if headers haven't been decoded
    pub const fn header(&self) -> Option<&EpsHeader> {
        self.header.as_ref()
    }

    /// Image width and height or `None` if headers haven't been decoded
    ///
    /// For embedded JPEG streams these are the header values,
    /// the JPEG itself may disagree.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.header.as_ref().map(|h| (h.width(), h.height()))
    }

    /// Colorspace of decoded pixels, `None` if headers haven't been decoded
    /// or the image is in a mode that cannot be decoded
    pub fn colorspace(&self) -> Option<ColorSpace> {
        self.header.as_ref().and_then(EpsHeader::output_colorspace)
    }

    /// Bit depth of decoded pixels, always eight
    pub const fn bit_depth(&self) -> BitDepth {
        BitDepth::Eight
    }

    /// The ICC profile decoded pixels are in, looked up from `provider`
    ///
    /// Only CMYK images have a profile, `None` is returned for other images
    /// or if headers haven't been decoded.
    pub fn icc_profile<P>(&self, provider: &P) -> Option<Vec<u8>>
    where
        P: ColorProfileProvider + ?Sized
    {
        let name = self.header.as_ref()?.profile_name()?;
        provider.profile(name)
    }

    /// Decode the whole image into interleaved 8-bit samples
    pub fn decode(&mut self) -> Result<Vec<u8>, EpsDecodeErrors> {
        self.decode_region(&RegionSpec::default())
            .map(PixelBuffer::into_raw)
    }

    /// Decode the part of the image described by `spec` into a new buffer
    ///
    /// The buffer is just big enough for the offset and subsampled region,
    /// and may not exceed the maximum width and height of the decoder options.
    pub fn decode_region(&mut self, spec: &RegionSpec) -> Result<PixelBuffer, EpsDecodeErrors> {
        let source = self.open_source()?;
        let (width, height) = source.dimensions();
        let colorspace = source.colorspace();

        let plan = RegionPlan::new(spec, width, height, colorspace.num_components())?;

        let (dest_width, dest_height) = plan.destination_dimensions();
        if dest_width > self.options.max_width() || dest_height > self.options.max_height() {
            return Err(EpsDecodeErrors::InvalidRegionSpec(
                "destination is larger than the maximum image dimensions"
            ));
        }
        let mut dest = plan.allocate(colorspace)?;

        self.fill(source, &plan, &mut dest)?;

        Ok(dest)
    }

    /// Decode the part of the image described by `spec` into `dest`
    ///
    /// Pixels that fall outside `dest` are dropped, samples of `dest`
    /// not covered by the region are left untouched.
    pub fn decode_into(
        &mut self, spec: &RegionSpec, dest: &mut PixelBuffer
    ) -> Result<(), EpsDecodeErrors> {
        let source = self.open_source()?;
        let (width, height) = source.dimensions();

        let plan = RegionPlan::new(spec, width, height, source.colorspace().num_components())?;
        plan.check_destination(dest)?;

        self.fill(source, &plan, dest)
    }

    /// Read the DOS EPS binary header, `None` if the file doesn't start with one
    ///
    /// The stream position is restored afterwards.
    pub fn binary_header(&mut self) -> Result<Option<EpsBinaryHeader>, EpsDecodeErrors> {
        let position = self.stream.position()?;
        let header = read_binary_header(&mut self.stream);
        self.stream.seek(ZSeekFrom::Start(position))?;

        header
    }

    /// Location of the TIFF preview, `None` if there isn't one
    pub fn preview_location(&mut self) -> Result<Option<PreviewBlob>, EpsDecodeErrors> {
        Ok(self
            .binary_header()?
            .and_then(|header| header.tiff_preview()))
    }

    /// Raw bytes of the embedded TIFF preview, `None` if there isn't one
    ///
    /// The bytes form a standalone TIFF file. The stream position is restored afterwards.
    pub fn read_preview(&mut self) -> Result<Option<Vec<u8>>, EpsDecodeErrors> {
        let Some(blob) = self.preview_location()? else {
            return Ok(None);
        };
        let position = self.stream.position()?;
        let data = read_blob(&mut self.stream, blob);
        self.stream.seek(ZSeekFrom::Start(position))?;

        data.map(Some)
    }

    /// Decode headers if needed and position the stream at the image data
    fn open_source(&mut self) -> Result<Source, EpsDecodeErrors> {
        self.decode_headers()?;

        let header = self
            .header
            .as_ref()
            .ok_or(EpsDecodeErrors::Generic("headers not decoded"))?;

        self.stream.seek(ZSeekFrom::Start(header.data_start()))?;

        match header.data_encoding() {
            DataEncoding::Binary => {
                let mode = header.color_mode();
                let colorspace = mode
                    .colorspace()
                    .ok_or(EpsDecodeErrors::UnsupportedColorMode(mode as u32))?;

                let layout = RowLayout {
                    width:   header.width(),
                    height:  header.height(),
                    bands:   colorspace.num_components(),
                    padding: header.padding_bands()
                };
                Ok(Source::Rows(layout, colorspace))
            }
            encoding @ (DataEncoding::Ascii85JpegCMYK | DataEncoding::Ascii85JpegRGB) => {
                let colorspace = encoding
                    .jpeg_colorspace()
                    .ok_or(EpsDecodeErrors::UnsupportedEncoding(encoding as u32))?;

                let block = EmbeddedBlock {
                    offset: header.data_start(),
                    length: header.binary_block_length(),
                    width:  header.width(),
                    height: header.height()
                };
                self.decode_embedded_jpeg(block, colorspace)
                    .map(Source::Raster)
            }
        }
    }

    fn decode_embedded_jpeg(
        &mut self, block: EmbeddedBlock, colorspace: ColorSpace
    ) -> Result<PixelBuffer, EpsDecodeErrors> {
        let length = block.length.ok_or(EpsDecodeErrors::MissingHeaderFields(
            "%%BeginBinary length is needed for JPEG data"
        ))?;
        let truncated = || {
            EpsDecodeErrors::TruncatedData(Truncation::Block {
                offset: block.offset,
                length
            })
        };
        // the announced length is checked against the stream before allocating
        if length > bytes_left(&mut self.stream)? {
            return Err(truncated());
        }
        let size = usize::try_from(length).map_err(|_| truncated())?;

        let mut data = vec![0_u8; size];
        if self.stream.read_exact_bytes(&mut data).is_err() {
            return Err(truncated());
        }
        let jpeg = decode_ascii85(&data)?;

        trace!("Embedded JPEG: {} bytes", jpeg.len());

        let options = self.options.jpeg_set_out_colorspace(colorspace);
        let mut decoder = JpegDecoder::new_with_options(ZCursor::new(jpeg.as_slice()), options);
        let pixels = decoder.decode()?;

        let (width, height) = decoder
            .dimensions()
            .ok_or(EpsDecodeErrors::Generic("JPEG decoder returned no dimensions"))?;

        if (width, height) != (block.width, block.height) {
            warn!(
                "Embedded JPEG is {}x{} but header says {}x{}, using JPEG dimensions",
                width,
                height,
                block.width,
                block.height
            );
        }
        PixelBuffer::from_raw(width, height, colorspace, pixels)
    }

    fn fill(
        &mut self, source: Source, plan: &RegionPlan, dest: &mut PixelBuffer
    ) -> Result<(), EpsDecodeErrors> {
        match source {
            Source::Rows(layout, _) => decode_rows(&mut self.stream, layout, plan, dest),
            Source::Raster(raster) => {
                copy_raster(&raster, plan, dest);
                Ok(())
            }
        }
    }
}
