/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Pixel buffers and region decoding
//!
//! Decoding walks the source one row at a time and hands every kept row to a
//! [`RegionPlan`], which applies the source region, subsampling and band
//! selection of a [`RegionSpec`] while copying into the destination.
use alloc::vec;
use alloc::vec::Vec;
use core::num::NonZeroU32;

use zune_core::bytestream::{ZByteReaderTrait, ZReader};
use zune_core::colorspace::ColorSpace;

use crate::errors::{EpsDecodeErrors, Truncation};
use crate::header::bytes_left;

/// A rectangle in pixel coordinates
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Rect {
    pub x:      usize,
    pub y:      usize,
    pub width:  usize,
    pub height: usize
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Rect {
        Rect {
            x,
            y,
            width,
            height
        }
    }

    /// Intersect with `[0, width) x [0, height)`
    pub fn clip(&self, width: usize, height: usize) -> Rect {
        let x = self.x.min(width);
        let y = self.y.min(height);

        Rect {
            x,
            y,
            width: self.x.saturating_add(self.width).min(width) - x,
            height: self.y.saturating_add(self.height).min(height) - y
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Which part of the image to decode, and where to put it
///
/// The default decodes the whole image with all bands into a buffer of the same size.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegionSpec {
    source_region:      Option<Rect>,
    destination_offset: (usize, usize),
    subsampling:        (usize, usize),
    source_bands:       Option<Vec<usize>>,
    destination_bands:  Option<Vec<usize>>
}

impl Default for RegionSpec {
    fn default() -> Self {
        RegionSpec {
            source_region:      None,
            destination_offset: (0, 0),
            subsampling:        (1, 1),
            source_bands:       None,
            destination_bands:  None
        }
    }
}

impl RegionSpec {
    pub fn new() -> RegionSpec {
        RegionSpec::default()
    }
    /// Decode only this part of the source, it is clipped to the image
    pub fn set_source_region(mut self, region: Rect) -> Self {
        self.source_region = Some(region);
        self
    }
    /// Where the first decoded pixel lands in the destination
    pub fn set_destination_offset(mut self, x: usize, y: usize) -> Self {
        self.destination_offset = (x, y);
        self
    }
    /// Keep every `x`th column and `y`th row of the source region
    pub fn set_subsampling(mut self, x: usize, y: usize) -> Self {
        self.subsampling = (x, y);
        self
    }
    /// Source bands to read, in order
    pub fn set_source_bands(mut self, bands: Vec<usize>) -> Self {
        self.source_bands = Some(bands);
        self
    }
    /// Destination bands the read bands are written to, in order
    pub fn set_destination_bands(mut self, bands: Vec<usize>) -> Self {
        self.destination_bands = Some(bands);
        self
    }
    pub const fn source_region(&self) -> Option<Rect> {
        self.source_region
    }
    pub const fn destination_offset(&self) -> (usize, usize) {
        self.destination_offset
    }
    pub const fn subsampling(&self) -> (usize, usize) {
        self.subsampling
    }
    pub fn source_bands(&self) -> Option<&[usize]> {
        self.source_bands.as_deref()
    }
    pub fn destination_bands(&self) -> Option<&[usize]> {
        self.destination_bands.as_deref()
    }
}

fn buffer_size(width: usize, height: usize, colorspace: ColorSpace) -> Option<usize> {
    width
        .checked_mul(height)?
        .checked_mul(colorspace.num_components())
}

/// Interleaved 8-bit pixels
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PixelBuffer {
    width:      usize,
    height:     usize,
    colorspace: ColorSpace,
    data:       Vec<u8>
}

impl PixelBuffer {
    /// A zero filled buffer
    ///
    /// # Errors
    /// If the buffer size overflows or cannot be allocated
    pub fn new(
        width: usize, height: usize, colorspace: ColorSpace
    ) -> Result<PixelBuffer, EpsDecodeErrors> {
        let size = buffer_size(width, height, colorspace)
            .ok_or(EpsDecodeErrors::Generic("pixel buffer size overflows"))?;

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| EpsDecodeErrors::Generic("pixel buffer cannot be allocated"))?;
        data.resize(size, 0);

        Ok(PixelBuffer {
            width,
            height,
            colorspace,
            data
        })
    }

    /// Wrap existing interleaved samples
    ///
    /// # Errors
    /// If `data` doesn't hold exactly `width * height * components` samples
    pub fn from_raw(
        width: usize, height: usize, colorspace: ColorSpace, data: Vec<u8>
    ) -> Result<PixelBuffer, EpsDecodeErrors> {
        if buffer_size(width, height, colorspace) != Some(data.len()) {
            return Err(EpsDecodeErrors::Generic(
                "pixel data does not match dimensions and colorspace"
            ));
        }
        Ok(PixelBuffer {
            width,
            height,
            colorspace,
            data
        })
    }

    pub const fn width(&self) -> usize {
        self.width
    }
    pub const fn height(&self) -> usize {
        self.height
    }
    pub const fn colorspace(&self) -> ColorSpace {
        self.colorspace
    }
    pub const fn bands(&self) -> usize {
        self.colorspace.num_components()
    }
    pub fn data(&self) -> &[u8] {
        &self.data
    }
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Sample at `(x, y)` in `band`, or `None` when out of bounds
    pub fn get(&self, x: usize, y: usize, band: usize) -> Option<u8> {
        let bands = self.bands();

        if x >= self.width || y >= self.height || band >= bands {
            return None;
        }
        self.data.get((y * self.width + x) * bands + band).copied()
    }

    /// All bands of the pixel at `(x, y)`
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        let bands = self.bands();

        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * bands;
        self.data.get(start..start + bands)
    }

    fn row(&self, y: usize) -> &[u8] {
        let stride = self.width * self.bands();
        &self.data[y * stride..(y + 1) * stride]
    }
}

/// What to do with a source row
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum RowAction {
    Skip,
    /// Copy into this destination row
    Write(usize),
    /// Past the destination, no later row can land in it
    Stop
}

/// A [`RegionSpec`] resolved against a concrete source
#[derive(Clone, Debug)]
pub(crate) struct RegionPlan {
    region:      Rect,
    x_period:    usize,
    y_period:    usize,
    offset_x:    usize,
    offset_y:    usize,
    dest_width:  usize,
    dest_height: usize,
    /// (source band, destination band) pairs
    bands:       Vec<(usize, usize)>
}

impl RegionPlan {
    pub(crate) fn new(
        spec: &RegionSpec, width: usize, height: usize, source_bands: usize
    ) -> Result<RegionPlan, EpsDecodeErrors> {
        let (x_period, y_period) = spec.subsampling;

        if x_period == 0 || y_period == 0 {
            return Err(EpsDecodeErrors::InvalidRegionSpec(
                "subsampling periods must be at least 1"
            ));
        }
        let region = spec
            .source_region
            .map_or(Rect::new(0, 0, width, height), |r| r.clip(width, height));

        if region.is_empty() {
            return Err(EpsDecodeErrors::InvalidRegionSpec(
                "source region does not intersect the image"
            ));
        }

        let bands: Vec<(usize, usize)> = match (&spec.source_bands, &spec.destination_bands) {
            (None, None) => (0..source_bands).map(|band| (band, band)).collect(),
            (Some(src), None) => src.iter().copied().zip(0..).collect(),
            (None, Some(dst)) => {
                if dst.len() != source_bands {
                    return Err(EpsDecodeErrors::InvalidRegionSpec(
                        "destination bands must name every source band"
                    ));
                }
                (0..source_bands).zip(dst.iter().copied()).collect()
            }
            (Some(src), Some(dst)) => {
                if src.len() != dst.len() {
                    return Err(EpsDecodeErrors::InvalidRegionSpec(
                        "source and destination band selections differ in length"
                    ));
                }
                src.iter().copied().zip(dst.iter().copied()).collect()
            }
        };

        if bands.is_empty() {
            return Err(EpsDecodeErrors::InvalidRegionSpec("no bands selected"));
        }
        if bands.iter().any(|(src, _)| *src >= source_bands) {
            return Err(EpsDecodeErrors::InvalidRegionSpec(
                "source band index out of range"
            ));
        }

        let (offset_x, offset_y) = spec.destination_offset;
        let too_large = || EpsDecodeErrors::InvalidRegionSpec("destination offset is too large");

        let dest_width = offset_x
            .checked_add(region.width.div_ceil(x_period))
            .ok_or_else(too_large)?;
        let dest_height = offset_y
            .checked_add(region.height.div_ceil(y_period))
            .ok_or_else(too_large)?;

        Ok(RegionPlan {
            region,
            x_period,
            y_period,
            offset_x,
            offset_y,
            dest_width,
            dest_height,
            bands
        })
    }

    /// Smallest destination holding the whole decoded region
    pub(crate) const fn destination_dimensions(&self) -> (usize, usize) {
        (self.dest_width, self.dest_height)
    }

    /// Number of bands a destination needs for every selected band to fit
    pub(crate) fn destination_bands(&self) -> usize {
        self.bands.iter().map(|(_, dst)| dst + 1).max().unwrap_or(0)
    }

    /// Create a destination for this plan, keeping the source colorspace
    /// when the band count allows it
    pub(crate) fn allocate(&self, source: ColorSpace) -> Result<PixelBuffer, EpsDecodeErrors> {
        let (width, height) = self.destination_dimensions();
        let bands = self.destination_bands();

        let colorspace = if bands == source.num_components() {
            source
        } else if bands == 1 {
            ColorSpace::Luma
        } else {
            u32::try_from(bands)
                .ok()
                .and_then(NonZeroU32::new)
                .map_or(ColorSpace::Unknown, ColorSpace::MultiBand)
        };
        PixelBuffer::new(width, height, colorspace)
            .map_err(|_| EpsDecodeErrors::InvalidRegionSpec("destination does not fit in memory"))
    }

    pub(crate) fn check_destination(&self, dest: &PixelBuffer) -> Result<(), EpsDecodeErrors> {
        if self.destination_bands() > dest.bands() {
            return Err(EpsDecodeErrors::InvalidRegionSpec(
                "destination band index out of range"
            ));
        }
        Ok(())
    }

    pub(crate) fn row_action(&self, y: usize, dest_height: usize) -> RowAction {
        if y < self.region.y || y >= self.region.y + self.region.height {
            return RowAction::Skip;
        }
        let delta = y - self.region.y;

        if delta % self.y_period != 0 {
            return RowAction::Skip;
        }
        let dest_y = self.offset_y + delta / self.y_period;

        if dest_y >= dest_height {
            return RowAction::Stop;
        }
        RowAction::Write(dest_y)
    }

    /// Copy one kept source row into `dest_y`, `sample(x, band)` reads the source
    pub(crate) fn copy_row<F>(&self, dest_y: usize, dest: &mut PixelBuffer, sample: F)
    where
        F: Fn(usize, usize) -> u8
    {
        let bands = dest.bands();
        let width = dest.width;
        let row = &mut dest.data[dest_y * width * bands..(dest_y + 1) * width * bands];

        let columns = (self.region.x..self.region.x + self.region.width).step_by(self.x_period);

        for (i, src_x) in columns.enumerate() {
            let dest_x = self.offset_x + i;

            if dest_x >= width {
                break;
            }
            let pixel = &mut row[dest_x * bands..(dest_x + 1) * bands];

            for &(src_band, dest_band) in &self.bands {
                pixel[dest_band] = sample(src_x, src_band);
            }
        }
    }
}

/// Layout of raw sample rows
///
/// Each row holds `width` samples of band 0, then band 1 and so on,
/// followed by `padding` bands that are read and dropped.
#[derive(Copy, Clone, Debug)]
pub(crate) struct RowLayout {
    pub(crate) width:   usize,
    pub(crate) height:  usize,
    pub(crate) bands:   usize,
    pub(crate) padding: usize
}

/// Read every source row from `stream` and copy the kept ones into `dest`
///
/// Rows are always read in full so the stream stays aligned,
/// reading stops early once rows fall past the destination.
pub(crate) fn decode_rows<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>, layout: RowLayout, plan: &RegionPlan, dest: &mut PixelBuffer
) -> Result<(), EpsDecodeErrors> {
    let width = layout.width;
    let left = bytes_left(stream)?;

    // a row longer than the rest of the stream is never allocated
    let stride = layout
        .bands
        .checked_add(layout.padding)
        .and_then(|bands| bands.checked_mul(width))
        .filter(|stride| u64::try_from(*stride).is_ok_and(|stride| stride <= left))
        .ok_or(EpsDecodeErrors::TruncatedData(Truncation::Row(0)))?;

    let mut row = vec![0_u8; stride];

    for y in 0..layout.height {
        stream
            .read_exact_bytes(&mut row)
            .map_err(|_| EpsDecodeErrors::TruncatedData(Truncation::Row(y)))?;

        match plan.row_action(y, dest.height()) {
            RowAction::Skip => continue,
            RowAction::Stop => break,
            RowAction::Write(dest_y) => {
                plan.copy_row(dest_y, dest, |x, band| row[band * width + x]);
            }
        }
    }
    Ok(())
}

/// Copy the kept rows of an already decoded raster into `dest`
pub(crate) fn copy_raster(source: &PixelBuffer, plan: &RegionPlan, dest: &mut PixelBuffer) {
    let bands = source.bands();

    for y in 0..source.height() {
        match plan.row_action(y, dest.height()) {
            RowAction::Skip => continue,
            RowAction::Stop => break,
            RowAction::Write(dest_y) => {
                let row = source.row(y);
                plan.copy_row(dest_y, dest, |x, band| row[x * bands + band]);
            }
        }
    }
}
