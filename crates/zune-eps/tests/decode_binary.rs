/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_core::bytestream::ZCursor;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_eps::errors::{EpsDecodeErrors, Truncation};
use zune_eps::{ColorMode, DataEncoding, EpsDecoder, PixelBuffer, Rect, RegionSpec, CMYK_PROFILE_NAME};

const MARKER: &str = "beginimage";

/// An EPS file with an `%ImageData` raster made of `samples`
fn eps_file(width: usize, height: usize, mode: u32, padding: usize, samples: &[u8]) -> Vec<u8> {
    let mut file = Vec::new();

    file.extend_from_slice(b"%!PS-Adobe-3.0 EPSF-3.0\n");
    file.extend_from_slice(b"%%Creator: zune-eps tests\n");
    file.extend_from_slice(format!("%%BoundingBox: 0 0 {width} {height}\n").as_bytes());
    file.extend_from_slice(
        format!("%ImageData: {width} {height} 8 {mode} {padding} 1 1 \"{MARKER}\"\n").as_bytes()
    );
    file.extend_from_slice(format!("%%BeginBinary: {}\n", samples.len()).as_bytes());
    file.extend_from_slice(format!("{MARKER}\n").as_bytes());
    file.extend_from_slice(samples);
    file.extend_from_slice(b"\n%%EndBinary\n%%EOF\n");
    file
}

/// Gray samples numbered in raster order
fn numbered(width: usize, height: usize) -> Vec<u8> {
    (0..width * height).map(|i| i as u8).collect()
}

/// Band planar rows for a 2x2 RGB image, red = 10 + i, green = 20 + i, blue = 30 + i
fn rgb_2x2() -> Vec<u8> {
    vec![
        10, 11, 20, 21, 30, 31, // row 0
        12, 13, 22, 23, 32, 33, // row 1
    ]
}

#[test]
fn header_of_photoshop_example() {
    let mut file = Vec::new();
    file.extend_from_slice(b"%!PS-Adobe-3.0 EPSF-3.0\n");
    file.extend_from_slice(b"%ImageData: 354 280 8 3 0 1 0 \"beginningoftheimage\"\n");
    file.extend_from_slice(b"beginningoftheimage\n");

    let options = DecoderOptions::default().set_strict_mode(false);
    let mut decoder = EpsDecoder::new_with_options(ZCursor::new(file), options);
    decoder.decode_headers().unwrap();

    let header = decoder.header().unwrap();
    assert_eq!(header.width(), 354);
    assert_eq!(header.height(), 280);
    assert_eq!(header.color_mode(), ColorMode::RGB);
    assert_eq!(header.padding_bands(), 0);
    assert_eq!(header.data_encoding(), DataEncoding::Binary);
    assert_eq!(header.binary_block_length(), None);
    assert_eq!(decoder.dimensions(), Some((354, 280)));
    assert_eq!(decoder.colorspace(), Some(ColorSpace::RGB));
}

#[test]
fn missing_image_data() {
    let file = b"%!PS-Adobe-3.0 EPSF-3.0\n%%BoundingBox: 0 0 10 10\nshowpage\n%%EOF\n";
    let mut decoder = EpsDecoder::new(ZCursor::new(file));

    let err = decoder.decode_headers().unwrap_err();
    assert!(matches!(err, EpsDecodeErrors::MissingHeaderFields(_)));
}

#[test]
fn missing_signature() {
    let mut decoder = EpsDecoder::new(ZCursor::new(b"%ImageData: 1 1 8 1 0 1 1 \"x\"\nx\n0"));

    let err = decoder.decode_headers().unwrap_err();
    assert!(matches!(err, EpsDecodeErrors::MalformedSignature(_)));
}

#[test]
fn plain_postscript_needs_lenient_mode() {
    let file = b"%!PS-Adobe-3.0\n%ImageData: 1 1 8 1 0 1 1 \"x\"\nx\n\x7f".to_vec();

    let mut strict = EpsDecoder::new(ZCursor::new(file.clone()));
    assert!(matches!(
        strict.decode_headers(),
        Err(EpsDecodeErrors::MalformedSignature(_))
    ));

    let options = DecoderOptions::default().set_strict_mode(false);
    let mut lenient = EpsDecoder::new_with_options(ZCursor::new(file), options);
    assert_eq!(lenient.decode().unwrap(), [0x7f]);
}

#[test]
fn leading_bytes_before_signature() {
    let mut file = b"\x04garbage\r\n".to_vec();
    file.extend(eps_file(2, 1, 1, 0, &[5, 6]));

    let mut decoder = EpsDecoder::new(ZCursor::new(file));
    assert_eq!(decoder.decode().unwrap(), [5, 6]);
    assert_eq!(
        decoder.header().unwrap().signature(),
        "%!PS-Adobe-3.0 EPSF-3.0"
    );
}

#[test]
fn crlf_line_endings() {
    let file = b"%!PS-Adobe-3.0 EPSF-3.0\r\n%ImageData: 2 1 8 1 0 1 1 \"Go\"\r\ngo\r\n\x01\x02".to_vec();

    let mut decoder = EpsDecoder::new(ZCursor::new(file));
    assert_eq!(decoder.decode().unwrap(), [1, 2]);
}

#[test]
fn rgb_rows_are_band_planar() {
    let mut decoder = EpsDecoder::new(ZCursor::new(eps_file(2, 2, 3, 0, &rgb_2x2())));

    assert_eq!(
        decoder.decode().unwrap(),
        [10, 20, 30, 11, 21, 31, 12, 22, 32, 13, 23, 33]
    );
}

#[test]
fn padding_bands_are_dropped() {
    // 2x1 CMYK with one padding band
    let samples = [1, 2, 3, 4, 5, 6, 7, 8, 99, 99];
    let mut decoder = EpsDecoder::new(ZCursor::new(eps_file(2, 1, 4, 1, &samples)));

    assert_eq!(decoder.decode().unwrap(), [1, 3, 5, 7, 2, 4, 6, 8]);
    assert_eq!(decoder.colorspace(), Some(ColorSpace::CMYK));
}

#[test]
fn subsampling_keeps_even_pixels() {
    let mut decoder = EpsDecoder::new(ZCursor::new(eps_file(4, 4, 1, 0, &numbered(4, 4))));

    let pixels = decoder
        .decode_region(&RegionSpec::new().set_subsampling(2, 2))
        .unwrap();

    assert_eq!((pixels.width(), pixels.height()), (2, 2));
    assert_eq!(pixels.colorspace(), ColorSpace::Luma);
    // source (0,0), (2,0), (0,2), (2,2)
    assert_eq!(pixels.data(), [0, 2, 8, 10]);
}

#[test]
fn source_region_is_clipped() {
    let mut decoder = EpsDecoder::new(ZCursor::new(eps_file(4, 4, 1, 0, &numbered(4, 4))));

    let spec = RegionSpec::new().set_source_region(Rect::new(2, 1, 10, 2));
    let pixels = decoder.decode_region(&spec).unwrap();

    assert_eq!((pixels.width(), pixels.height()), (2, 2));
    assert_eq!(pixels.data(), [6, 7, 10, 11]);
}

#[test]
fn blue_band_extraction() {
    let mut decoder = EpsDecoder::new(ZCursor::new(eps_file(2, 2, 3, 0, &rgb_2x2())));

    let spec = RegionSpec::new()
        .set_source_bands(vec![2])
        .set_destination_bands(vec![0]);
    let pixels = decoder.decode_region(&spec).unwrap();

    assert_eq!(pixels.bands(), 1);
    assert_eq!(pixels.data(), [30, 31, 32, 33]);
}

#[test]
fn band_swap_into_existing_buffer() {
    let mut decoder = EpsDecoder::new(ZCursor::new(eps_file(2, 2, 3, 0, &rgb_2x2())));

    let mut dest = PixelBuffer::new(3, 3, ColorSpace::RGB).unwrap();
    let spec = RegionSpec::new()
        .set_destination_bands(vec![2, 1, 0])
        .set_destination_offset(1, 1);
    decoder.decode_into(&spec, &mut dest).unwrap();

    assert_eq!(dest.pixel(0, 0), Some(&[0, 0, 0][..]));
    assert_eq!(dest.pixel(1, 1), Some(&[30, 20, 10][..]));
    assert_eq!(dest.pixel(2, 2), Some(&[33, 23, 13][..]));
}

#[test]
fn destination_too_small_for_bands() {
    let mut decoder = EpsDecoder::new(ZCursor::new(eps_file(2, 2, 3, 0, &rgb_2x2())));

    let mut dest = PixelBuffer::new(2, 2, ColorSpace::Luma).unwrap();
    let err = decoder
        .decode_into(&RegionSpec::new(), &mut dest)
        .unwrap_err();

    assert!(matches!(err, EpsDecodeErrors::InvalidRegionSpec(_)));
}

#[test]
fn rows_past_small_destination_are_not_needed() {
    // only the first two rows are present, the destination holds two rows
    let samples = numbered(4, 2);
    let mut file = eps_file(4, 4, 1, 0, &samples);
    let end = file.len() - b"\n%%EndBinary\n%%EOF\n".len();
    file.truncate(end);

    let mut decoder = EpsDecoder::new(ZCursor::new(file));
    let mut dest = PixelBuffer::new(4, 1, ColorSpace::Luma).unwrap();
    decoder.decode_into(&RegionSpec::new(), &mut dest).unwrap();

    assert_eq!(dest.data(), [0, 1, 2, 3]);
}

#[test]
fn truncated_row_is_reported() {
    let samples = numbered(4, 4);
    let mut file = eps_file(4, 4, 1, 0, &samples[..10]);
    let end = file.len() - b"\n%%EndBinary\n%%EOF\n".len();
    file.truncate(end);

    let mut decoder = EpsDecoder::new(ZCursor::new(file));
    let err = decoder.decode().unwrap_err();

    assert!(matches!(
        err,
        EpsDecodeErrors::TruncatedData(Truncation::Row(2))
    ));
}

#[test]
fn lab_is_not_decoded() {
    let mut decoder = EpsDecoder::new(ZCursor::new(eps_file(1, 1, 2, 0, &[0, 0, 0])));

    decoder.decode_headers().unwrap();
    assert_eq!(decoder.colorspace(), None);

    let err = decoder.decode().unwrap_err();
    assert!(matches!(err, EpsDecodeErrors::UnsupportedColorMode(2)));
}

#[test]
fn too_wide_image() {
    let options = DecoderOptions::default().set_max_width(8);
    let mut decoder =
        EpsDecoder::new_with_options(ZCursor::new(eps_file(16, 1, 1, 0, &[0; 16])), options);

    let err = decoder.decode_headers().unwrap_err();
    assert!(matches!(err, EpsDecodeErrors::LargeDimensions(8, 16)));
}

#[test]
fn repeated_decoding() {
    let mut decoder = EpsDecoder::new(ZCursor::new(eps_file(4, 4, 1, 0, &numbered(4, 4))));

    let first = decoder.decode().unwrap();
    let start = decoder.header().unwrap().data_start();
    let second = decoder.decode().unwrap();

    assert_eq!(first, second);
    assert_eq!(decoder.header().unwrap().data_start(), start);
}

#[test]
fn cmyk_profile_lookup() {
    let provider = |name: &str| (name == CMYK_PROFILE_NAME).then(|| b"icc".to_vec());

    let mut cmyk = EpsDecoder::new(ZCursor::new(eps_file(1, 1, 4, 0, &[1, 2, 3, 4])));
    assert_eq!(cmyk.icc_profile(&provider), None);
    cmyk.decode_headers().unwrap();
    assert_eq!(cmyk.icc_profile(&provider), Some(b"icc".to_vec()));

    let mut rgb = EpsDecoder::new(ZCursor::new(eps_file(1, 1, 3, 0, &[1, 2, 3])));
    rgb.decode_headers().unwrap();
    assert_eq!(rgb.icc_profile(&provider), None);
}

#[test]
fn huge_padding_is_not_allocated() {
    let file = b"%!PS-Adobe-3.0 EPSF-3.0\n%ImageData: 16384 1 8 1 4000000000 1 1 \"x\"\nx\n0123";
    let mut decoder = EpsDecoder::new(ZCursor::new(file));

    let err = decoder.decode().unwrap_err();
    assert!(matches!(
        err,
        EpsDecodeErrors::TruncatedData(Truncation::Row(0))
    ));
}

#[test]
fn overflowing_row_stride() {
    let file = format!(
        "%!PS-Adobe-3.0 EPSF-3.0\n%ImageData: 2 1 8 3 {} 1 1 \"x\"\nx\n012345",
        usize::MAX
    );
    let mut decoder = EpsDecoder::new(ZCursor::new(file.into_bytes()));

    let err = decoder.decode().unwrap_err();
    assert!(matches!(
        err,
        EpsDecodeErrors::TruncatedData(Truncation::Row(0))
    ));
}

#[test]
fn oversized_destination_offset() {
    let mut decoder = EpsDecoder::new(ZCursor::new(eps_file(4, 4, 1, 0, &numbered(4, 4))));

    let overflow = RegionSpec::new().set_destination_offset(usize::MAX, 0);
    assert!(matches!(
        decoder.decode_region(&overflow),
        Err(EpsDecodeErrors::InvalidRegionSpec(_))
    ));

    let mut dest = PixelBuffer::new(4, 4, ColorSpace::Luma).unwrap();
    let overflow = RegionSpec::new().set_destination_offset(0, usize::MAX);
    assert!(matches!(
        decoder.decode_into(&overflow, &mut dest),
        Err(EpsDecodeErrors::InvalidRegionSpec(_))
    ));

    let past_limits = RegionSpec::new().set_destination_offset(1 << 40, 1 << 40);
    assert!(matches!(
        decoder.decode_region(&past_limits),
        Err(EpsDecodeErrors::InvalidRegionSpec(_))
    ));

    // the decoder still works afterwards
    assert_eq!(decoder.decode().unwrap(), numbered(4, 4));
}

#[test]
fn pixel_buffer_size_overflow() {
    assert!(PixelBuffer::new(usize::MAX, 2, ColorSpace::RGB).is_err());
    assert!(PixelBuffer::from_raw(usize::MAX, 2, ColorSpace::Luma, vec![0; 2]).is_err());
}

#[test]
fn data_type_zero_rejected_by_default() {
    let file = b"%!PS-Adobe-3.0 EPSF-3.0\n%ImageData: 354 280 8 3 0 1 0 \"beginningoftheimage\"\nbeginningoftheimage\n";
    let mut decoder = EpsDecoder::new(ZCursor::new(file));

    let err = decoder.decode_headers().unwrap_err();
    assert!(matches!(err, EpsDecodeErrors::UnsupportedEncoding(0)));
}
