/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! DOS EPS binary header and TIFF preview extraction
//!
//! Some producers wrap the PostScript program in a 30 byte binary header:
//!
//! | offset | size | field                    |
//! |--------|------|--------------------------|
//! | 0      | 4    | `C5 D0 D3 C6`            |
//! | 4      | 4    | PostScript section start |
//! | 8      | 4    | PostScript section size  |
//! | 12     | 4    | WMF preview start        |
//! | 16     | 4    | WMF preview size         |
//! | 20     | 4    | TIFF preview start       |
//! | 24     | 4    | TIFF preview size        |
//! | 28     | 2    | checksum                 |
//!
//! Fields are stored byte reversed relative to big endian, i.e little endian.
use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use zune_core::bytestream::{ZByteReaderTrait, ZReader, ZSeekFrom};
use zune_core::log::trace;

use crate::constants::{EPS_BINARY_HEADER_MAGIC, EPS_BINARY_HEADER_SIZE};
use crate::errors::EpsDecodeErrors;
use crate::header::bytes_left;

/// Byte range of an embedded TIFF preview
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PreviewBlob {
    pub offset: u64,
    pub length: u64
}

/// The DOS EPS binary header
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EpsBinaryHeader {
    pub postscript_offset: u32,
    pub postscript_length: u32,
    pub wmf_offset:        u32,
    pub wmf_length:        u32,
    pub tiff_offset:       u32,
    pub tiff_length:       u32,
    pub checksum:          u16
}

fn reversed_u32(bytes: &[u8; EPS_BINARY_HEADER_SIZE], offset: usize) -> u32 {
    let mut field = [0; 4];
    field.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_be_bytes(field).swap_bytes()
}

impl EpsBinaryHeader {
    /// Parse a binary header, `None` if the magic bytes don't match
    pub fn from_bytes(bytes: &[u8; EPS_BINARY_HEADER_SIZE]) -> Option<EpsBinaryHeader> {
        if bytes[..4] != EPS_BINARY_HEADER_MAGIC {
            return None;
        }
        Some(EpsBinaryHeader {
            postscript_offset: reversed_u32(bytes, 4),
            postscript_length: reversed_u32(bytes, 8),
            wmf_offset:        reversed_u32(bytes, 12),
            wmf_length:        reversed_u32(bytes, 16),
            tiff_offset:       reversed_u32(bytes, 20),
            tiff_length:       reversed_u32(bytes, 24),
            checksum:          u16::from_le_bytes([bytes[28], bytes[29]])
        })
    }

    /// The TIFF preview range, `None` when the header only carries a WMF preview
    pub fn tiff_preview(&self) -> Option<PreviewBlob> {
        if self.tiff_offset == 0 || self.tiff_length == 0 {
            return None;
        }
        Some(PreviewBlob {
            offset: u64::from(self.tiff_offset),
            length: u64::from(self.tiff_length)
        })
    }
}

/// Read the binary header at the start of the stream, if there is one
pub(crate) fn read_binary_header<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>
) -> Result<Option<EpsBinaryHeader>, EpsDecodeErrors> {
    stream.seek(ZSeekFrom::Start(0))?;

    let mut magic = [0; 4];

    if stream.read_exact_bytes(&mut magic).is_err() || magic != EPS_BINARY_HEADER_MAGIC {
        return Ok(None);
    }
    stream.seek(ZSeekFrom::Start(0))?;

    let mut bytes = [0; EPS_BINARY_HEADER_SIZE];
    stream.read_exact_bytes(&mut bytes).map_err(|_| {
        EpsDecodeErrors::PreviewExtractionFailed(format!(
            "binary header is shorter than {EPS_BINARY_HEADER_SIZE} bytes"
        ))
    })?;

    let header = EpsBinaryHeader::from_bytes(&bytes);

    trace!("EPS binary header: {:?}", header);

    Ok(header)
}

/// Read the bytes of `blob`
pub(crate) fn read_blob<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>, blob: PreviewBlob
) -> Result<Vec<u8>, EpsDecodeErrors> {
    let failed = || {
        EpsDecodeErrors::PreviewExtractionFailed(format!(
            "expected {} bytes of TIFF data at offset {}",
            blob.length, blob.offset
        ))
    };
    let length = usize::try_from(blob.length).map_err(|_| failed())?;

    stream
        .seek(ZSeekFrom::Start(blob.offset))
        .map_err(|_| failed())?;

    if blob.length > bytes_left(stream).map_err(|_| failed())? {
        return Err(failed());
    }
    let mut data = vec![0; length];
    stream.read_exact_bytes(&mut data).map_err(|_| failed())?;

    Ok(data)
}
