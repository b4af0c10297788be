/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! ASCII85 decoding for `%%BeginBinary` blocks
//!
//! Every five characters in the range `!`..`u` carry four bytes as a big-endian
//! base-85 number, `z` stands for four zero bytes and the stream ends at `~>`.
//! Whitespace may appear anywhere and is ignored.
use alloc::vec::Vec;

use crate::errors::{Ascii85Error, EpsDecodeErrors};

const GROUP_SIZE: usize = 5;
/// Digit value of `u`, used to pad a short final group
const MAX_DIGIT: u8 = b'u' - b'!';

const fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C | 0x00)
}

fn group_value(digits: &[u8; GROUP_SIZE], position: usize) -> Result<u32, Ascii85Error> {
    let value = digits
        .iter()
        .fold(0_u64, |acc, digit| acc * 85 + u64::from(*digit));

    u32::try_from(value).map_err(|_| Ascii85Error::GroupOverflow { position })
}

/// Decode an ASCII85 stream terminated by `~>`
///
/// Bytes after the terminator are not looked at.
///
/// # Errors
/// - [`MalformedAscii85`](EpsDecodeErrors::MalformedAscii85) on characters outside the
///   alphabet, a `z` inside a group, a `~` not followed by `>`, a group that does not fit
///   in 32 bits or input that ends without a terminator.
pub fn decode_ascii85(data: &[u8]) -> Result<Vec<u8>, EpsDecodeErrors> {
    let mut output = Vec::with_capacity(data.len() / GROUP_SIZE * 4 + 4);

    let mut digits = [0_u8; GROUP_SIZE];
    let mut count = 0;
    let mut position = 0;

    loop {
        let byte = *data.get(position).ok_or(Ascii85Error::UnexpectedEnd)?;

        match byte {
            b'!'..=b'u' => {
                digits[count] = byte - b'!';
                count += 1;

                if count == GROUP_SIZE {
                    let value = group_value(&digits, position)?;
                    output.extend_from_slice(&value.to_be_bytes());
                    count = 0;
                }
            }
            b'z' => {
                if count != 0 {
                    return Err(Ascii85Error::MisplacedZ { position }.into());
                }
                output.extend_from_slice(&[0; 4]);
            }
            b'~' => {
                // whitespace may separate the two terminator characters
                let next = data[position + 1..]
                    .iter()
                    .copied()
                    .find(|c| !is_whitespace(*c));

                if next != Some(b'>') {
                    return Err(Ascii85Error::BadTerminator { position }.into());
                }
                break;
            }
            c if is_whitespace(c) => {}
            _ => {
                return Err(Ascii85Error::InvalidCharacter { byte, position }.into());
            }
        }
        position += 1;
    }

    if count > 0 {
        // n leftover digits carry n - 1 bytes
        digits[count..].fill(MAX_DIGIT);

        let value = group_value(&digits, position)?;
        output.extend_from_slice(&value.to_be_bytes()[..count - 1]);
    }

    Ok(output)
}
