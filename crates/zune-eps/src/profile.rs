/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec::Vec;

/// Source of named ICC color profiles
///
/// EPS files don't embed the profile of their CMYK samples, the decoder
/// asks for [`CMYK_PROFILE_NAME`](crate::CMYK_PROFILE_NAME) instead.
///
/// Any `Fn(&str) -> Option<Vec<u8>>` is a provider.
pub trait ColorProfileProvider {
    /// Raw ICC bytes of the profile called `name`
    fn profile(&self, name: &str) -> Option<Vec<u8>>;
}

impl<F> ColorProfileProvider for F
where
    F: Fn(&str) -> Option<Vec<u8>>
{
    fn profile(&self, name: &str) -> Option<Vec<u8>> {
        (self)(name)
    }
}
