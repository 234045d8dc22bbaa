// ppmaudio
// Copyright (c) 2024 The ppmaudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// `Nibble` represents the lower or upper 4 bits of a byte
#[derive(Copy, Clone)]
pub(crate) enum Nibble {
    Upper,
    Lower,
}

impl Nibble {
    pub fn get_nibble(&self, byte: u8) -> u8 {
        match self {
            Nibble::Upper => byte >> 4,
            Nibble::Lower => byte & 0x0F,
        }
    }

    pub fn set_nibble(&self, byte: u8, code: u8) -> u8 {
        match self {
            Nibble::Upper => (byte & 0x0F) | (code << 4),
            Nibble::Lower => (byte & 0xF0) | (code & 0x0F),
        }
    }
}

/// Exchanges the upper and lower nibble of a byte.
///
/// Flipnote Studio stores its ADPCM codes in the opposite nibble order to the codec, so every byte
/// passes through this transform on its way to and from the container. The transform is its own
/// inverse.
#[inline(always)]
pub fn swap_nibbles(byte: u8) -> u8 {
    (byte & 0x0F) << 4 | (byte >> 4)
}

/// Applies [`swap_nibbles`] to every byte of a buffer in-place.
pub fn swap_nibbles_in_place(buf: &mut [u8]) {
    buf.iter_mut().for_each(|byte| *byte = swap_nibbles(*byte));
}
