// ppmaudio
// Copyright (c) 2024 The ppmaudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `util` module provides a repository of commonly used utility functions sorted into
//! distinct categories.

pub mod clamp {
    //! Utilities for clamping numeric values to a defined range.

    /// Clamps the given value to the [-32_768, 32_767] range.
    #[inline]
    pub fn clamp_i16(val: i32) -> i16 {
        // Add 32_768 (0x8000) to map the valid i16 range onto [0, 65_535]. Any bit set above the
        // 16th bit means val was out of range, in which case the sign bit selects the limit.
        if val.wrapping_add(0x8000) & !0xffff == 0 {
            val as i16
        }
        else {
            0x7fff ^ val.wrapping_shr(31) as i16
        }
    }

    /// Converts a floating-point sample in the nominal [-1.0, 1.0] range to a 16-bit sample,
    /// saturating values outside of that range.
    #[inline]
    pub fn clamp_f32_to_i16(val: f32) -> i16 {
        clamp_i16((val * 32_767.0).round() as i32)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn verify_clamp_i16() {
            assert_eq!(clamp_i16(0), 0);
            assert_eq!(clamp_i16(-1), -1);
            assert_eq!(clamp_i16(32_767), i16::MAX);
            assert_eq!(clamp_i16(-32_768), i16::MIN);
            assert_eq!(clamp_i16(32_768), i16::MAX);
            assert_eq!(clamp_i16(-32_769), i16::MIN);
            assert_eq!(clamp_i16(i32::MAX), i16::MAX);
            assert_eq!(clamp_i16(i32::MIN), i16::MIN);
        }

        #[test]
        fn verify_clamp_f32_to_i16() {
            assert_eq!(clamp_f32_to_i16(0.0), 0);
            assert_eq!(clamp_f32_to_i16(1.0), 32_767);
            assert_eq!(clamp_f32_to_i16(-1.0), -32_767);
            assert_eq!(clamp_f32_to_i16(2.5), i16::MAX);
            assert_eq!(clamp_f32_to_i16(-2.5), i16::MIN);
        }
    }
}
