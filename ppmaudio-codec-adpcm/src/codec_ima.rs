// ppmaudio
// Copyright (c) 2024 The ppmaudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ppmaudio_core::util::clamp::clamp_i16;

#[rustfmt::skip]
const IMA_INDEX_TABLE: [i32; 16] = [
    -1, -1, -1, -1, 2, 4, 6, 8,
    -1, -1, -1, -1, 2, 4, 6, 8,
];

#[rustfmt::skip]
const IMA_STEP_TABLE: [i32; 89] = [
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17,
    19, 21, 23, 25, 28, 31, 34, 37, 41, 45,
    50, 55, 60, 66, 73, 80, 88, 97, 107, 118,
    130, 143, 157, 173, 190, 209, 230, 253, 279, 307,
    337, 371, 408, 449, 494, 544, 598, 658, 724, 796,
    876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066,
    2272, 2499, 2749, 3024, 3327, 3660, 4026, 4428, 4871, 5358,
    5894, 6484, 7132, 7845, 8630, 9493, 10442, 11487, 12635, 13899,
    15289, 16818, 18500, 20350, 22385, 24623, 27086, 29794, 32767,
];

const MAX_STEP_INDEX: i32 = (IMA_STEP_TABLE.len() - 1) as i32;

/// The sign bit of a 4-bit code.
const SIGN_BIT: u8 = 0x08;

/// `AdpcmImaStatus` is the running state shared by the encoder and decoder. Flipnote tracks have
/// no block preamble, so the state starts from silence and the smallest step, and is carried
/// across the whole track.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct AdpcmImaStatus {
    pub(crate) predictor: i32,
    pub(crate) step_index: i32,
}

impl AdpcmImaStatus {
    /// The current quantizer step size.
    #[inline(always)]
    pub(crate) fn step(&self) -> i32 {
        IMA_STEP_TABLE[self.step_index as usize]
    }

    /// Expands a 4-bit code into the next sample, and advances the state.
    pub(crate) fn expand_nibble(&mut self, code: u8) -> i16 {
        let code = code & 0x0F;
        let step = self.step();

        let mut diff = step >> 3;
        if code & 0x04 != 0 {
            diff += step;
        }
        if code & 0x02 != 0 {
            diff += step >> 1;
        }
        if code & 0x01 != 0 {
            diff += step >> 2;
        }

        let predictor =
            if code & SIGN_BIT != 0 { self.predictor - diff } else { self.predictor + diff };

        self.predictor = clamp_i16(predictor) as i32;
        self.step_index =
            (self.step_index + IMA_INDEX_TABLE[code as usize]).clamp(0, MAX_STEP_INDEX);
        self.predictor as i16
    }

    /// Quantizes a sample into a 4-bit code against the current prediction.
    ///
    /// The state is advanced by expanding the chosen code exactly as the decoder will, so the
    /// encoder's prediction never drifts away from the decoder's.
    pub(crate) fn compress_sample(&mut self, sample: i16) -> u8 {
        let step = self.step();
        let mut diff = i32::from(sample) - self.predictor;

        let mut code = 0;
        if diff < 0 {
            code = SIGN_BIT;
            diff = -diff;
        }

        // Successive approximation of diff by step, step/2, and step/4.
        let mut threshold = step;
        for bit in [0x04, 0x02, 0x01] {
            if diff >= threshold {
                code |= bit;
                diff -= threshold;
            }
            threshold >>= 1;
        }

        self.expand_nibble(code);
        code
    }
}
