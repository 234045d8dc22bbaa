// ppmaudio
// Copyright (c) 2024 The ppmaudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
// The following lints are allowed in all ppmaudio crates. Please see the workspace Cargo.toml
// for their justification.
#![allow(clippy::identity_op)]
#![allow(clippy::manual_range_contains)]

//! IMA ADPCM as stored by Flipnote Studio.
//!
//! Every byte holds two 4-bit codes. The codec places the first code of a byte in the upper
//! nibble, while Flipnote Studio stores it in the lower nibble, so bytes are nibble-swapped on
//! their way in and out of the codec. The net on-disk order is therefore lower nibble first.

use ppmaudio_core::audio::AudioSpec;
use ppmaudio_core::errors::{unsupported_error, Result};

use log::debug;

mod codec_ima;
mod common;

pub use common::{swap_nibbles, swap_nibbles_in_place};

use codec_ima::AdpcmImaStatus;
use common::Nibble;

/// The order in which the codes of a de-swapped byte are consumed.
const CODEC_NIBBLE_ORDER: [Nibble; 2] = [Nibble::Upper, Nibble::Lower];

fn check_spec(spec: &AudioSpec) -> Result<()> {
    if !spec.is_mono() {
        return unsupported_error("adpcm: only mono audio is supported");
    }
    if spec.bits_per_sample != 16 {
        return unsupported_error("adpcm: only 16-bit samples are supported");
    }
    Ok(())
}

/// Flipnote Studio ADPCM decoder.
///
/// The decoder state is carried across calls to [`AdpcmDecoder::decode`], therefore a track may
/// be decoded in one call or in several consecutive pieces with identical results.
pub struct AdpcmDecoder {
    spec: AudioSpec,
    status: AdpcmImaStatus,
}

impl AdpcmDecoder {
    pub fn try_new(spec: &AudioSpec) -> Result<Self> {
        check_spec(spec)?;
        Ok(AdpcmDecoder { spec: *spec, status: Default::default() })
    }

    pub fn spec(&self) -> &AudioSpec {
        &self.spec
    }

    /// Returns the decoder to its initial state.
    pub fn reset(&mut self) {
        self.status = Default::default();
    }

    /// Decodes on-disk bytes, appending two samples per byte to `out`.
    ///
    /// A track always decodes to an even number of samples. If the track was encoded from an odd
    /// number of samples, the final sample is the expansion of the zero padding code.
    pub fn decode_into(&mut self, data: &[u8], out: &mut Vec<i16>) {
        out.reserve(2 * data.len());

        for &byte in data {
            let byte = swap_nibbles(byte);

            for nibble in CODEC_NIBBLE_ORDER {
                out.push(self.status.expand_nibble(nibble.get_nibble(byte)));
            }
        }
    }

    /// Decodes on-disk bytes into a new buffer of `2 * data.len()` samples.
    pub fn decode(&mut self, data: &[u8]) -> Vec<i16> {
        let mut samples = Vec::with_capacity(2 * data.len());
        self.decode_into(data, &mut samples);

        debug!("adpcm: decoded {} bytes into {} samples", data.len(), samples.len());

        samples
    }
}

/// Flipnote Studio ADPCM encoder.
pub struct AdpcmEncoder {
    spec: AudioSpec,
    status: AdpcmImaStatus,
}

impl AdpcmEncoder {
    pub fn try_new(spec: &AudioSpec) -> Result<Self> {
        check_spec(spec)?;
        Ok(AdpcmEncoder { spec: *spec, status: Default::default() })
    }

    pub fn spec(&self) -> &AudioSpec {
        &self.spec
    }

    /// Returns the encoder to its initial state.
    pub fn reset(&mut self) {
        self.status = Default::default();
    }

    /// Encodes samples into `ceil(samples.len() / 2)` on-disk bytes.
    ///
    /// The encoder state is carried across calls, but each call packs its own bytes: an odd
    /// number of samples leaves the last byte's second code as zero. Encode a track in a single
    /// call, or in pieces of even length, to avoid padding codes mid-track.
    pub fn encode(&mut self, samples: &[i16]) -> Vec<u8> {
        let mut data = Vec::with_capacity(samples.len().div_ceil(2));

        for pair in samples.chunks(2) {
            let mut byte = 0;

            for (nibble, &sample) in CODEC_NIBBLE_ORDER.iter().zip(pair) {
                byte = nibble.set_nibble(byte, self.status.compress_sample(sample));
            }

            data.push(swap_nibbles(byte));
        }

        debug!("adpcm: encoded {} samples into {} bytes", samples.len(), data.len());

        data
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use ppmaudio_core::errors::Error;
    use rand::rngs::SmallRng;
    use rand::{RngCore, SeedableRng};

    use super::*;

    fn sine(amplitude: f64, freq: f64, len: usize) -> Vec<i16> {
        let rate = f64::from(AudioSpec::PPM.sample_rate);
        (0..len)
            .map(|n| (amplitude * (2.0 * PI * freq * n as f64 / rate).sin()).round() as i16)
            .collect()
    }

    #[test]
    fn verify_decode_known_bytes() {
        let mut decoder = AdpcmDecoder::try_new(&AudioSpec::PPM).unwrap();
        assert_eq!(decoder.decode(&[0x77, 0x00, 0x08]), vec![11, 41, 45, 48, 45, 48]);
    }

    #[test]
    fn verify_decode_lower_nibble_first() {
        // 0x70 on disk: the lower nibble (0) is the first code, the upper nibble (7) the second.
        let mut decoder = AdpcmDecoder::try_new(&AudioSpec::PPM).unwrap();
        let samples = decoder.decode(&[0x70]);

        let mut status = AdpcmImaStatus::default();
        let first = status.expand_nibble(0x0);
        let second = status.expand_nibble(0x7);

        assert_eq!(samples, vec![first, second]);
    }

    #[test]
    fn verify_decode_len() {
        let mut rng = SmallRng::seed_from_u64(0x5041_5241);

        for len in [0usize, 1, 2, 3, 255, 4096] {
            let mut data = vec![0u8; len];
            rng.fill_bytes(&mut data);

            let mut decoder = AdpcmDecoder::try_new(&AudioSpec::PPM).unwrap();
            assert_eq!(decoder.decode(&data).len(), 2 * len);
        }
    }

    #[test]
    fn verify_decode_in_pieces() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut data = vec![0u8; 1000];
        rng.fill_bytes(&mut data);

        let mut whole = AdpcmDecoder::try_new(&AudioSpec::PPM).unwrap();
        let expected = whole.decode(&data);

        let mut pieces = AdpcmDecoder::try_new(&AudioSpec::PPM).unwrap();
        let mut actual = Vec::new();
        for chunk in data.chunks(37) {
            pieces.decode_into(chunk, &mut actual);
        }

        assert_eq!(actual, expected);

        // After a reset the decoder starts over from silence.
        pieces.reset();
        assert_eq!(pieces.decode(&data), expected);
    }

    #[test]
    fn verify_encode_known_samples() {
        let mut encoder = AdpcmEncoder::try_new(&AudioSpec::PPM).unwrap();

        // Codes 7, 7, 15 packed upper-first (0x77, 0xf0), then swapped.
        assert_eq!(encoder.encode(&[100, 200, -50]), vec![0x77, 0x0f]);
    }

    #[test]
    fn verify_encode_len() {
        for len in [0usize, 1, 2, 3, 8191, 8192] {
            let mut encoder = AdpcmEncoder::try_new(&AudioSpec::PPM).unwrap();
            assert_eq!(encoder.encode(&sine(4000.0, 440.0, len)).len(), len.div_ceil(2));
        }
    }

    #[test]
    fn verify_odd_length_padding() {
        let samples = [100, 200, -50];

        let mut encoder = AdpcmEncoder::try_new(&AudioSpec::PPM).unwrap();
        let data = encoder.encode(&samples);

        let mut decoder = AdpcmDecoder::try_new(&AudioSpec::PPM).unwrap();
        let decoded = decoder.decode(&data);

        // The padding code is decoded as one extra trailing sample.
        assert_eq!(decoded, vec![11, 41, -22, -13]);
    }

    #[test]
    fn verify_round_trip_matches_encoder_prediction() {
        let samples = sine(12_000.0, 330.0, 4096);

        let mut encoder = AdpcmEncoder::try_new(&AudioSpec::PPM).unwrap();
        let data = encoder.encode(&samples);

        let mut status = AdpcmImaStatus::default();
        let predicted: Vec<i16> = samples
            .iter()
            .map(|&s| {
                status.compress_sample(s);
                status.predictor as i16
            })
            .collect();

        let mut decoder = AdpcmDecoder::try_new(&AudioSpec::PPM).unwrap();
        assert_eq!(decoder.decode(&data), predicted);
    }

    #[test]
    fn verify_round_trip_error_is_bounded() {
        // 64 samples are enough for the step size to adapt from its minimum.
        const WARM_UP: usize = 64;
        const MAX_ERROR: i32 = 512;

        let samples = sine(8000.0, 250.0, 8192);

        let mut encoder = AdpcmEncoder::try_new(&AudioSpec::PPM).unwrap();
        let mut decoder = AdpcmDecoder::try_new(&AudioSpec::PPM).unwrap();
        let decoded = decoder.decode(&encoder.encode(&samples));

        assert_eq!(decoded.len(), samples.len());

        let max_error = samples
            .iter()
            .zip(&decoded)
            .skip(WARM_UP)
            .map(|(&a, &b)| (i32::from(a) - i32::from(b)).abs())
            .max()
            .unwrap();

        assert!(max_error <= MAX_ERROR, "max error {} exceeds {}", max_error, MAX_ERROR);
    }

    #[test]
    fn verify_spec_checks() {
        for spec in [AudioSpec::new(2, 8192, 16), AudioSpec::new(1, 8192, 8)] {
            match AdpcmDecoder::try_new(&spec) {
                Err(Error::Unsupported(_)) => (),
                _ => panic!("decoder accepted {:?}", spec),
            }
            match AdpcmEncoder::try_new(&spec) {
                Err(Error::Unsupported(_)) => (),
                _ => panic!("encoder accepted {:?}", spec),
            }
        }
    }
}
