// ppmaudio
// Copyright (c) 2024 The ppmaudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `audio` module provides the linear PCM representation that decoded tracks are handed off
//! in, and that tracks to be encoded are supplied in.

use std::time::Duration;

/// `AudioSpec` describes the characteristics of linear PCM audio.
///
/// A single `AudioSpec` is constructed once by the application and passed by reference to the
/// codec and to the PCM bridge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AudioSpec {
    /// The number of interleaved channels.
    pub channels: u16,
    /// The sampling rate in hertz (Hz).
    pub sample_rate: u32,
    /// The bit depth of a sample.
    pub bits_per_sample: u16,
}

impl AudioSpec {
    /// The native format of Flipnote Studio sound tracks: mono, 8192 Hz, 16-bit.
    pub const PPM: AudioSpec = AudioSpec { channels: 1, sample_rate: 8192, bits_per_sample: 16 };

    pub fn new(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        AudioSpec { channels, sample_rate, bits_per_sample }
    }

    /// Returns true if the specification describes exactly one channel.
    pub fn is_mono(&self) -> bool {
        self.channels == 1
    }
}

impl Default for AudioSpec {
    fn default() -> Self {
        AudioSpec::PPM
    }
}

/// `PcmBuffer` owns a sequence of 16-bit linear PCM samples together with the `AudioSpec` that
/// describes them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PcmBuffer {
    spec: AudioSpec,
    samples: Vec<i16>,
}

impl PcmBuffer {
    /// Wraps a sequence of samples.
    pub fn new(spec: AudioSpec, samples: Vec<i16>) -> Self {
        PcmBuffer { spec, samples }
    }

    /// Gets the specification of the samples.
    pub fn spec(&self) -> &AudioSpec {
        &self.spec
    }

    /// Gets an immutable slice of all samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Gets the number of samples per channel.
    pub fn frames(&self) -> usize {
        match self.spec.channels {
            0 => 0,
            n => self.samples.len() / usize::from(n),
        }
    }

    /// Gets the play time of the buffer.
    pub fn duration(&self) -> Duration {
        if self.spec.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = self.frames() as u64;
        let rate = u64::from(self.spec.sample_rate);
        let secs = frames / rate;
        let nanos = (frames % rate) * 1_000_000_000 / rate;
        Duration::new(secs, nanos as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Unwraps the buffer, returning the samples.
    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }
}
