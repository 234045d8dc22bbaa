// ppmaudio
// Copyright (c) 2024 The ppmaudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Bridges [`PcmBuffer`]s to and from WAVE files.
//!
//! Decoded tracks are written as 16-bit integer WAVE files. WAVE files to be encoded are read in
//! full and converted to 16-bit samples. No resampling is performed: a file with a sample rate
//! other than the target rate is accepted with a warning and its samples are used as-is.

use std::io::{Read, Seek, Write};

use ppmaudio_core::audio::{AudioSpec, PcmBuffer};
use ppmaudio_core::errors::{unsupported_error, Error, FormatErrorKind, Result};
use ppmaudio_core::util::clamp::clamp_f32_to_i16;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, warn};

fn map_hound_error(err: hound::Error) -> Error {
    match err {
        hound::Error::IoError(err) => Error::IoError(err),
        hound::Error::FormatError(msg) => Error::FormatError(FormatErrorKind::InvalidHeader(msg)),
        hound::Error::TooWide => Error::Unsupported("wav: sample does not fit the bit depth"),
        hound::Error::UnfinishedSample => Error::Unsupported("wav: incomplete sample"),
        hound::Error::Unsupported => Error::Unsupported("wav: unsupported wave format"),
        hound::Error::InvalidSampleFormat => Error::Unsupported("wav: invalid sample format"),
    }
}

fn collect_samples<R, S, F>(reader: &mut WavReader<R>, convert: F) -> Result<Vec<i16>>
where
    R: Read,
    S: hound::Sample,
    F: Fn(S) -> i16,
{
    reader
        .samples::<S>()
        .map(|sample| sample.map(&convert).map_err(map_hound_error))
        .collect()
}

/// Reads the full sample buffer of a WAVE file and converts it to 16-bit samples described by
/// `spec`.
///
/// The channel count of the file must match `spec`. Integer samples of other bit depths are
/// shifted to 16 bits, and floating-point samples are scaled and saturated.
pub fn read_pcm<R: Read>(source: R, spec: &AudioSpec) -> Result<PcmBuffer> {
    let mut reader = WavReader::new(source).map_err(map_hound_error)?;

    let wav_spec = reader.spec();

    debug!(
        "wav: channels={}, sample_rate={}, bits_per_sample={}, sample_format={:?}, frames={}",
        wav_spec.channels,
        wav_spec.sample_rate,
        wav_spec.bits_per_sample,
        wav_spec.sample_format,
        reader.duration()
    );

    if wav_spec.channels != spec.channels {
        return unsupported_error("wav: channel count does not match, only mono input is supported");
    }

    if wav_spec.sample_rate != spec.sample_rate {
        warn!(
            "wav: sample rate is {} Hz, samples will be used as {} Hz without resampling",
            wav_spec.sample_rate, spec.sample_rate
        );
    }

    let bits = wav_spec.bits_per_sample;

    let samples = match (wav_spec.sample_format, bits) {
        (SampleFormat::Int, 8) => collect_samples(&mut reader, |s: i8| i16::from(s) << 8)?,
        (SampleFormat::Int, 16) => collect_samples(&mut reader, |s: i16| s)?,
        (SampleFormat::Int, 17..=32) => {
            collect_samples(&mut reader, |s: i32| (s >> (bits - 16)) as i16)?
        }
        (SampleFormat::Float, 32) => collect_samples(&mut reader, clamp_f32_to_i16)?,
        _ => return unsupported_error("wav: unsupported bit depth"),
    };

    Ok(PcmBuffer::new(*spec, samples))
}

/// Writes a buffer as a 16-bit integer WAVE file.
pub fn write_pcm<W: Write + Seek>(sink: W, buf: &PcmBuffer) -> Result<()> {
    let spec = buf.spec();

    if spec.bits_per_sample != 16 {
        return unsupported_error("wav: only 16-bit output is supported");
    }

    let wav_spec = WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::new(sink, wav_spec).map_err(map_hound_error)?;

    for &sample in buf.samples() {
        writer.write_sample(sample).map_err(map_hound_error)?;
    }

    // Finalizing rewrites the chunk lengths in the header, therefore it must not be skipped.
    writer.finalize().map_err(map_hound_error)?;

    debug!("wav: wrote {} samples", buf.samples().len());

    Ok(())
}
