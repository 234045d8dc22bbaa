// ppmaudio
// Copyright (c) 2024 The ppmaudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! # ppmaudio
//!
//! ppmaudio extracts the sound tracks embedded in Flipnote Studio animations (`.ppm`) and converts
//! them between the nibble-swapped IMA ADPCM the container stores and linear PCM.
//!
//! A container holds four tracks: the background music (`bgm`) and three sound effects (`se1`,
//! `se2`, `se3`). All tracks are mono, 8192 Hz audio, described by [`AudioSpec::PPM`].
//!
//! # Usage
//!
//! 1.  Construct the [`AudioSpec`] once, usually [`AudioSpec::PPM`], and pass it to everything
//!     below.
//! 2.  To decode, call [`decode_track`] with a seekable source and the [`Track`] of interest. The
//!     [`PcmBuffer`] returned may be written out with [`wav::write_pcm`].
//! 3.  To encode, obtain a [`PcmBuffer`] (for example with [`wav::read_pcm`]) and call
//!     [`encode_pcm`]. The bytes returned are in the container's on-disk form.
//!
//! The lower level building blocks are re-exported in [`core`], [`codec`], and [`ppm`].

use std::io::{Read, Seek};

pub use ppmaudio_core as core;

pub mod codec {
    //! The `codec` module re-exports the ADPCM codec.
    pub use ppmaudio_codec_adpcm::{swap_nibbles, swap_nibbles_in_place};
    pub use ppmaudio_codec_adpcm::{AdpcmDecoder, AdpcmEncoder};
}

pub mod ppm {
    //! The `ppm` module re-exports the container reader.
    pub use ppmaudio_format_ppm::*;
}

#[cfg(feature = "wav")]
pub mod wav {
    //! The `wav` module re-exports the WAVE file bridge.
    pub use ppmaudio_format_wav::{read_pcm, write_pcm};
}

use ppmaudio_codec_adpcm::{AdpcmDecoder, AdpcmEncoder};
use ppmaudio_core::audio::{AudioSpec, PcmBuffer};
use ppmaudio_core::errors::Result;
use ppmaudio_format_ppm::{PpmReader, Track};

use log::info;

/// Locates, extracts, and decodes one track of a container.
///
/// The source is consumed and released before returning, whether decoding succeeds or not.
pub fn decode_track<R: Read + Seek>(
    source: R,
    track: Track,
    spec: &AudioSpec,
) -> Result<PcmBuffer> {
    // Reject unsupported audio before touching the source.
    let mut decoder = AdpcmDecoder::try_new(spec)?;

    let mut reader = PpmReader::try_new(source)?;

    let span = *reader.sound_index().get(track);

    info!(
        "decoding {} ({}): {} bytes at {:#x}",
        track,
        track.description(),
        span.length,
        span.offset
    );

    let data = reader.read_track(track)?;

    let buf = PcmBuffer::new(*spec, decoder.decode(&data));

    info!("decoded {} samples ({:.2}s)", buf.samples().len(), buf.duration().as_secs_f64());

    Ok(buf)
}

/// Encodes a buffer into the container's on-disk ADPCM form.
pub fn encode_pcm(buf: &PcmBuffer) -> Result<Vec<u8>> {
    let mut encoder = AdpcmEncoder::try_new(buf.spec())?;

    let data = encoder.encode(buf.samples());

    info!("encoded {} samples into {} bytes", buf.samples().len(), data.len());

    Ok(data)
}
