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

//! Sound track demuxer for Flipnote Studio animations (`.ppm`).
//!
//! A container is laid out as follows (all integers are little-endian):
//!
//! | Offset           | Content                                                        |
//! |------------------|----------------------------------------------------------------|
//! | `0x0`            | Magic, `PARA`                                                  |
//! | `0x4`            | Animation data size, u32                                       |
//! | `0x8`            | Sound data size, u32                                           |
//! | `0xc`            | Frame count minus one, u16                                     |
//! | `0x6a0`          | Animation data, then one sound effect flag byte per frame      |
//! | aligned to 4     | Sound header: 4 × u32 track lengths, 2 speed bytes, padding    |
//! | sound header + 32| Track data: bgm, se1, se2, se3                                 |

use std::io::{Read, Seek};

use ppmaudio_core::errors::Result;
use ppmaudio_core::io::{ReadBytes, SourceStream};

use log::debug;

mod header;
mod index;

pub use header::{align4, PpmHeader, SoundHeader};
pub use header::{FIXED_HEADER_SIZE, PPM_MAGIC, SOUND_HEADER_FIELDS_SIZE, SOUND_HEADER_SIZE};
pub use index::{ParseTrackError, SoundIndex, Track, TrackSpan, NUM_TRACKS};

/// Reads the raw, still nibble-swapped, bytes of a track span.
///
/// The stream is positioned at the start of the span and exactly `span.length` bytes are read. A
/// container that ends before the span does is an error.
pub fn read_span<R: Read + Seek>(
    stream: &mut SourceStream<R>,
    span: &TrackSpan,
) -> Result<Vec<u8>> {
    stream.seek_to(u64::from(span.offset))?;
    let data = stream.read_boxed_slice_exact(span.length as usize)?;
    Ok(data.into_vec())
}

/// Flipnote Studio PPM sound track reader.
///
/// `PpmReader` parses the container header and sound header when it is instantiated. Track data
/// is only read on request.
pub struct PpmReader<R: Read + Seek> {
    stream: SourceStream<R>,
    header: PpmHeader,
    sound_header: SoundHeader,
    index: SoundIndex,
}

impl<R: Read + Seek> PpmReader<R> {
    pub fn try_new(source: R) -> Result<Self> {
        let mut stream = SourceStream::new(source)?;

        // The header is always at the very start of the container.
        stream.seek_to(0)?;

        let header = PpmHeader::read(&mut stream)?;

        let offset = header.sound_header_offset()?;

        stream.seek_to(u64::from(offset))?;

        let mut fields = [0u8; SOUND_HEADER_FIELDS_SIZE];
        stream.read_buf_exact(&mut fields)?;

        let sound_header = SoundHeader::parse(offset, &fields)?;

        // Skip the padding without reading it. A container may end inside the padding when all
        // tracks are empty.
        stream.ignore_bytes(u64::from(SOUND_HEADER_SIZE) - SOUND_HEADER_FIELDS_SIZE as u64)?;

        let index = sound_header.index()?;

        for (track, span) in index.iter() {
            debug!("ppm: {} at {:#x}, {} bytes", track, span.offset, span.length);
        }

        Ok(PpmReader { stream, header, sound_header, index })
    }

    /// Gets the container header.
    pub fn header(&self) -> &PpmHeader {
        &self.header
    }

    /// Gets the sound header.
    pub fn sound_header(&self) -> &SoundHeader {
        &self.sound_header
    }

    /// Gets the spans of all tracks.
    pub fn sound_index(&self) -> &SoundIndex {
        &self.index
    }

    /// Reads the raw bytes of a track.
    pub fn read_track(&mut self, track: Track) -> Result<Vec<u8>> {
        let span = *self.index.get(track);

        debug!("ppm: reading {} ({})", track, track.description());

        read_span(&mut self.stream, &span)
    }

    /// Unwraps this `PpmReader`, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.stream.into_inner()
    }
}
