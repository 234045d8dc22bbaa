// ppmaudio
// Copyright (c) 2024 The ppmaudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::str::FromStr;

use ppmaudio_core::errors::{header_error, Result};

/// The number of sound tracks in a container.
pub const NUM_TRACKS: usize = 4;

/// `Track` names one of the four sound tracks of a container, in storage order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Track {
    /// Background music.
    Bgm,
    /// Sound effect 1.
    Se1,
    /// Sound effect 2.
    Se2,
    /// Sound effect 3.
    Se3,
}

impl Track {
    /// All tracks in the order they are stored.
    pub const ALL: [Track; NUM_TRACKS] = [Track::Bgm, Track::Se1, Track::Se2, Track::Se3];

    /// The position of the track in the sound header.
    pub fn index(self) -> usize {
        match self {
            Track::Bgm => 0,
            Track::Se1 => 1,
            Track::Se2 => 2,
            Track::Se3 => 3,
        }
    }

    /// The short name of the track, as accepted by [`Track::from_str`].
    pub fn name(self) -> &'static str {
        match self {
            Track::Bgm => "bgm",
            Track::Se1 => "se1",
            Track::Se2 => "se2",
            Track::Se3 => "se3",
        }
    }

    /// A human readable description of the track.
    pub fn description(self) -> &'static str {
        match self {
            Track::Bgm => "background music",
            Track::Se1 => "sound effect 1",
            Track::Se2 => "sound effect 2",
            Track::Se3 => "sound effect 3",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The error returned when parsing an unknown track name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseTrackError(String);

impl fmt::Display for ParseTrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid track '{}', available tracks: bgm | se1 | se2 | se3", self.0)
    }
}

impl std::error::Error for ParseTrackError {}

impl FromStr for Track {
    type Err = ParseTrackError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Track::ALL
            .into_iter()
            .find(|track| track.name() == s)
            .ok_or_else(|| ParseTrackError(s.to_string()))
    }
}

/// `TrackSpan` locates one sound track within the container.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackSpan {
    /// The absolute byte position of the first byte of the track.
    pub offset: u32,
    /// The length of the track in bytes.
    pub length: u32,
}

impl TrackSpan {
    /// The absolute byte position one past the last byte of the track.
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.length)
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// `SoundIndex` holds the spans of all four sound tracks.
///
/// The tracks are stored back to back in the fixed order of [`Track::ALL`], therefore the span of
/// each track begins exactly where the span of the previous track ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SoundIndex {
    spans: [TrackSpan; NUM_TRACKS],
}

impl SoundIndex {
    /// Lays out tracks of the given lengths contiguously, starting at `data_start`.
    pub fn new(data_start: u32, lengths: [u32; NUM_TRACKS]) -> Result<Self> {
        let mut spans = [TrackSpan::default(); NUM_TRACKS];
        let mut offset = data_start;

        for (span, &length) in spans.iter_mut().zip(&lengths) {
            *span = TrackSpan { offset, length };

            offset = match offset.checked_add(length) {
                Some(offset) => offset,
                None => return header_error("ppm: sound track extends beyond 4 GiB"),
            };
        }

        Ok(SoundIndex { spans })
    }

    /// Gets the span of a track.
    pub fn get(&self, track: Track) -> &TrackSpan {
        &self.spans[track.index()]
    }

    /// Gets an iterator over all tracks and their spans, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Track, &TrackSpan)> + '_ {
        Track::ALL.into_iter().zip(self.spans.iter())
    }

    /// The absolute byte position one past the end of the last track.
    pub fn end(&self) -> u64 {
        self.spans[NUM_TRACKS - 1].end()
    }
}
