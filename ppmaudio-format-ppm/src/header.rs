// ppmaudio
// Copyright (c) 2024 The ppmaudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ppmaudio_core::errors::{format_error, header_error, FormatErrorKind, Result};
use ppmaudio_core::io::{BufReader, ReadBytes};

use log::debug;

use crate::index::{SoundIndex, NUM_TRACKS};

/// The container file marker.
pub const PPM_MAGIC: [u8; 4] = *b"PARA";

/// The size of the fixed part of the container: the metadata block followed by the thumbnail.
/// The animation data begins immediately after.
pub const FIXED_HEADER_SIZE: u64 = 0x6a0;

/// The size of the sound header block: four track lengths, two playback speeds, and padding.
pub const SOUND_HEADER_SIZE: u32 = 32;

/// The size of the meaningful part of the sound header block. The remainder is padding.
pub const SOUND_HEADER_FIELDS_SIZE: usize = 18;

/// Rounds `pos` up to the next multiple of 4. Already aligned positions are unchanged.
#[inline]
pub fn align4(pos: u64) -> u64 {
    (pos + 3) & !3
}

/// `PpmHeader` is the fixed header at the start of the container.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PpmHeader {
    /// The size of the animation data in bytes.
    pub animation_data_size: u32,
    /// The size of the sound data in bytes. Informational only.
    pub sound_data_size: u32,
    /// The number of animation frames.
    pub frame_count: u32,
}

impl PpmHeader {
    /// Reads the header from the start of the stream. The magic is verified before any other
    /// field is read.
    pub fn read<B: ReadBytes>(reader: &mut B) -> Result<PpmHeader> {
        let magic = reader.read_quad_bytes()?;

        if magic != PPM_MAGIC {
            return format_error(FormatErrorKind::BadMagic);
        }

        // 0x4
        let animation_data_size = reader.read_u32()?;
        // 0x8
        let sound_data_size = reader.read_u32()?;
        // 0xc, the stored value is one less than the frame count.
        let frame_count = u32::from(reader.read_u16()?) + 1;

        debug!(
            "ppm: animation_data_size={}, sound_data_size={}, frame_count={}",
            animation_data_size, sound_data_size, frame_count
        );

        Ok(PpmHeader { animation_data_size, sound_data_size, frame_count })
    }

    /// Computes the position of the sound header. The sound header follows the animation data
    /// and the one-byte-per-frame sound effect flags, aligned up to a 4 byte boundary.
    pub fn sound_header_offset(&self) -> Result<u32> {
        let unaligned = FIXED_HEADER_SIZE
            + u64::from(self.animation_data_size)
            + u64::from(self.frame_count);

        match u32::try_from(align4(unaligned)) {
            Ok(offset) => Ok(offset),
            Err(_) => header_error("ppm: sound header offset exceeds 4 GiB"),
        }
    }
}

/// `SoundHeader` is the block that precedes the sound track data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SoundHeader {
    /// The position of the sound header block.
    pub offset: u32,
    /// The length in bytes of each track, in storage order.
    pub track_lengths: [u32; NUM_TRACKS],
    /// The frame playback speed. Informational only.
    pub frame_speed: u8,
    /// The frame playback speed when the background music was recorded. Informational only.
    pub bgm_speed: u8,
}

impl SoundHeader {
    /// Parses the fields of a sound header block located at `offset`. The padding that follows
    /// the fields is not part of `fields`.
    pub fn parse(offset: u32, fields: &[u8; SOUND_HEADER_FIELDS_SIZE]) -> Result<SoundHeader> {
        let mut reader = BufReader::new(fields);

        let mut track_lengths = [0; NUM_TRACKS];
        for length in track_lengths.iter_mut() {
            *length = reader.read_u32()?;
        }

        let frame_speed = reader.read_u8()?;
        let bgm_speed = reader.read_u8()?;

        debug!(
            "ppm: sound header at {:#x}, track_lengths={:?}, frame_speed={}, bgm_speed={}",
            offset, track_lengths, frame_speed, bgm_speed
        );

        Ok(SoundHeader { offset, track_lengths, frame_speed, bgm_speed })
    }

    /// The position of the first byte of track data.
    pub fn data_offset(&self) -> Result<u32> {
        match self.offset.checked_add(SOUND_HEADER_SIZE) {
            Some(offset) => Ok(offset),
            None => header_error("ppm: sound data offset exceeds 4 GiB"),
        }
    }

    /// Computes the span of every track.
    pub fn index(&self) -> Result<SoundIndex> {
        SoundIndex::new(self.data_offset()?, self.track_lengths)
    }
}

#[cfg(test)]
mod tests {
    use ppmaudio_core::errors::Error;

    use super::*;

    fn header_bytes(magic: &[u8; 4], anim_size: u32, stored_frame_count: u16) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(magic);
        buf.extend_from_slice(&anim_size.to_le_bytes());
        buf.extend_from_slice(&0x1234u32.to_le_bytes());
        buf.extend_from_slice(&stored_frame_count.to_le_bytes());
        buf
    }

    #[test]
    fn verify_align4() {
        for pos in 0..4096u64 {
            let aligned = align4(pos);
            assert_eq!(aligned % 4, 0);
            assert!(aligned >= pos);
            assert!(aligned - pos <= 3);
        }

        assert_eq!(align4(0), 0);
        assert_eq!(align4(5802), 5804);
        assert_eq!(align4(5804), 5804);
        assert_eq!(align4(u64::from(u32::MAX)), 1 << 32);
    }

    #[test]
    fn verify_read_header() {
        let buf = header_bytes(b"PARA", 0x1000, 9);
        let header = PpmHeader::read(&mut BufReader::new(&buf)).unwrap();

        assert_eq!(
            header,
            PpmHeader { animation_data_size: 0x1000, sound_data_size: 0x1234, frame_count: 10 }
        );

        // 0x6a0 + 0x1000 + 10 = 5802, aligned up to 5804.
        assert_eq!(header.sound_header_offset().unwrap(), 5804);
    }

    #[test]
    fn verify_bad_magic() {
        let buf = header_bytes(b"PARB", 0x1000, 9);
        let mut reader = BufReader::new(&buf);

        match PpmHeader::read(&mut reader) {
            Err(Error::FormatError(FormatErrorKind::BadMagic)) => (),
            r => panic!("unexpected result {:?}", r),
        }

        // Nothing past the magic was read.
        assert_eq!(reader.pos(), 4);
    }

    #[test]
    fn verify_sound_header_offset_limits() {
        let header =
            PpmHeader { animation_data_size: u32::MAX, sound_data_size: 0, frame_count: 65_536 };

        match header.sound_header_offset() {
            Err(Error::FormatError(FormatErrorKind::InvalidHeader(_))) => (),
            r => panic!("unexpected result {:?}", r),
        }
    }

    #[test]
    fn verify_parse_sound_header() {
        let mut fields = [0u8; SOUND_HEADER_FIELDS_SIZE];
        for (i, length) in [100u32, 50, 0, 200].iter().enumerate() {
            fields[4 * i..4 * i + 4].copy_from_slice(&length.to_le_bytes());
        }
        fields[16] = 3;
        fields[17] = 8;

        let sound = SoundHeader::parse(5804, &fields).unwrap();

        assert_eq!(sound.track_lengths, [100, 50, 0, 200]);
        assert_eq!(sound.frame_speed, 3);
        assert_eq!(sound.bgm_speed, 8);
        assert_eq!(sound.data_offset().unwrap(), 5836);
    }
}
