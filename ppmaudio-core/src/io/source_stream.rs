// ppmaudio
// Copyright (c) 2024 The ppmaudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io;
use std::io::{Read, Seek, SeekFrom};

use super::ReadBytes;

/// `SourceStream` is the main reader type for containers. It wraps any source implementing
/// [`std::io::Read`] and [`std::io::Seek`], tracks the absolute stream position, and provides
/// random access through [`SourceStream::seek_to`].
///
/// Every read is exact: a source that ends early produces an error of kind
/// [`io::ErrorKind::UnexpectedEof`] instead of a partially filled buffer.
pub struct SourceStream<R: Read + Seek> {
    inner: R,
    pos: u64,
}

impl<R: Read + Seek> SourceStream<R> {
    /// Instantiates a new `SourceStream` by taking ownership of the source. The position of the
    /// source is queried so that streams may be created mid-file.
    pub fn new(mut inner: R) -> io::Result<Self> {
        let pos = inner.stream_position()?;
        Ok(SourceStream { inner, pos })
    }

    /// Seeks to the absolute byte position `pos` and returns the new position.
    pub fn seek_to(&mut self, pos: u64) -> io::Result<u64> {
        if pos != self.pos {
            self.pos = self.inner.seek(SeekFrom::Start(pos))?;
        }
        Ok(self.pos)
    }

    /// Unwraps this `SourceStream`, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ReadBytes for SourceStream<R> {
    #[inline(always)]
    fn read_byte(&mut self) -> io::Result<u8> {
        let mut byte = [0u8; 1];
        self.read_buf_exact(&mut byte)?;
        Ok(byte[0])
    }

    #[inline(always)]
    fn read_double_bytes(&mut self) -> io::Result<[u8; 2]> {
        let mut bytes = [0u8; 2];
        self.read_buf_exact(&mut bytes)?;
        Ok(bytes)
    }

    #[inline(always)]
    fn read_quad_bytes(&mut self) -> io::Result<[u8; 4]> {
        let mut bytes = [0u8; 4];
        self.read_buf_exact(&mut bytes)?;
        Ok(bytes)
    }

    fn read_buf_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        if let Err(err) = self.inner.read_exact(buf) {
            // The amount actually consumed by a failed read_exact is unspecified, so re-sync the
            // tracked position with the source.
            self.pos = self.inner.stream_position()?;
            return Err(err);
        }
        self.pos += buf.len() as u64;
        Ok(())
    }

    fn ignore_bytes(&mut self, count: u64) -> io::Result<()> {
        let target = self.pos.checked_add(count).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "ignore count overflows stream position")
        })?;
        self.seek_to(target)?;
        Ok(())
    }

    #[inline(always)]
    fn pos(&self) -> u64 {
        self.pos
    }
}
