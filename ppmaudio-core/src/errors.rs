// ppmaudio
// Copyright (c) 2024 The ppmaudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error;
use std::fmt;
use std::io;
use std::result;

/// `FormatErrorKind` is a list of reasons why a container could not be parsed.
#[derive(Debug, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// The stream does not start with the container signature.
    BadMagic,
    /// A header field is structurally invalid.
    InvalidHeader(&'static str),
}

impl FormatErrorKind {
    fn as_str(&self) -> &'static str {
        match *self {
            FormatErrorKind::BadMagic => "container magic is incorrect",
            FormatErrorKind::InvalidHeader(msg) => msg,
        }
    }
}

/// `Error` provides an enumeration of all possible errors reported by ppmaudio.
#[derive(Debug)]
pub enum Error {
    /// An IO error occured while opening, reading, writing, or seeking a file. Short reads are
    /// reported as an error of kind [`io::ErrorKind::UnexpectedEof`].
    IoError(io::Error),
    /// The container is malformed and its sound header could not be located.
    FormatError(FormatErrorKind),
    /// The input is well formed, but uses a feature that is not supported.
    Unsupported(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::IoError(ref err) => err.fmt(f),
            Error::FormatError(ref kind) => {
                write!(f, "malformed container: {}", kind.as_str())
            }
            Error::Unsupported(feature) => {
                write!(f, "unsupported feature: {}", feature)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::IoError(ref err) => Some(err),
            Error::FormatError(_) => None,
            Error::Unsupported(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create a format error.
pub fn format_error<T>(kind: FormatErrorKind) -> Result<T> {
    Err(Error::FormatError(kind))
}

/// Convenience function to create an invalid header format error.
pub fn header_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::FormatError(FormatErrorKind::InvalidHeader(desc)))
}

/// Convenience function to create an unsupport feature error.
pub fn unsupported_error<T>(feature: &'static str) -> Result<T> {
    Err(Error::Unsupported(feature))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_display() {
        let err = Error::FormatError(FormatErrorKind::BadMagic);
        assert_eq!(err.to_string(), "malformed container: container magic is incorrect");

        let err = Error::FormatError(FormatErrorKind::InvalidHeader("ppm: bad thing"));
        assert_eq!(err.to_string(), "malformed container: ppm: bad thing");

        let err = Error::Unsupported("wav: stereo");
        assert_eq!(err.to_string(), "unsupported feature: wav: stereo");
    }

    #[test]
    fn verify_io_error_source() {
        let err = Error::from(io::Error::new(io::ErrorKind::UnexpectedEof, "end of stream"));

        match &err {
            Error::IoError(io) => assert_eq!(io.kind(), io::ErrorKind::UnexpectedEof),
            e => panic!("unexpected error {:?}", e),
        }

        assert!(error::Error::source(&err).is_some());
        assert!(error::Error::source(&Error::Unsupported("x")).is_none());
    }
}
