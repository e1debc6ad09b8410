// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/error.rs - Error type for the JEF and PES/PEC decoders.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/// Errors that can occur while decoding an embroidery file.
///
/// Every structural error carries the absolute byte offset into the input
/// buffer at which the failing read or check began.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A read would run past the end of the buffer.
    #[error("truncated input at offset {offset:#x}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The PES version string is not one of the six known header schemas.
    #[error("unsupported PES version {version:?} at offset {offset:#x}")]
    UnsupportedVersion { offset: usize, version: String },

    /// The stitch stream ran out of bytes before its end marker.
    #[error("stitch stream missing its end marker at offset {offset:#x}")]
    MalformedSentinel { offset: usize },

    /// A color reference does not resolve within the active palette.
    #[error("palette index {index} out of range ({len} entries) at offset {offset:#x}")]
    PaletteIndexOutOfRange {
        offset: usize,
        index: usize,
        len: usize,
    },

    /// A JEF escape sequence with an unknown selector byte.
    #[error("unknown stitch command {command:#04x} at offset {offset:#x}")]
    UnknownCommand { offset: usize, command: u8 },

    /// A section offset points backwards into data that was already decoded.
    #[error("section offset {offset:#x} lies before the end of the header ({minimum:#x})")]
    InvalidOffset { offset: usize, minimum: usize },

    /// The caller asked for a format this crate does not decode.
    #[error("unknown embroidery format {0:?}")]
    UnknownFormat(String),

    /// Reading the input file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The byte offset the error was reported at, if it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Truncated { offset, .. }
            | Error::UnsupportedVersion { offset, .. }
            | Error::MalformedSentinel { offset }
            | Error::PaletteIndexOutOfRange { offset, .. }
            | Error::UnknownCommand { offset, .. }
            | Error::InvalidOffset { offset, .. } => Some(*offset),
            Error::UnknownFormat(_) | Error::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        let err = Error::MalformedSentinel { offset: 0x200 };
        assert_eq!(err.offset(), Some(0x200));
        assert_eq!(Error::UnknownFormat("dst".into()).offset(), None);
    }

    #[test]
    fn test_display_includes_offset() {
        let err = Error::Truncated {
            offset: 0x74,
            needed: 4,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "truncated input at offset 0x74: needed 4 bytes, 3 available"
        );
    }
}
