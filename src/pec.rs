// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/pec.rs - Decoder for the PEC body embedded in PES files.
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

/*!
 * # `pec` Module
 *
 * The PEC body starts with a 512-byte block (label, thumbnail size and the
 * color index array), then a 20-byte graphic block, then the stitch stream.
 *
 * Stitch stream chunks:
 *
 * ```text
 * FF            end
 * FE xx ii      color change, ii = color index
 * 0x 0y         short dx, short dy            (7-bit signed, 0.1 units)
 * 0x 1c yy      short dx, long dy
 * 1c xx 0y      long dx, short dy
 * 1c xx 1c yy   long dx, long dy
 *
 * long: 1 ccc vvvv  vvvvvvvv    ccc = 1 jump, 2 trim; v = 12-bit signed
 * ```
 */

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::palette::{ColorRef, Palette};
use crate::stitch::{MoveKind, StitchCommand};

pub const LABEL_SIZE: usize = 19;
pub const FIRST_BLOCK_SIZE: usize = 512;
pub const GRAPHIC_BLOCK_SIZE: usize = 20;

const END_FLAG: u8 = 0xFF;
const COLOR_FLAG: u8 = 0xFE;
const LONG_FLAG: u8 = 0x80;
const COMMAND_MASK: u8 = 0x70;

/// The first fixed block of a PEC body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PecHeader {
    pub label: String,
    pub return_byte: u8,
    pub unknown1: [u8; 14],
    pub thumbnail_width: u8,
    pub thumbnail_height: u8,
    pub unknown2: [u8; 12],
    /// Number of color changes; the index array holds one more entry.
    pub color_count: u8,
    pub color_indexes: Vec<u8>,
    color_indexes_offset: usize,
}

impl PecHeader {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        let start = cursor.position();
        let label = cursor.read_string(LABEL_SIZE)?;
        let return_byte = cursor.read_u8()?;
        let unknown1 = cursor.read_array()?;
        let thumbnail_width = cursor.read_u8()?;
        let thumbnail_height = cursor.read_u8()?;
        let unknown2 = cursor.read_array()?;
        let color_count = cursor.read_u8()?;
        let color_indexes_offset = cursor.position();
        let color_indexes = cursor.read_bytes(usize::from(color_count) + 1)?.to_vec();
        // Padding fills the block out to 512 bytes.
        cursor.skip(FIRST_BLOCK_SIZE - (cursor.position() - start))?;

        Ok(Self {
            label,
            return_byte,
            unknown1,
            thumbnail_width,
            thumbnail_height,
            unknown2,
            color_count,
            color_indexes,
            color_indexes_offset,
        })
    }

    /// The label without its `LA:` prefix and trailing padding.
    pub fn design_name(&self) -> &str {
        let name = self.label.strip_prefix("LA:").unwrap_or(&self.label);
        name.trim_end_matches([' ', '\0'])
    }

    /// Thread references for palette resolution, one per index byte.
    pub fn color_refs(&self) -> impl Iterator<Item = ColorRef> + '_ {
        self.color_indexes
            .iter()
            .enumerate()
            .map(|(i, &number)| ColorRef {
                offset: self.color_indexes_offset + i,
                number: number.into(),
            })
    }
}

/// The second fixed block of a PEC body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PecGraphicHeader {
    pub unknown1: u16,
    pub thumbnail_offset: u16,
    pub unknown2: u32,
    /// Stitch area width, 0.1 mm.
    pub width: i16,
    /// Stitch area height, 0.1 mm.
    pub height: i16,
    pub unknown3: [u8; 8],
}

impl PecGraphicHeader {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            unknown1: cursor.read_u16()?,
            thumbnail_offset: cursor.read_u16()?,
            unknown2: cursor.read_u32()?,
            width: cursor.read_i16()?,
            height: cursor.read_i16()?,
            unknown3: cursor.read_array()?,
        })
    }
}

/// Decodes a one-byte coordinate: 7-bit two's complement, 0.1 units.
pub fn decode_short(byte: u8) -> Decimal {
    let mut value = i64::from(byte);
    if value >= 0x40 {
        value -= 0x80;
    }
    Decimal::new(value, 1)
}

/// Decodes a two-byte coordinate into its command and value.
pub fn decode_long(first: u8, second: u8) -> (MoveKind, Decimal) {
    let kind = match (first & COMMAND_MASK) >> 4 {
        1 => MoveKind::Jump,
        2 => MoveKind::Trim,
        _ => MoveKind::Stitch,
    };
    let mut value = (i64::from(first & 0x0F) << 8) | i64::from(second);
    if value & 0x800 != 0 {
        value -= 0x1000;
    }
    (kind, Decimal::new(value, 1))
}

/// One raw chunk of the stitch stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PecChunk {
    End,
    ColorChange(u8),
    Move {
        kind: MoveKind,
        dx: Decimal,
        dy: Decimal,
    },
}

enum Axis {
    Short(Decimal),
    Long(MoveKind, Decimal),
}

fn read_axis(cursor: &mut ByteCursor) -> Result<Axis> {
    let first = cursor.read_u8()?;
    if first & LONG_FLAG != 0 {
        let (kind, value) = decode_long(first, cursor.read_u8()?);
        Ok(Axis::Long(kind, value))
    } else {
        Ok(Axis::Short(decode_short(first)))
    }
}

fn merge(a: MoveKind, b: MoveKind) -> MoveKind {
    if a == MoveKind::Trim || b == MoveKind::Trim {
        MoveKind::Trim
    } else if a == MoveKind::Jump || b == MoveKind::Jump {
        MoveKind::Jump
    } else {
        MoveKind::Stitch
    }
}

/// Reads the next chunk of the stitch stream.
pub fn next_chunk(cursor: &mut ByteCursor) -> Result<PecChunk> {
    let first = cursor.peek_u8().map_err(|_| Error::MalformedSentinel {
        offset: cursor.position(),
    })?;

    match first {
        END_FLAG => {
            cursor.skip(1)?;
            Ok(PecChunk::End)
        }
        COLOR_FLAG => {
            let [_, _, index] = cursor.read_array::<3>()?;
            Ok(PecChunk::ColorChange(index))
        }
        _ => {
            let x = read_axis(cursor)?;
            let y = read_axis(cursor)?;
            let (kind, dx, dy) = match (x, y) {
                (Axis::Short(dx), Axis::Short(dy)) => (MoveKind::Stitch, dx, dy),
                (Axis::Short(dx), Axis::Long(kind, dy)) => (kind, dx, dy),
                (Axis::Long(kind, dx), Axis::Short(dy)) => (kind, dx, dy),
                (Axis::Long(kx, dx), Axis::Long(ky, dy)) => (merge(kx, ky), dx, dy),
            };
            Ok(PecChunk::Move { kind, dx, dy })
        }
    }
}

/// Turns the raw chunk stream into normalized commands.
///
/// Color changes are numbered in order of appearance; every one of them must
/// address an entry of the resolved palette.
#[derive(Debug)]
pub struct PecStitchDecoder<'p> {
    palette: &'p Palette,
    next_color: usize,
}

impl<'p> PecStitchDecoder<'p> {
    pub fn new(palette: &'p Palette) -> Self {
        Self {
            palette,
            next_color: 0,
        }
    }

    fn take_color(&mut self, offset: usize) -> Result<usize> {
        let index = self.next_color;
        self.palette.check_index(index, offset)?;
        self.next_color += 1;
        Ok(index)
    }

    pub fn decode(&mut self, cursor: &mut ByteCursor) -> Result<Vec<StitchCommand>> {
        let start = cursor.position();
        let mut commands = vec![StitchCommand::ColorChange(self.take_color(start)?)];

        loop {
            let offset = cursor.position();
            match next_chunk(cursor)? {
                PecChunk::End => {
                    commands.push(StitchCommand::End);
                    break;
                }
                PecChunk::ColorChange(raw) => {
                    let index = self.take_color(offset)?;
                    trace!(offset, raw, index, "color change");
                    commands.push(StitchCommand::ColorChange(index));
                }
                PecChunk::Move { kind, dx, dy } => {
                    commands.push(StitchCommand::movement(kind, dx, dy));
                }
            }
        }

        debug!(
            offset = start,
            bytes = cursor.position() - start,
            commands = commands.len(),
            "decoded PEC stitch stream"
        );
        Ok(commands)
    }
}
