// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/jef.rs - Decoder for Janome JEF files.
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
 * # `jef` Module
 *
 * This module decodes Janome JEF files: a 116-byte fixed header, a list of
 * thread numbers terminated by `0x0D`, and a stream of signed byte pairs.
 *
 * ## Usage Example
 *
 * ```no_run
 * use emblib::design::DecodeOptions;
 * use emblib::jef::JefFile;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let data = std::fs::read("example.jef")?;
 *     let jef = JefFile::from_bytes(&data, &DecodeOptions::default())?;
 *
 *     println!("Hoop: {:?}", jef.header.hoop);
 *     for command in &jef.commands {
 *         println!("{}", command);
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::{debug, trace, warn};

use crate::cursor::ByteCursor;
use crate::design::{CanvasSize, DecodeOptions};
use crate::error::{Error, Result};
use crate::palette::{ColorRef, JANOME, Palette};
use crate::stitch::StitchCommand;

/// Size of the header up to the color-change list.
pub const FIXED_HEADER_SIZE: usize = 116;

const COLOR_LIST_END: u32 = 0x0D;
const DATE_FORMAT: &str = "%Y%m%d%H%M%S";

const ESCAPE: u8 = 0x80;
const ESCAPE_COLOR_CHANGE: u8 = 0x01;
const ESCAPE_MOVE: u8 = 0x02;
const ESCAPE_END: u8 = 0x10;
const STREAM_END: u8 = 0xFF;

/// The hoop a design was laid out for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hoop {
    /// 110 x 110 mm
    A,
    /// 50 x 50 mm
    C,
    /// 140 x 200 mm
    B,
    /// 126 x 110 mm
    F,
    /// 200 x 200 mm
    Sq200,
    Other(u32),
}

impl Hoop {
    pub fn from_id(id: u32) -> Self {
        match id {
            0 => Hoop::A,
            1 => Hoop::C,
            2 => Hoop::B,
            3 => Hoop::F,
            4 => Hoop::Sq200,
            other => Hoop::Other(other),
        }
    }

    /// Physical hoop size in millimeters.
    pub fn size(self) -> Option<CanvasSize> {
        match self {
            Hoop::A => Some(CanvasSize::new(110, 110)),
            Hoop::C => Some(CanvasSize::new(50, 50)),
            Hoop::B => Some(CanvasSize::new(140, 200)),
            Hoop::F => Some(CanvasSize::new(126, 110)),
            Hoop::Sq200 => Some(CanvasSize::new(200, 200)),
            Hoop::Other(_) => None,
        }
    }
}

/// A parsed JEF header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JefHeader {
    /// Stitch offset as recorded in the file.
    pub stitch_offset: u32,
    pub unknown1: u32,
    pub date: String,
    pub version: String,
    pub unknown2: u8,
    pub color_count: u32,
    pub points_length: u32,
    pub hoop: Hoop,
    /// Design extents from the hoop center: left, top, right, bottom.
    pub extents: [u32; 4],
    /// Insets from the edges of the 110x110, 50x50, 140x200 and custom hoops.
    pub hoop_insets: [[u32; 4]; 4],
    /// Janome thread numbers, one per color block.
    pub color_changes: Vec<u32>,
    color_changes_offset: usize,
    size: usize,
}

fn read_table(cursor: &mut ByteCursor) -> Result<[u32; 4]> {
    let mut table = [0u32; 4];
    for value in &mut table {
        *value = cursor.read_u32()?;
    }
    Ok(table)
}

impl JefHeader {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        let stitch_offset = cursor.read_u32()?;
        let unknown1 = cursor.read_u32()?;
        let date = cursor.read_string(14)?;
        let version = cursor.read_string(1)?;
        let unknown2 = cursor.read_u8()?;
        let color_count = cursor.read_u32()?;
        let points_length = cursor.read_u32()?;
        let hoop = Hoop::from_id(cursor.read_u32()?);
        let extents = read_table(&mut cursor)?;
        let mut hoop_insets = [[0u32; 4]; 4];
        for table in &mut hoop_insets {
            *table = read_table(&mut cursor)?;
        }

        let color_changes_offset = cursor.position();
        let mut color_changes = Vec::new();
        loop {
            let value = cursor.read_u32()?;
            if value == COLOR_LIST_END {
                break;
            }
            color_changes.push(value);
        }
        // Some writers pad the list with extra terminators.
        while cursor.remaining() >= 4 && cursor.peek_u32()? == COLOR_LIST_END {
            cursor.skip(4)?;
        }

        let size = cursor.consumed();
        if stitch_offset as usize != size {
            warn!(
                recorded = stitch_offset,
                computed = size,
                "JEF stitch offset disagrees with header size"
            );
        }
        debug!(
            size,
            ?hoop,
            colors = color_changes.len(),
            points = points_length,
            "parsed JEF header"
        );

        Ok(Self {
            stitch_offset,
            unknown1,
            date,
            version,
            unknown2,
            color_count,
            points_length,
            hoop,
            extents,
            hoop_insets,
            color_changes,
            color_changes_offset,
            size,
        })
    }

    /// The exact number of bytes the header occupies.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Canvas size from the extents when they are all set, else from the hoop.
    pub fn canvas_size(&self) -> Option<CanvasSize> {
        let [left, top, right, bottom] = self.extents;
        if self.extents.iter().all(|&e| e != 0) {
            Some(CanvasSize::new(
                left.saturating_add(right),
                top.saturating_add(bottom),
            ))
        } else {
            self.hoop.size()
        }
    }

    /// Creation time, if the date field holds a valid timestamp.
    pub fn created(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    pub fn color_refs(&self) -> impl Iterator<Item = ColorRef> + '_ {
        self.color_changes
            .iter()
            .enumerate()
            .map(|(i, &number)| ColorRef {
                offset: self.color_changes_offset + 4 * i,
                number: number as usize,
            })
    }
}

/// Decodes the JEF stitch stream into normalized commands.
#[derive(Debug)]
pub struct JefStitchDecoder<'p> {
    palette: &'p Palette,
    expansion: Decimal,
    /// Next entry of the color-change list to use.
    next_color: usize,
}

impl<'p> JefStitchDecoder<'p> {
    pub fn new(palette: &'p Palette, expansion: Decimal) -> Self {
        Self {
            palette,
            expansion,
            next_color: 0,
        }
    }

    fn take_color(&mut self, offset: usize) -> Result<usize> {
        let index = self.next_color;
        self.palette.check_index(index, offset)?;
        self.next_color += 1;
        Ok(index)
    }

    fn scale(&self, value: i8) -> Decimal {
        Decimal::from(value) * self.expansion
    }

    /// A JEF displacement: y grows upwards in the file.
    fn delta(&self, x: u8, y: u8) -> (Decimal, Decimal) {
        (self.scale(x as i8), -self.scale(y as i8))
    }

    pub fn decode(&mut self, cursor: &mut ByteCursor) -> Result<Vec<StitchCommand>> {
        let start = cursor.position();
        let mut commands = vec![StitchCommand::ColorChange(self.take_color(start)?)];

        loop {
            let offset = cursor.position();
            if cursor.remaining() < 2 {
                return Err(Error::MalformedSentinel { offset });
            }
            let [b0, b1] = cursor.read_array()?;

            if b0 == STREAM_END && b1 == STREAM_END {
                break;
            }
            if b0 != ESCAPE {
                let (dx, dy) = self.delta(b0, b1);
                commands.push(StitchCommand::Stitch { dx, dy });
                continue;
            }

            match b1 {
                ESCAPE_END => break,
                ESCAPE_COLOR_CHANGE => {
                    let [x, y] = cursor.read_array()?;
                    let index = self.take_color(offset)?;
                    trace!(offset, index, "color change");
                    commands.push(StitchCommand::ColorChange(index));
                    if x != 0 || y != 0 {
                        let (dx, dy) = self.delta(x, y);
                        commands.push(StitchCommand::Jump { dx, dy });
                    }
                }
                ESCAPE_MOVE => {
                    let [x, y] = cursor.read_array()?;
                    let (dx, dy) = self.delta(x, y);
                    if x == 0 && y == 0 {
                        commands.push(StitchCommand::Trim { dx, dy });
                    } else {
                        commands.push(StitchCommand::Jump { dx, dy });
                    }
                }
                command => return Err(Error::UnknownCommand { offset, command }),
            }
        }
        commands.push(StitchCommand::End);

        debug!(
            offset = start,
            bytes = cursor.position() - start,
            commands = commands.len(),
            "decoded JEF stitch stream"
        );
        Ok(commands)
    }
}

/// A fully decoded JEF file.
#[derive(Debug, Clone, PartialEq)]
pub struct JefFile {
    pub header: JefHeader,
    pub palette: Palette,
    pub commands: Vec<StitchCommand>,
}

impl JefFile {
    pub fn from_bytes(data: &[u8], options: &DecodeOptions) -> Result<Self> {
        let header = JefHeader::parse(data)?;
        let palette = Palette::resolve(&[], &JANOME, header.color_refs())?;
        let mut cursor = ByteCursor::at(data, header.size())?;
        let commands = JefStitchDecoder::new(&palette, options.jef_expansion).decode(&mut cursor)?;

        Ok(Self {
            header,
            palette,
            commands,
        })
    }
}
