// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/lib.rs - Decoder library for Janome JEF and Brother PES/PEC files.
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
 * # `emblib` Crate
 *
 * A library for decoding Janome JEF and Brother PES/PEC embroidery files into
 * a single format-agnostic design.
 *
 * Decoding runs in three steps:
 *
 * 1. [jef] or [pes]: Parses the version-specific header and locates the
 *    stitch data.
 * 2. [pec] (for PES) or [jef]: Turns the packed stitch stream into
 *    [stitch::StitchCommand]s.
 * 3. [palette]: Resolves thread colors from an embedded table or a standard
 *    thread chart.
 *
 * [design::DesignPayload] ties the steps together.
 *
 * ## Usage Example
 *
 * ```no_run
 * use emblib::{DesignPayload, Format, StitchCommand};
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let data = std::fs::read("example.jef")?;
 *     let design = DesignPayload::from_bytes(&data, Format::Jef)?;
 *
 *     for command in &design.commands {
 *         if let StitchCommand::ColorChange(index) = command {
 *             println!("Thread: {:?}", design.palette.get(*index));
 *         }
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

pub mod cursor;
pub mod design;
pub mod error;
pub mod jef;
pub mod palette;
pub mod pec;
pub mod pes;
pub mod stitch;

#[cfg(test)]
mod testutil;

pub use design::{CanvasSize, DecodeOptions, DesignPayload, Format};
pub use error::{Error, Result};
pub use palette::{Palette, PaletteEntry};
pub use stitch::{MoveKind, StitchCommand};
