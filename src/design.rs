// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/design.rs - Format-agnostic embroidery design payload.
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
 * # `design` Module
 *
 * This module assembles the output of the JEF and PES decoders into a single
 * [`DesignPayload`]: canvas geometry, description, normalized stitch commands
 * and the resolved thread palette.
 *
 * ## Usage Example
 *
 * ```no_run
 * use emblib::design::DesignPayload;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let design = DesignPayload::from_filename("example.pes")?;
 *
 *     if let Some(size) = design.size {
 *         println!("Canvas: {}x{}", size.width, size.height);
 *     }
 *
 *     let counts = design.command_counts();
 *     println!("{} stitches in {} colors", counts.stitches, design.palette.len());
 *
 *     Ok(())
 * }
 * ```
 */

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rgb::RGB8;
use rust_decimal::Decimal;
use tracing::info;

use crate::error::{Error, Result};
use crate::jef::JefFile;
use crate::palette::Palette;
use crate::pes::PesFile;
use crate::stitch::StitchCommand;

/// Source container format. Chosen by the caller, never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Jef,
    Pes,
}

impl Format {
    /// Picks the format from a file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        path.extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| Error::UnknownFormat(path.display().to_string()))?
            .parse()
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jef" => Ok(Format::Jef),
            "pes" => Ok(Format::Pes),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Jef => write!(f, "JEF"),
            Format::Pes => write!(f, "PES"),
        }
    }
}

/// Canvas width and height, in the units of the source header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Tunables applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Factor applied to every JEF displacement.
    pub jef_expansion: Decimal,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            jef_expansion: Decimal::new(5, 1),
        }
    }
}

impl DecodeOptions {
    pub fn with_jef_expansion(mut self, expansion: Decimal) -> Self {
        self.jef_expansion = expansion;
        self
    }
}

/// Per-kind totals over a command sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandCounts {
    pub stitches: usize,
    pub jumps: usize,
    pub trims: usize,
    pub color_changes: usize,
}

/// Extremes of the absolute needle position, starting from the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: Decimal,
    pub min_y: Decimal,
    pub max_x: Decimal,
    pub max_y: Decimal,
}

impl Bounds {
    pub fn width(&self) -> Decimal {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> Decimal {
        self.max_y - self.min_y
    }
}

/// A decoded design, independent of the file format it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignPayload {
    pub format: Format,
    /// `None` when the header does not define a canvas.
    pub size: Option<CanvasSize>,
    pub rotation: u16,
    pub description: HashMap<String, String>,
    pub commands: Vec<StitchCommand>,
    pub palette: Palette,
    pub image_path: Option<String>,
    /// Design name stored in the PEC block.
    pub label: Option<String>,
    /// Creation time stored in the JEF header.
    pub created: Option<NaiveDateTime>,
}

impl DesignPayload {
    /// Decodes a whole file image.
    ///
    /// # Arguments
    ///
    /// * `data` - The complete contents of the file.
    /// * `format` - The container format of `data`.
    /// * `options` - Decoding tunables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the design, or the first structural error found.
    pub fn decode(data: &[u8], format: Format, options: &DecodeOptions) -> Result<Self> {
        let design = match format {
            Format::Jef => Self::from_jef(JefFile::from_bytes(data, options)?),
            Format::Pes => Self::from_pes(PesFile::from_bytes(data)?),
        };
        info!(
            %format,
            bytes = data.len(),
            commands = design.commands.len(),
            colors = design.palette.len(),
            "decoded design"
        );
        Ok(design)
    }

    pub fn from_bytes(data: &[u8], format: Format) -> Result<Self> {
        Self::decode(data, format, &DecodeOptions::default())
    }

    /// Reads and decodes a file, taking the format from its extension.
    pub fn from_filename<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let data = std::fs::read(path)?;
        Self::from_bytes(&data, format)
    }

    pub fn from_jef(jef: JefFile) -> Self {
        Self {
            format: Format::Jef,
            size: jef.header.canvas_size(),
            rotation: 0,
            description: HashMap::new(),
            created: jef.header.created(),
            commands: jef.commands,
            palette: jef.palette,
            image_path: None,
            label: None,
        }
    }

    pub fn from_pes(pes: PesFile) -> Self {
        let label = Some(pes.pec.design_name())
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        Self {
            format: Format::Pes,
            size: pes.header.canvas_size(),
            rotation: pes.header.rotation(),
            description: pes
                .header
                .body
                .description()
                .map(|d| d.to_map())
                .unwrap_or_default(),
            image_path: pes.header.image_path().map(str::to_string),
            label,
            created: None,
            commands: pes.commands,
            palette: pes.palette,
        }
    }

    /// The color of a palette index, as carried by `ColorChange`.
    pub fn palette_color(&self, index: usize) -> Option<RGB8> {
        self.palette.get(index).map(|entry| entry.color)
    }

    pub fn command_counts(&self) -> CommandCounts {
        let mut counts = CommandCounts::default();
        for command in &self.commands {
            match command {
                StitchCommand::Stitch { .. } => counts.stitches += 1,
                StitchCommand::Jump { .. } => counts.jumps += 1,
                StitchCommand::Trim { .. } => counts.trims += 1,
                StitchCommand::ColorChange(_) => counts.color_changes += 1,
                StitchCommand::End => {}
            }
        }
        counts
    }

    /// Bounding box of every position the needle visits, or `None` if the
    /// design never moves.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut x = Decimal::ZERO;
        let mut y = Decimal::ZERO;
        let mut bounds: Option<Bounds> = None;
        for (dx, dy) in self.commands.iter().filter_map(StitchCommand::delta) {
            x += dx;
            y += dy;
            bounds = Some(match bounds {
                None => Bounds {
                    min_x: x.min(Decimal::ZERO),
                    min_y: y.min(Decimal::ZERO),
                    max_x: x.max(Decimal::ZERO),
                    max_y: y.max(Decimal::ZERO),
                },
                Some(b) => Bounds {
                    min_x: b.min_x.min(x),
                    min_y: b.min_y.min(y),
                    max_x: b.max_x.max(x),
                    max_y: b.max_y.max(y),
                },
            });
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;

    #[test]
    fn test_format_names() {
        assert_eq!("jef".parse::<Format>().unwrap(), Format::Jef);
        assert_eq!("PES".parse::<Format>().unwrap(), Format::Pes);
        assert!(matches!(
            "dst".parse::<Format>(),
            Err(Error::UnknownFormat(name)) if name == "dst"
        ));
        assert_eq!(Format::from_path("designs/Rose.JEF").unwrap(), Format::Jef);
        assert!(matches!(
            Format::from_path("README"),
            Err(Error::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_pes_v2_payload() {
        let pec = pec_body("rose", &[20], &[0x0A, 0x76, 0xFF]);
        let data = pes_file("0020", &pes_v2_body(1800, 1000, 90), &pec);
        let design = DesignPayload::from_bytes(&data, Format::Pes).unwrap();

        assert_eq!(design.format, Format::Pes);
        assert_eq!(design.size, Some(CanvasSize::new(1800, 1000)));
        assert_eq!(design.rotation, 90);
        assert!(design.description.is_empty());
        assert_eq!(design.image_path, None);
        assert_eq!(design.label.as_deref(), Some("rose"));
        assert_eq!(design.palette_color(0), Some(RGB8::new(0, 0, 0)));
        assert_eq!(design.palette_color(1), None);
        assert_eq!(
            design.commands,
            vec![
                StitchCommand::ColorChange(0),
                StitchCommand::Stitch {
                    dx: Decimal::new(10, 1),
                    dy: Decimal::new(-10, 1)
                },
                StitchCommand::End,
            ]
        );
    }

    #[test]
    fn test_pes_v5_payload() {
        let colors = [("001", [0x11, 0x22, 0x33], "Navy")];
        let pec = pec_body("", &[3], &[0xFF]);
        let data = pes_file("0050", &pes_v5_body(130, 180, &colors), &pec);
        let design = DesignPayload::from_bytes(&data, Format::Pes).unwrap();

        assert_eq!(design.size, Some(CanvasSize::new(130, 180)));
        assert_eq!(design.description["Design"], "Rose");
        assert_eq!(design.description["Comments"], "test design");
        assert_eq!(design.image_path.as_deref(), Some("photo.png"));
        assert_eq!(design.label, None);
        assert_eq!(design.palette.len(), 1);
        assert_eq!(design.palette_color(0), Some(RGB8::new(0x11, 0x22, 0x33)));
        assert_eq!(design.command_counts().color_changes, 1);
    }

    #[test]
    fn test_jef_payload() {
        let stitches = [0x02, 0x02, 0x80, 0x02, 0x00, 0x00, 0x80, 0x01, 0x00, 0x00, 0x80, 0x10];
        let data = jef_file(2, [0; 4], &[1, 10], &stitches);
        let design = DesignPayload::from_bytes(&data, Format::Jef).unwrap();

        assert_eq!(design.format, Format::Jef);
        assert_eq!(design.size, Some(CanvasSize::new(140, 200)));
        assert_eq!(design.rotation, 0);
        assert_eq!(design.created.unwrap().to_string(), "2024-01-31 12:00:00");
        assert_eq!(design.palette_color(1), Some(RGB8::new(0xFF, 0x00, 0x00)));
        assert_eq!(
            design.command_counts(),
            CommandCounts {
                stitches: 1,
                jumps: 0,
                trims: 1,
                color_changes: 2,
            }
        );
    }

    #[test]
    fn test_single_trailing_end() {
        let jef = jef_file(0, [0; 4], &[1], &[0x01, 0x01, 0xFF, 0xFF]);
        let pes = pes_file("0020", &pes_v2_body(10, 10, 0), &pec_body("a", &[1], &[0xFF]));
        for (data, format) in [(jef, Format::Jef), (pes, Format::Pes)] {
            let design = DesignPayload::from_bytes(&data, format).unwrap();
            assert!(matches!(design.commands[0], StitchCommand::ColorChange(0)));
            assert_eq!(design.commands.iter().filter(|c| c.is_end()).count(), 1);
            assert_eq!(design.commands.last(), Some(&StitchCommand::End));
        }
    }

    #[test]
    fn test_bounds() {
        let stitches = [0x0A, 0x00, 0x00, 0xF6, 0xEC, 0x00, 0x80, 0x10];
        let data = jef_file(0, [0; 4], &[1], &stitches);
        let design = DesignPayload::from_bytes(&data, Format::Jef).unwrap();
        let bounds = design.bounds().unwrap();
        assert_eq!(bounds.min_x, Decimal::new(-50, 1));
        assert_eq!(bounds.max_x, Decimal::new(50, 1));
        assert_eq!(bounds.min_y, Decimal::ZERO);
        assert_eq!(bounds.max_y, Decimal::new(50, 1));
        assert_eq!(bounds.width(), Decimal::from(10));

        let data = jef_file(0, [0; 4], &[1], &[0x80, 0x10]);
        let design = DesignPayload::from_bytes(&data, Format::Jef).unwrap();
        assert_eq!(design.bounds(), None);
    }

    #[test]
    fn test_errors_carry_offsets() {
        let mut data = pes_file("0020", &pes_v2_body(10, 10, 0), &pec_body("a", &[1], &[0xFF]));
        data.truncate(data.len() - 1);
        let err = DesignPayload::from_bytes(&data, Format::Pes).unwrap_err();
        assert!(matches!(err, Error::MalformedSentinel { .. }));
        assert_eq!(err.offset(), Some(data.len()));
    }

    #[test]
    fn test_missing_file() {
        let err = DesignPayload::from_filename("/nonexistent/design.jef").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
