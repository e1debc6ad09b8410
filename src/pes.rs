// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/pes.rs - Header decoder for Brother PES files.
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
 * # `pes` Module
 *
 * A PES file is a 12-byte preamble, a version-specific header, a 4-byte tail
 * and then a PEC body at the offset named in the preamble. The stitches live
 * in the PEC body; the PES header contributes the hoop geometry, the design
 * description and, for versions 0050 and 0060, an embedded color table.
 *
 * The header size is computed field by field and is the only thing used to
 * check where the header ends, so every schema below must account for every
 * byte it covers.
 *
 * ## Usage Example
 *
 * ```no_run
 * use emblib::pes::PesFile;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let data = std::fs::read("example.pes")?;
 *     let pes = PesFile::from_bytes(&data)?;
 *
 *     println!("PES version {}", pes.header.preamble.version);
 *     for entry in pes.header.body.color_table() {
 *         println!("  {} {}", entry.code, entry.description);
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

use std::collections::HashMap;

use rgb::RGB8;
use tracing::{debug, warn};

use crate::cursor::ByteCursor;
use crate::design::CanvasSize;
use crate::error::{Error, Result};
use crate::palette::{BROTHER, Palette};
use crate::pec::{PecGraphicHeader, PecHeader, PecStitchDecoder};
use crate::stitch::StitchCommand;

pub const PES_MAGIC: &str = "#PES";
pub const PREAMBLE_SIZE: usize = 12;

/// The first 12 bytes of every PES file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    pub magic: String,
    pub version: String,
    /// Absolute offset of the PEC body.
    pub pec_offset: u32,
}

impl Preamble {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        let magic = cursor.read_string(4)?;
        let version = cursor.read_string(4)?;
        let pec_offset = cursor.read_u32()?;
        if magic != PES_MAGIC {
            warn!(?magic, "unexpected PES magic");
        }
        Ok(Self {
            magic,
            version,
            pec_offset,
        })
    }
}

/// The six known PES header schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PesVersion {
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
}

impl PesVersion {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "0001" => Some(PesVersion::V1),
            "0020" => Some(PesVersion::V2),
            "0030" => Some(PesVersion::V3),
            "0040" => Some(PesVersion::V4),
            "0050" => Some(PesVersion::V5),
            "0060" => Some(PesVersion::V6),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            PesVersion::V1 => "0001",
            PesVersion::V2 => "0020",
            PesVersion::V3 => "0030",
            PesVersion::V4 => "0040",
            PesVersion::V5 => "0050",
            PesVersion::V6 => "0060",
        }
    }
}

/// Hoop width, height and rotation, stored verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoopPlacement {
    pub width: u16,
    pub height: u16,
    pub rotation: u16,
}

impl HoopPlacement {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            width: cursor.read_u16()?,
            height: cursor.read_u16()?,
            rotation: cursor.read_u16()?,
        })
    }
}

/// The free-form design description carried by versions 0040 and later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description {
    pub design: String,
    pub category: String,
    pub author: String,
    pub keywords: String,
    pub comments: String,
}

impl Description {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            design: cursor.read_prefixed_string()?,
            category: cursor.read_prefixed_string()?,
            author: cursor.read_prefixed_string()?,
            keywords: cursor.read_prefixed_string()?,
            comments: cursor.read_prefixed_string()?,
        })
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        [
            ("Design", &self.design),
            ("Category", &self.category),
            ("Author", &self.author),
            ("Keywords", &self.keywords),
            ("Comments", &self.comments),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
    }
}

/// The leading section of 0050 and 0060 headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignInfo {
    pub hoop_indicator: u16,
    pub sub_version: u16,
    pub description: Description,
    pub hoop_change: u16,
}

impl DesignInfo {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            hoop_indicator: cursor.read_u16()?,
            sub_version: cursor.read_u16()?,
            description: Description::parse(cursor)?,
            hoop_change: cursor.read_u16()?,
        })
    }
}

/// Editor display settings of 0050 and 0060 headers.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub background: u16,
    pub foreground: u16,
    pub grid: u16,
    pub axes: u16,
    pub snap: u16,
    pub interval: u16,
    pub unknown: u16,
    pub optional_entries: u16,
    /// Path of a linked background image, empty when there is none.
    pub image_path: String,
    /// Affine transform of the linked image: a, b, c, d, tx, ty.
    pub transform: [f32; 6],
}

impl DisplaySettings {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        let background = cursor.read_u16()?;
        let foreground = cursor.read_u16()?;
        let grid = cursor.read_u16()?;
        let axes = cursor.read_u16()?;
        let snap = cursor.read_u16()?;
        let interval = cursor.read_u16()?;
        let unknown = cursor.read_u16()?;
        let optional_entries = cursor.read_u16()?;
        let image_path = cursor.read_prefixed_string()?;
        let mut transform = [0f32; 6];
        for value in &mut transform {
            *value = cursor.read_f32()?;
        }

        Ok(Self {
            background,
            foreground,
            grid,
            axes,
            snap,
            interval,
            unknown,
            optional_entries,
            image_path,
            transform,
        })
    }
}

/// Screen and paper dimensions, only present in 0060 headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayDimensions {
    pub width: u16,
    pub height: u16,
    pub paper_width: u16,
    pub paper_height: u16,
    pub unknown: u16,
}

impl DisplayDimensions {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            width: cursor.read_u16()?,
            height: cursor.read_u16()?,
            paper_width: cursor.read_u16()?,
            paper_height: cursor.read_u16()?,
            unknown: cursor.read_u16()?,
        })
    }
}

/// One thread of an embedded color table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTableEntry {
    /// Manufacturer thread code.
    pub code: String,
    pub color: RGB8,
    pub unknown: u8,
    pub thread_type: u32,
    pub description: String,
    pub brand: String,
    pub chart: String,
}

impl ColorTableEntry {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        let code = cursor.read_prefixed_string()?;
        let [r, g, b] = cursor.read_array()?;
        Ok(Self {
            code,
            color: RGB8 { r, g, b },
            unknown: cursor.read_u8()?,
            thread_type: cursor.read_u32()?,
            description: cursor.read_prefixed_string()?,
            brand: cursor.read_prefixed_string()?,
            chart: cursor.read_prefixed_string()?,
        })
    }
}

/// Fill, motif and feather data, the embedded color table and the object
/// count, closing out 0050 and 0060 headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTables {
    pub fill: Vec<u8>,
    pub motif: Vec<u8>,
    pub feather: Vec<u8>,
    pub colors: Vec<ColorTableEntry>,
    pub object_count: u16,
}

impl ObjectTables {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        let fill = cursor.read_prefixed_bytes_u16()?.to_vec();
        let motif = cursor.read_prefixed_bytes_u16()?.to_vec();
        let feather = cursor.read_prefixed_bytes_u16()?.to_vec();
        let color_count = cursor.read_u16()?;
        let colors = (0..color_count)
            .map(|_| ColorTableEntry::parse(cursor))
            .collect::<Result<Vec<_>>>()?;
        let object_count = cursor.read_u16()?;

        Ok(Self {
            fill,
            motif,
            feather,
            colors,
            object_count,
        })
    }
}

/// Version 0001: a hoop id and a block count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderV1 {
    pub hoop: u16,
    pub unknown: u16,
    pub block_count: u16,
}

impl HeaderV1 {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            hoop: cursor.read_u16()?,
            unknown: cursor.read_u16()?,
            block_count: cursor.read_u16()?,
        })
    }
}

/// Version 0020.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderV2 {
    pub placement: HoopPlacement,
    pub unknown: [u8; 18],
}

impl HeaderV2 {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            placement: HoopPlacement::parse(cursor)?,
            unknown: cursor.read_array()?,
        })
    }
}

/// Version 0030.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderV3 {
    pub unknown1: u16,
    pub sub_version: u16,
    pub placement: HoopPlacement,
    pub unknown2: [u8; 18],
}

impl HeaderV3 {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            unknown1: cursor.read_u16()?,
            sub_version: cursor.read_u16()?,
            placement: HoopPlacement::parse(cursor)?,
            unknown2: cursor.read_array()?,
        })
    }
}

/// Version 0040.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderV4 {
    pub unknown1: u16,
    pub sub_version: u16,
    pub description: Description,
    pub unknown2: u16,
    pub placement: HoopPlacement,
    pub unknown3: [u8; 22],
}

impl HeaderV4 {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            unknown1: cursor.read_u16()?,
            sub_version: cursor.read_u16()?,
            description: Description::parse(cursor)?,
            unknown2: cursor.read_u16()?,
            placement: HoopPlacement::parse(cursor)?,
            unknown3: cursor.read_array()?,
        })
    }
}

/// Version 0050.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderV5 {
    pub info: DesignInfo,
    pub placement: HoopPlacement,
    pub display: DisplaySettings,
    pub objects: ObjectTables,
}

impl HeaderV5 {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            info: DesignInfo::parse(cursor)?,
            placement: HoopPlacement::parse(cursor)?,
            display: DisplaySettings::parse(cursor)?,
            objects: ObjectTables::parse(cursor)?,
        })
    }
}

/// Version 0060.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderV6 {
    pub info: DesignInfo,
    pub custom_hoop: u16,
    pub placement: HoopPlacement,
    pub dimensions: DisplayDimensions,
    pub display: DisplaySettings,
    pub objects: ObjectTables,
}

impl HeaderV6 {
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            info: DesignInfo::parse(cursor)?,
            custom_hoop: cursor.read_u16()?,
            placement: HoopPlacement::parse(cursor)?,
            dimensions: DisplayDimensions::parse(cursor)?,
            display: DisplaySettings::parse(cursor)?,
            objects: ObjectTables::parse(cursor)?,
        })
    }
}

/// The version-specific part of a PES header.
#[derive(Debug, Clone, PartialEq)]
pub enum PesBody {
    V1(HeaderV1),
    V2(HeaderV2),
    V3(HeaderV3),
    V4(HeaderV4),
    V5(HeaderV5),
    V6(HeaderV6),
}

impl PesBody {
    pub fn parse(version: PesVersion, cursor: &mut ByteCursor) -> Result<Self> {
        Ok(match version {
            PesVersion::V1 => PesBody::V1(HeaderV1::parse(cursor)?),
            PesVersion::V2 => PesBody::V2(HeaderV2::parse(cursor)?),
            PesVersion::V3 => PesBody::V3(HeaderV3::parse(cursor)?),
            PesVersion::V4 => PesBody::V4(HeaderV4::parse(cursor)?),
            PesVersion::V5 => PesBody::V5(HeaderV5::parse(cursor)?),
            PesVersion::V6 => PesBody::V6(HeaderV6::parse(cursor)?),
        })
    }

    pub fn version(&self) -> PesVersion {
        match self {
            PesBody::V1(_) => PesVersion::V1,
            PesBody::V2(_) => PesVersion::V2,
            PesBody::V3(_) => PesVersion::V3,
            PesBody::V4(_) => PesVersion::V4,
            PesBody::V5(_) => PesVersion::V5,
            PesBody::V6(_) => PesVersion::V6,
        }
    }

    pub fn placement(&self) -> Option<&HoopPlacement> {
        match self {
            PesBody::V1(_) => None,
            PesBody::V2(h) => Some(&h.placement),
            PesBody::V3(h) => Some(&h.placement),
            PesBody::V4(h) => Some(&h.placement),
            PesBody::V5(h) => Some(&h.placement),
            PesBody::V6(h) => Some(&h.placement),
        }
    }

    pub fn description(&self) -> Option<&Description> {
        match self {
            PesBody::V1(_) | PesBody::V2(_) | PesBody::V3(_) => None,
            PesBody::V4(h) => Some(&h.description),
            PesBody::V5(h) => Some(&h.info.description),
            PesBody::V6(h) => Some(&h.info.description),
        }
    }

    pub fn display(&self) -> Option<&DisplaySettings> {
        match self {
            PesBody::V5(h) => Some(&h.display),
            PesBody::V6(h) => Some(&h.display),
            _ => None,
        }
    }

    /// The embedded color table; empty for versions that have none.
    pub fn color_table(&self) -> &[ColorTableEntry] {
        match self {
            PesBody::V5(h) => &h.objects.colors,
            PesBody::V6(h) => &h.objects.colors,
            _ => &[],
        }
    }
}

/// A complete PES header.
#[derive(Debug, Clone, PartialEq)]
pub struct PesHeader {
    pub preamble: Preamble,
    pub body: PesBody,
    pub tail: u32,
    size: usize,
}

impl PesHeader {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        let preamble = Preamble::parse(&mut cursor)?;
        let version =
            PesVersion::from_tag(&preamble.version).ok_or_else(|| Error::UnsupportedVersion {
                offset: 4,
                version: preamble.version.clone(),
            })?;
        let body = PesBody::parse(version, &mut cursor)?;
        let tail = cursor.read_u32()?;
        let size = cursor.consumed();

        debug!(
            version = version.tag(),
            size,
            pec_offset = preamble.pec_offset,
            colors = body.color_table().len(),
            "parsed PES header"
        );

        Ok(Self {
            preamble,
            body,
            tail,
            size,
        })
    }

    /// The exact number of bytes the header occupies.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn version(&self) -> PesVersion {
        self.body.version()
    }

    /// Validated absolute offset of the PEC body.
    pub fn pec_offset(&self, data_len: usize) -> Result<usize> {
        let offset = self.preamble.pec_offset as usize;
        if offset < self.size {
            return Err(Error::InvalidOffset {
                offset,
                minimum: self.size,
            });
        }
        if offset > data_len {
            return Err(Error::Truncated {
                offset,
                needed: 0,
                available: 0,
            });
        }
        Ok(offset)
    }

    /// Canvas size in header units, if the header defines one.
    pub fn canvas_size(&self) -> Option<CanvasSize> {
        match &self.body {
            PesBody::V1(h) => match h.hoop {
                0 => Some(CanvasSize::new(100, 100)),
                1 => Some(CanvasSize::new(130, 180)),
                _ => None,
            },
            body => body
                .placement()
                .map(|p| CanvasSize::new(p.width.into(), p.height.into())),
        }
    }

    pub fn rotation(&self) -> u16 {
        self.body.placement().map_or(0, |p| p.rotation)
    }

    /// The linked image path, if one is set.
    pub fn image_path(&self) -> Option<&str> {
        self.body
            .display()
            .map(|d| d.image_path.as_str())
            .filter(|path| !path.is_empty())
    }
}

/// A fully decoded PES file: header, PEC blocks, resolved palette and
/// normalized stitch commands.
#[derive(Debug, Clone, PartialEq)]
pub struct PesFile {
    pub header: PesHeader,
    pub pec: PecHeader,
    pub graphic: PecGraphicHeader,
    pub palette: Palette,
    pub commands: Vec<StitchCommand>,
}

impl PesFile {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = PesHeader::parse(data)?;
        let mut cursor = ByteCursor::at(data, header.pec_offset(data.len())?)?;
        let pec = PecHeader::parse(&mut cursor)?;
        let graphic = PecGraphicHeader::parse(&mut cursor)?;
        let palette = Palette::resolve(header.body.color_table(), &BROTHER, pec.color_refs())?;
        let commands = PecStitchDecoder::new(&palette).decode(&mut cursor)?;

        Ok(Self {
            header,
            pec,
            graphic,
            palette,
            commands,
        })
    }
}
