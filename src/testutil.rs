// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/testutil.rs - Synthetic JEF and PES files for unit tests.
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

/// Little-endian byte builder.
#[derive(Debug, Default, Clone)]
pub struct Fixture(pub Vec<u8>);

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.0.extend(v.to_le_bytes());
        self
    }

    pub fn i16(mut self, v: i16) -> Self {
        self.0.extend(v.to_le_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend(v.to_le_bytes());
        self
    }

    pub fn f32(mut self, v: f32) -> Self {
        self.0.extend(v.to_le_bytes());
        self
    }

    pub fn bytes(mut self, v: &[u8]) -> Self {
        self.0.extend_from_slice(v);
        self
    }

    pub fn zeros(mut self, n: usize) -> Self {
        self.0.resize(self.0.len() + n, 0);
        self
    }

    /// A string with a one-byte length prefix.
    pub fn pstr(self, s: &str) -> Self {
        self.u8(s.len() as u8).bytes(s.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

/// A JEF file with the given header fields and raw stitch bytes.
pub fn jef_file(hoop: u32, extents: [u32; 4], colors: &[u32], stitches: &[u8]) -> Vec<u8> {
    let header_size = 116 + 4 * (colors.len() + 1);
    let mut f = Fixture::new()
        .u32(header_size as u32)
        .u32(0x14)
        .bytes(b"20240131120000")
        .bytes(b"5")
        .u8(0)
        .u32(colors.len() as u32)
        .u32(stitches.len() as u32 / 2)
        .u32(hoop);
    for v in extents {
        f = f.u32(v);
    }
    for table in 0..4u32 {
        for side in 0..4u32 {
            f = f.u32(table * 10 + side);
        }
    }
    for &color in colors {
        f = f.u32(color);
    }
    f.u32(0x0D).bytes(stitches).build()
}

/// The two fixed PEC blocks followed by `stitches`.
pub fn pec_body(label: &str, color_indexes: &[u8], stitches: &[u8]) -> Vec<u8> {
    let mut padded_label = format!("LA:{:<16}", label).into_bytes();
    padded_label.truncate(19);
    let color_count = color_indexes.len() as u8 - 1;
    Fixture::new()
        .bytes(&padded_label)
        .u8(b'\r')
        .zeros(14)
        .u8(6)
        .u8(38)
        .zeros(12)
        .u8(color_count)
        .bytes(color_indexes)
        .bytes(&vec![0x20; 462 - color_count as usize])
        // graphic block
        .u16(0)
        .u16(0x1234)
        .u32(0x31FF_F000)
        .i16(1800)
        .i16(-1000)
        .zeros(8)
        .bytes(stitches)
        .build()
}

/// A PES file: `version`, its version-specific `body`, a tail and a PEC body.
pub fn pes_file(version: &str, body: &[u8], pec: &[u8]) -> Vec<u8> {
    let pec_offset = 12 + body.len() + 4;
    Fixture::new()
        .bytes(b"#PES")
        .bytes(version.as_bytes())
        .u32(pec_offset as u32)
        .bytes(body)
        .u32(0xDEAD_BEEF)
        .bytes(pec)
        .build()
}

/// A version 0020 header body.
pub fn pes_v2_body(width: u16, height: u16, rotation: u16) -> Vec<u8> {
    Fixture::new()
        .u16(width)
        .u16(height)
        .u16(rotation)
        .zeros(18)
        .build()
}

pub fn description_block() -> Fixture {
    Fixture::new()
        .pstr("Rose")
        .pstr("Flowers")
        .pstr("Jane")
        .pstr("red,rose")
        .pstr("test design")
}

/// The display settings and object tables shared by 0050 and 0060 bodies.
pub fn display_and_objects(image_path: &str, colors: &[(&str, [u8; 3], &str)]) -> Fixture {
    let mut f = Fixture::new()
        .u16(1)
        .u16(2)
        .u16(3)
        .u16(4)
        .u16(5)
        .u16(6)
        .u16(0)
        .u16(1)
        .pstr(image_path)
        .f32(1.0)
        .f32(0.0)
        .f32(0.0)
        .f32(1.0)
        .f32(10.0)
        .f32(-5.0)
        // fill, motif and feather blocks
        .u16(2)
        .bytes(&[0xAA, 0xBB])
        .u16(0)
        .u16(1)
        .u8(0xCC)
        .u16(colors.len() as u16);
    for (code, rgb, name) in colors {
        f = f
            .pstr(code)
            .bytes(rgb)
            .u8(0)
            .u32(0xA)
            .pstr(name)
            .pstr("Embroidery")
            .pstr("Brother");
    }
    f.u16(1)
}

/// A version 0050 header body.
pub fn pes_v5_body(width: u16, height: u16, colors: &[(&str, [u8; 3], &str)]) -> Vec<u8> {
    let mut f = Fixture::new().u16(0).u16(0x11);
    f.0.extend(description_block().build());
    f = f.u16(0).u16(width).u16(height).u16(0);
    f.0.extend(display_and_objects("photo.png", colors).build());
    f.build()
}

/// A version 0060 header body.
pub fn pes_v6_body(width: u16, height: u16, colors: &[(&str, [u8; 3], &str)]) -> Vec<u8> {
    let mut f = Fixture::new().u16(1).u16(0x12);
    f.0.extend(description_block().build());
    f = f
        .u16(0)
        .u16(1)
        .u16(width)
        .u16(height)
        .u16(90)
        .u16(2000)
        .u16(2100)
        .u16(2970)
        .u16(2100)
        .u16(7);
    f.0.extend(display_and_objects("", colors).build());
    f.build()
}
