// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/palette.rs - Thread palettes and palette resolution.
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
 * # `palette` Module
 *
 * Standard thread charts for the Janome and Brother machine families, and the
 * resolution of a file's color references into a concrete [Palette].
 *
 * Files either embed their own color table (PES 0050 and 0060) or refer to
 * threads by their 1-based position in the manufacturer's standard chart.
 */

use rgb::RGB8;
use tracing::debug;

use crate::error::{Error, Result};
use crate::pes::ColorTableEntry;

/// A named thread in a standard chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thread {
    pub name: &'static str,
    pub color: RGB8,
}

const fn thread(name: &'static str, r: u8, g: u8, b: u8) -> Thread {
    Thread {
        name,
        color: RGB8 { r, g, b },
    }
}

/// A manufacturer's fixed, ordered thread chart.
#[derive(Debug)]
pub struct StandardPalette {
    name: &'static str,
    threads: &'static [Thread],
}

impl StandardPalette {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Looks up a thread by its 1-based number as stored in files.
    pub fn get(&self, number: usize) -> Option<&'static Thread> {
        number.checked_sub(1).and_then(|i| self.threads.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Thread> {
        self.threads.iter()
    }
}

/// The Janome thread chart used by JEF files.
pub static JANOME: StandardPalette = StandardPalette {
    name: "Janome",
    threads: &JANOME_THREADS,
};

/// The Brother thread chart used by PEC bodies without an embedded table.
pub static BROTHER: StandardPalette = StandardPalette {
    name: "Brother",
    threads: &BROTHER_THREADS,
};

const JANOME_THREADS: [Thread; 78] = [
    thread("Black", 0x00, 0x00, 0x00),
    thread("White", 0xff, 0xff, 0xff),
    thread("Sunflower", 0xff, 0xff, 0x17),
    thread("Hazel", 0xfa, 0xa0, 0x60),
    thread("Olive Green", 0x5c, 0x76, 0x49),
    thread("Green", 0x40, 0xc0, 0x30),
    thread("Sky", 0x65, 0xc2, 0xc8),
    thread("Purple", 0xac, 0x80, 0xbe),
    thread("Pink", 0xf5, 0xbc, 0xcb),
    thread("Red", 0xff, 0x00, 0x00),
    thread("Brown", 0xc0, 0x80, 0x00),
    thread("Blue", 0x00, 0x00, 0xf0),
    thread("Gold", 0xe4, 0xc3, 0x5d),
    thread("Dark Brown", 0xa5, 0x2a, 0x2a),
    thread("Pale Violet", 0xd5, 0xb0, 0xd4),
    thread("Pale Yellow", 0xfc, 0xf2, 0x94),
    thread("Pale Pink", 0xf0, 0xd0, 0xc0),
    thread("Peach", 0xff, 0xc0, 0x00),
    thread("Beige", 0xc9, 0xa4, 0x80),
    thread("Wine Red", 0x9b, 0x3d, 0x4b),
    thread("Pale Sky", 0xa0, 0xb8, 0xcc),
    thread("Yellow Green", 0x7f, 0xc2, 0x1c),
    thread("Silver Grey", 0xb9, 0xb9, 0xb9),
    thread("Grey", 0xa0, 0xa0, 0xa0),
    thread("Pale Aqua", 0x98, 0xd6, 0xbd),
    thread("Baby Blue", 0xb8, 0xf0, 0xf0),
    thread("Powder Blue", 0x36, 0x8b, 0xa0),
    thread("Bright Blue", 0x4f, 0x83, 0xab),
    thread("Slate Blue", 0x38, 0x6a, 0x91),
    thread("Navy Blue", 0x00, 0x20, 0x6b),
    thread("Salmon Pink", 0xe5, 0xc5, 0xca),
    thread("Coral", 0xf9, 0x67, 0x6b),
    thread("Burnt Orange", 0xe3, 0x31, 0x1f),
    thread("Cinnamon", 0xe2, 0xa1, 0x88),
    thread("Umber", 0xb5, 0x94, 0x74),
    thread("Blonde", 0xe4, 0xcf, 0x99),
    thread("Sunflower", 0xe1, 0xcb, 0x00),
    thread("Orchid Pink", 0xe1, 0xad, 0xd4),
    thread("Peony Purple", 0xc3, 0x00, 0x7e),
    thread("Burgundy", 0x80, 0x00, 0x4b),
    thread("Royal Purple", 0xa0, 0x60, 0xb0),
    thread("Cardinal Red", 0xc0, 0x40, 0x20),
    thread("Opal Green", 0xca, 0xe0, 0xc0),
    thread("Moss Green", 0x89, 0x98, 0x56),
    thread("Meadow Green", 0x00, 0xaa, 0x00),
    thread("Dark Green", 0x21, 0x8a, 0x21),
    thread("Aquamarine", 0x5d, 0xae, 0x94),
    thread("Emerald Green", 0x4c, 0xbf, 0x8f),
    thread("Peacock Green", 0x00, 0x77, 0x72),
    thread("Dark Grey", 0x70, 0x70, 0x70),
    thread("Ivory White", 0xf2, 0xff, 0xff),
    thread("Hazel", 0xb1, 0x58, 0x18),
    thread("Toast", 0xcb, 0x8a, 0x07),
    thread("Salmon", 0xf7, 0x92, 0x7b),
    thread("Cocoa Brown", 0x98, 0x69, 0x2d),
    thread("Sienna", 0xa2, 0x71, 0x48),
    thread("Sepia", 0x7b, 0x55, 0x4a),
    thread("Dark Sepia", 0x4f, 0x39, 0x46),
    thread("Violet Blue", 0x52, 0x3a, 0x97),
    thread("Blue Ink", 0x00, 0x00, 0xa0),
    thread("Solar Blue", 0x00, 0x96, 0xde),
    thread("Green Dust", 0xb2, 0xdd, 0x53),
    thread("Crimson", 0xfa, 0x8f, 0xbb),
    thread("Floral Pink", 0xde, 0x64, 0x9e),
    thread("Wine", 0xb5, 0x50, 0x66),
    thread("Olive Drab", 0x5e, 0x57, 0x47),
    thread("Meadow", 0x4c, 0x88, 0x1f),
    thread("Canary Yellow", 0xe4, 0xdc, 0x79),
    thread("Toast", 0xcb, 0x8a, 0x1a),
    thread("Beige", 0xc6, 0xaa, 0x42),
    thread("Honeydew", 0xec, 0xb0, 0x2c),
    thread("Tangerine", 0xf8, 0x80, 0x40),
    thread("Ocean Blue", 0xff, 0xe5, 0x05),
    thread("Sepia", 0xfa, 0x7a, 0x7a),
    thread("Royal Purple", 0x6b, 0xe0, 0x00),
    thread("Yellow Ocher", 0x38, 0x6c, 0xae),
    thread("Beige Grey", 0xd0, 0xba, 0xb0),
    thread("Bamboo", 0xe3, 0xbe, 0x81),
];

const BROTHER_THREADS: [Thread; 38] = [
    thread("Prussian Blue", 0x1a, 0x0a, 0x94),
    thread("Blue", 0x0f, 0x75, 0xff),
    thread("Teal Green", 0x00, 0x93, 0x4c),
    thread("Cornflower Blue", 0xba, 0xbd, 0xfe),
    thread("Red", 0xec, 0x00, 0x00),
    thread("Red Brown", 0xe4, 0x99, 0x5a),
    thread("Magenta", 0xcc, 0x48, 0xab),
    thread("Light Lilac", 0xfd, 0xc4, 0xfa),
    thread("Lilac", 0xdd, 0x84, 0xab),
    thread("Mint Green", 0x6b, 0xd3, 0x8a),
    thread("Deep Gold", 0xe4, 0xa9, 0x45),
    thread("Orange", 0xff, 0xbd, 0x42),
    thread("Yellow", 0xff, 0xe6, 0x00),
    thread("Lime Green", 0x6c, 0xd9, 0x00),
    thread("Brass", 0xc1, 0xa9, 0x41),
    thread("Silver", 0xb5, 0xad, 0x97),
    thread("Russet Brown", 0xba, 0x9c, 0x5f),
    thread("Cream Brown", 0xfa, 0xf5, 0x9e),
    thread("Pewter", 0x80, 0x80, 0x80),
    thread("Black", 0x00, 0x00, 0x00),
    thread("Ultramarine", 0x00, 0x1c, 0xdf),
    thread("Royal Purple", 0xdf, 0x00, 0xb8),
    thread("Dark Gray", 0x62, 0x62, 0x62),
    thread("Dark Brown", 0x69, 0x26, 0x0d),
    thread("Deep Rose", 0xff, 0x00, 0x60),
    thread("Light Brown", 0xbf, 0x82, 0x00),
    thread("Salmon Pink", 0xf3, 0x91, 0x78),
    thread("Vermilion", 0xff, 0x68, 0x05),
    thread("White", 0xf0, 0xf0, 0xf0),
    thread("Violet", 0xc8, 0x32, 0xcd),
    thread("Sea Crest", 0xb0, 0xbf, 0x9b),
    thread("Sky Blue", 0x65, 0xbf, 0xeb),
    thread("Pumpkin", 0xff, 0xba, 0x04),
    thread("Cream Yellow", 0xff, 0xf0, 0x6c),
    thread("Khaki", 0xfe, 0xca, 0x15),
    thread("Clay Brown", 0xf3, 0x81, 0x01),
    thread("Leaf Green", 0x37, 0xa9, 0x23),
    thread("Peacock Blue", 0x23, 0x46, 0x5f),
];

/// A 1-based thread number read from a file, with the offset it was read at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRef {
    pub offset: usize,
    pub number: usize,
}

/// One color of a resolved palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub name: String,
    pub color: RGB8,
}

/// The ordered colors a design's color changes index into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    /// Resolves a design's palette.
    ///
    /// A non-empty embedded table wins verbatim. Otherwise each reference is
    /// looked up in `chart` by its 1-based thread number.
    pub fn resolve<I>(embedded: &[ColorTableEntry], chart: &StandardPalette, refs: I) -> Result<Self>
    where
        I: IntoIterator<Item = ColorRef>,
    {
        if embedded.is_empty() {
            Self::from_standard(chart, refs)
        } else {
            Ok(Self::from_embedded(embedded))
        }
    }

    pub fn from_embedded(table: &[ColorTableEntry]) -> Self {
        let entries = table
            .iter()
            .map(|entry| PaletteEntry {
                name: entry.description.clone(),
                color: entry.color,
            })
            .collect::<Vec<_>>();
        debug!(colors = entries.len(), "using embedded color table");
        Self { entries }
    }

    pub fn from_standard<I>(chart: &StandardPalette, refs: I) -> Result<Self>
    where
        I: IntoIterator<Item = ColorRef>,
    {
        let mut entries = Vec::new();
        for color_ref in refs {
            let thread = chart
                .get(color_ref.number)
                .ok_or(Error::PaletteIndexOutOfRange {
                    offset: color_ref.offset,
                    index: color_ref.number,
                    len: chart.len(),
                })?;
            entries.push(PaletteEntry {
                name: thread.name.to_string(),
                color: thread.color,
            });
        }
        debug!(chart = chart.name(), colors = entries.len(), "resolved standard palette");
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PaletteEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaletteEntry> {
        self.entries.iter()
    }

    pub fn colors(&self) -> impl Iterator<Item = RGB8> + '_ {
        self.entries.iter().map(|entry| entry.color)
    }

    /// Fails unless `index` addresses an entry of this palette.
    pub(crate) fn check_index(&self, index: usize, offset: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(Error::PaletteIndexOutOfRange {
                offset,
                index,
                len: self.entries.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(numbers: &[usize]) -> Vec<ColorRef> {
        numbers
            .iter()
            .enumerate()
            .map(|(i, &number)| ColorRef {
                offset: 0x100 + i,
                number,
            })
            .collect()
    }

    fn embedded(colors: &[(u8, u8, u8)]) -> Vec<ColorTableEntry> {
        colors
            .iter()
            .enumerate()
            .map(|(i, &(r, g, b))| ColorTableEntry {
                code: format!("{:03}", i),
                color: RGB8 { r, g, b },
                unknown: 0,
                thread_type: 0xA,
                description: format!("Thread {}", i),
                brand: "Embroidery".to_string(),
                chart: "Brother".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_chart_sizes() {
        assert_eq!(JANOME.len(), 78);
        assert_eq!(BROTHER.len(), 38);
    }

    #[test]
    fn test_chart_lookup_is_one_based() {
        assert_eq!(JANOME.get(1).unwrap().name, "Black");
        assert_eq!(JANOME.get(2).unwrap().color, RGB8 { r: 0xff, g: 0xff, b: 0xff });
        assert_eq!(BROTHER.get(1).unwrap().name, "Prussian Blue");
        assert_eq!(BROTHER.get(38).unwrap().name, "Peacock Blue");
        assert!(BROTHER.get(0).is_none());
        assert!(BROTHER.get(39).is_none());
    }

    #[test]
    fn test_standard_resolution() {
        let numbers = [20, 1, 5, 29];
        let palette = Palette::resolve(&[], &BROTHER, refs(&numbers)).unwrap();
        assert_eq!(palette.len(), numbers.len());
        for (entry, &number) in palette.iter().zip(numbers.iter()) {
            assert_eq!(entry.color, BROTHER.get(number).unwrap().color);
        }
        assert_eq!(palette.get(0).unwrap().name, "Black");
    }

    #[test]
    fn test_embedded_table_wins() {
        let table = embedded(&[(1, 2, 3), (4, 5, 6)]);
        let palette = Palette::resolve(&table, &BROTHER, refs(&[7, 7, 7])).unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(
            palette.colors().collect::<Vec<_>>(),
            vec![RGB8 { r: 1, g: 2, b: 3 }, RGB8 { r: 4, g: 5, b: 6 }]
        );
        assert_eq!(palette.get(1).unwrap().name, "Thread 1");
    }

    #[test]
    fn test_empty_embedded_table_falls_back() {
        let palette = Palette::resolve(&[], &JANOME, refs(&[3])).unwrap();
        assert_eq!(palette.get(0).unwrap().name, "Sunflower");
    }

    #[test]
    fn test_out_of_range_reference() {
        let err = Palette::resolve(&[], &BROTHER, refs(&[1, 39])).unwrap_err();
        assert!(matches!(
            err,
            Error::PaletteIndexOutOfRange {
                offset: 0x101,
                index: 39,
                len: 38
            }
        ));

        let err = Palette::from_standard(&JANOME, refs(&[0])).unwrap_err();
        assert!(matches!(err, Error::PaletteIndexOutOfRange { index: 0, .. }));
    }

    #[test]
    fn test_check_index() {
        let palette = Palette::from_standard(&JANOME, refs(&[1, 2])).unwrap();
        assert!(palette.check_index(1, 0).is_ok());
        assert!(matches!(
            palette.check_index(2, 0x40),
            Err(Error::PaletteIndexOutOfRange {
                offset: 0x40,
                index: 2,
                len: 2
            })
        ));
    }
}
