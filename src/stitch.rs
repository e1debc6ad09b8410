// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/stitch.rs - Format-agnostic stitch commands.
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

use std::fmt;

use rust_decimal::Decimal;

/// The kind of needle movement a positional command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Needle penetration.
    Stitch,
    /// Needle-up relocation, thread kept.
    Jump,
    /// Needle-up relocation, thread cut.
    Trim,
}

/// A single decoded command.
///
/// Offsets are relative to the previous needle position, in device units
/// (usually 0.1 mm), after any format-specific scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StitchCommand {
    /// Switch to the thread at this index of the resolved palette.
    ColorChange(usize),
    Jump { dx: Decimal, dy: Decimal },
    Trim { dx: Decimal, dy: Decimal },
    Stitch { dx: Decimal, dy: Decimal },
    End,
}

impl StitchCommand {
    /// Builds a positional command of the given kind.
    pub fn movement(kind: MoveKind, dx: Decimal, dy: Decimal) -> Self {
        match kind {
            MoveKind::Stitch => StitchCommand::Stitch { dx, dy },
            MoveKind::Jump => StitchCommand::Jump { dx, dy },
            MoveKind::Trim => StitchCommand::Trim { dx, dy },
        }
    }

    /// The displacement of a positional command.
    pub fn delta(&self) -> Option<(Decimal, Decimal)> {
        match *self {
            StitchCommand::Jump { dx, dy }
            | StitchCommand::Trim { dx, dy }
            | StitchCommand::Stitch { dx, dy } => Some((dx, dy)),
            StitchCommand::ColorChange(_) | StitchCommand::End => None,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, StitchCommand::End)
    }
}

impl fmt::Display for StitchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StitchCommand::ColorChange(index) => write!(f, "ColorChange {}", index),
            StitchCommand::Jump { dx, dy } => write!(f, "Jump {} {}", dx, dy),
            StitchCommand::Trim { dx, dy } => write!(f, "Trim {} {}", dx, dy),
            StitchCommand::Stitch { dx, dy } => write!(f, "Stitch {} {}", dx, dy),
            StitchCommand::End => write!(f, "End"),
        }
    }
}
