// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  stitches.rs - CSV export demo for JEF and PES embroidery files.
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

use std::error::Error;
use std::io;

use clap::Parser;
use rust_decimal::Decimal;

use emblib::design::*;
use emblib::stitch::StitchCommand;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file to read.
    file: String,
}

/// Writes one row per command with the absolute needle position after it.
fn write_csv(design: &DesignPayload) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(["command", "dx", "dy", "x", "y", "color"])?;

    let mut x = Decimal::ZERO;
    let mut y = Decimal::ZERO;
    let mut color = String::new();
    for command in &design.commands {
        let name = match command {
            StitchCommand::ColorChange(_) => "color_change",
            StitchCommand::Jump { .. } => "jump",
            StitchCommand::Trim { .. } => "trim",
            StitchCommand::Stitch { .. } => "stitch",
            StitchCommand::End => "end",
        };
        if let StitchCommand::ColorChange(index) = command {
            if let Some(c) = design.palette_color(*index) {
                color = format!("#{:02X}{:02X}{:02X}", c.r, c.g, c.b);
            }
        }
        let (dx, dy) = command.delta().unwrap_or_default();
        x += dx;
        y += dy;
        writer.write_record([
            name.to_string(),
            dx.to_string(),
            dy.to_string(),
            x.to_string(),
            y.to_string(),
            color.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let design = match DesignPayload::from_filename(&args.file) {
        Ok(design) => design,
        Err(error) => {
            eprintln!("Error decoding file {:?}: {}", &args.file, error);
            return;
        }
    };

    if let Err(error) = write_csv(&design) {
        eprintln!("Error writing CSV: {}", error);
    }
}
