// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  dump.rs - Decoder demo for JEF and PES embroidery files.
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

use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use tracing::level_filters::LevelFilter;

use emblib::design::*;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file to read.
    file: String,

    /// Format of the file. Taken from the extension if not given.
    #[arg(short, long)]
    format: Option<Format>,

    /// Scale factor for JEF displacements.
    #[arg(long)]
    jef_expansion: Option<Decimal>,

    /// Print every stitch command.
    #[arg(short, long)]
    commands: bool,

    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

fn main() {
    let args = Args::parse();

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(args.log_level.as_filter())
        .with_target(false)
        .try_init();

    let format = match args.format.map_or_else(|| Format::from_path(&args.file), Ok) {
        Ok(format) => format,
        Err(error) => {
            eprintln!("Error detecting format of {:?}: {}", &args.file, error);
            return;
        }
    };

    let data = match std::fs::read(&args.file) {
        Ok(data) => data,
        Err(error) => {
            eprintln!("Error opening file {:?}: {:?}", &args.file, error);
            return;
        }
    };

    let mut options = DecodeOptions::default();
    if let Some(expansion) = args.jef_expansion {
        options = options.with_jef_expansion(expansion);
    }

    let design = match DesignPayload::decode(&data, format, &options) {
        Ok(design) => design,
        Err(error) => {
            eprintln!("Error decoding file {:?}: {}", &args.file, error);
            return;
        }
    };

    println!("Format: {}", design.format);
    match design.size {
        Some(size) => println!("Canvas: {}x{}", size.width, size.height),
        None => println!("Canvas: undefined"),
    }
    println!("Rotation: {}", design.rotation);
    if let Some(label) = &design.label {
        println!("Label: {}", label);
    }
    if let Some(created) = design.created {
        println!("Created: {}", created);
    }
    if let Some(path) = &design.image_path {
        println!("Image: {}", path);
    }
    let mut keys = design.description.keys().collect::<Vec<_>>();
    keys.sort();
    for key in keys {
        println!("{}: {}", key, design.description[key]);
    }

    println!("Palette:");
    for (index, entry) in design.palette.iter().enumerate() {
        let c = entry.color;
        println!("  {:2}: #{:02X}{:02X}{:02X} {}", index, c.r, c.g, c.b, entry.name);
    }

    let counts = design.command_counts();
    println!(
        "Commands: {} stitches, {} jumps, {} trims, {} color changes",
        counts.stitches, counts.jumps, counts.trims, counts.color_changes
    );
    if let Some(bounds) = design.bounds() {
        println!(
            "Extents: ({}, {}) to ({}, {})",
            bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y
        );
    }

    if args.commands {
        for command in &design.commands {
            println!("{}", command);
        }
    }
}
