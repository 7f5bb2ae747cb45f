// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A dual-stream `log::Log` implementor: informational records (`Info` and below) go to one
//! sink, warnings and errors to another, each either a file or the corresponding standard stream.
//! This generalises the original's two-stream logger (`clog.h`) into the `log` facade
//! `srcclock-core` already logs through.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

enum Sink {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl Sink {
    fn write_line(&self, line: &str) {
        match self {
            Sink::Stdout => {
                println!("{}", line);
            }
            Sink::Stderr => {
                eprintln!("{}", line);
            }
            Sink::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{}", line);
                }
            }
        }
    }
}

pub struct DualStreamLogger {
    level: LevelFilter,
    info_sink: Sink,
    error_sink: Sink,
}

impl DualStreamLogger {
    /// `info_log` and `error_log`, when given, redirect the respective stream to a file instead
    /// of stdout/stderr. `verbosity` is the CLI's `0..=6` knob, mapped onto `log`'s levels with
    /// `0` disabling logging entirely and `6` enabling `Trace`.
    pub fn init(
        verbosity: u8,
        info_log: Option<&Path>,
        error_log: Option<&Path>,
    ) -> std::io::Result<()> {
        let level = match verbosity {
            0 => LevelFilter::Off,
            1 => LevelFilter::Error,
            2 => LevelFilter::Warn,
            3 => LevelFilter::Info,
            4 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        let info_sink = match info_log {
            Some(path) => Sink::File(Mutex::new(File::create(path)?)),
            None => Sink::Stdout,
        };
        let error_sink = match error_log {
            Some(path) => Sink::File(Mutex::new(File::create(path)?)),
            None => Sink::Stderr,
        };

        let logger = DualStreamLogger { level, info_sink, error_sink };
        log::set_max_level(level);
        log::set_boxed_logger(Box::new(logger))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

impl Log for DualStreamLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}: {}", record.level(), record.target(), record.args());
        match record.level() {
            Level::Warn | Level::Error => self.error_sink.write_line(&line),
            _ => self.info_sink.write_line(&line),
        }
    }

    fn flush(&self) {}
}
