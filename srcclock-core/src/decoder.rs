// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The decoder state machine: orchestrates the Goertzel front end, the adaptive threshold, symbol
//! timing recovery and the frame codec over an incoming sample stream, then hands off to the tick
//! synchroniser.

use crate::calendar::CivilTime;
use crate::cancel::CancellationToken;
use crate::dsp::{goertzel_power, AdaptiveThreshold, WindowBuffer};
use crate::errors::{DecodeStatus, Result, SrcError};
use crate::frame::{Cell, Frame};
use crate::io::SampleSource;
use crate::sync;
use crate::units::{gap_len, symbol_len, F0_HZ, F1_HZ, FRAME_LEN};
use log::{info, trace, warn};

/// The century assumed when expanding a frame's two-digit year. The format has no century field
/// of its own (§3); this is purely a decoder-side convention.
const CENTURY_BASE: i32 = 2000;

#[derive(Copy, Clone, Debug)]
pub struct DecoderConfig {
    pub sample_rate: u32,
    pub threshold_db: f64,
    pub wds_len: usize,
    pub snr_db: f64,
    pub timeout_secs: u32,
    pub do_sync: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            sample_rate: crate::units::DEFAULT_SAMPLE_RATE,
            threshold_db: crate::units::DEFAULT_THRESHOLD_DB,
            wds_len: crate::units::DEFAULT_WDS_LEN,
            snr_db: crate::units::DEFAULT_SNR_DB,
            timeout_secs: crate::units::DEFAULT_TIMEOUT_SECS,
            do_sync: true,
        }
    }
}

pub struct DecodeOutcome {
    pub time: CivilTime,
    pub status: DecodeStatus,
    pub frame_text: String,
}

pub struct Decoder {
    config: DecoderConfig,
    threshold: AdaptiveThreshold,
    frame: Frame,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        let mut threshold =
            AdaptiveThreshold::new(config.wds_len, config.snr_db, config.threshold_db);
        threshold.set_static_db(config.threshold_db);
        Decoder { config, threshold, frame: Frame::new() }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Runs one full decode: acquires a frame, validates it, and (if `do_sync`) locks to the
    /// trailing ticks. Returns `Ok` with a status of `Success`, `TimeoutOrIllegalSymbol`, or
    /// `SyncTimeout` for every outcome short of a transport failure, per §7's error layering;
    /// only I/O failures surface as `Err`.
    pub fn decode(
        &mut self,
        source: &mut dyn SampleSource,
        cancel: &CancellationToken,
    ) -> Result<DecodeOutcome> {
        let sample_rate = self.config.sample_rate;
        let n = symbol_len(sample_rate);
        let mut wb = WindowBuffer::new(n, n);
        let timeout_windows =
            (f64::from(self.config.timeout_secs) / crate::units::SYMBOL_SECS) as u64;

        self.frame.clear();
        let mut c: usize = 0;
        let mut windows = 0u64;

        loop {
            if cancel.is_cancelled() {
                info!("decode: cancelled at cell {}", c);
                return Ok(DecodeOutcome {
                    time: CivilTime::today(),
                    status: DecodeStatus::Initial,
                    frame_text: self.frame.text(),
                });
            }

            wb.read_window(source)?;
            windows += 1;

            let power0 = goertzel_power(f64::from(F0_HZ), sample_rate, wb.current_window());
            let power1 = goertzel_power(f64::from(F1_HZ), sample_rate, wb.current_window());
            let searching = c == 0;
            self.threshold.observe(power0, power1, searching);

            let threshold = self.threshold.threshold_linear();
            let hit0 = power0 > threshold;
            let hit1 = power1 > threshold;

            if !hit0 && !hit1 {
                if c != 0 {
                    trace!("decode: dropout at cell {}, restarting acquisition", c);
                    self.frame.clear();
                    c = 0;
                }
            } else {
                let cell = if power1 > power0 { Cell::One } else { Cell::Zero };
                self.frame.set(c, cell);

                if c == 0 {
                    let winning_freq = if cell == Cell::One { F1_HZ } else { F0_HZ };
                    wb.tune(source, sample_rate, f64::from(winning_freq), n / 30)?;
                    c = 1;
                } else {
                    if c == 32 {
                        wb.tune(source, sample_rate, f64::from(F1_HZ), n / 30)?;
                    }

                    match self.frame.check_after(c) {
                        Ok(()) => {}
                        Err(SrcError::Decode(_)) => {
                            trace!("decode: frame check failed at cell {}, restarting", c);
                            self.frame.clear();
                            c = 0;
                            continue;
                        }
                        Err(other) => return Err(other),
                    }

                    if c == 31 {
                        let gap = gap_len(sample_rate);
                        let mut discard = vec![0.0f32; gap];
                        let _ = source.read(&mut discard)?;
                        wb.reset();
                    }

                    c += 1;

                    if c == FRAME_LEN {
                        let fields = self.frame.decode_fields();
                        let mut time = CivilTime {
                            year: CENTURY_BASE + fields.year2 as i32,
                            month: fields.month,
                            day: fields.day,
                            hour: fields.hour,
                            min: fields.minute,
                            sec: 53,
                            msec: 480,
                            wday: fields.wday,
                            dst: fields.dst,
                            change_time: fields.change_time,
                            leap_second: fields.leap_second,
                            decoded: true,
                        };

                        if time.validate().is_err() {
                            warn!("decode: frame checked out but names no real calendar day");
                            self.frame.clear();
                            c = 0;
                            continue;
                        }

                        if !self.config.do_sync {
                            return Ok(DecodeOutcome {
                                time,
                                status: DecodeStatus::Success,
                                frame_text: self.frame.text(),
                            });
                        }

                        let outcome =
                            sync::run(source, sample_rate, &mut self.threshold, &mut time, cancel)?;
                        time.msec = outcome.msec;
                        return Ok(DecodeOutcome {
                            time,
                            status: outcome.status,
                            frame_text: self.frame.text(),
                        });
                    }
                }
            }

            if windows >= timeout_windows {
                warn!("decode: overall timeout after {} windows", windows);
                return Ok(DecodeOutcome {
                    time: CivilTime::today(),
                    status: DecodeStatus::TimeoutOrIllegalSymbol,
                    frame_text: self.frame.text(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{Player, PlayRequest};
    use crate::io::{SampleSink, SampleSource};

    /// An in-memory sample source/sink pair, for round-tripping play output straight back through
    /// the decoder without touching a real backend.
    #[derive(Default)]
    struct MemoryStream {
        samples: Vec<f32>,
        pos: usize,
    }

    impl SampleSink for MemoryStream {
        fn write(&mut self, buf: &[f32]) -> Result<usize> {
            self.samples.extend_from_slice(buf);
            Ok(buf.len())
        }
    }

    impl SampleSource for MemoryStream {
        fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
            let n = buf.len().min(self.samples.len() - self.pos);
            buf[..n].copy_from_slice(&self.samples[self.pos..self.pos + n]);
            for s in &mut buf[n..] {
                *s = 0.0;
            }
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn clean_round_trip_decodes_successfully() {
        let sample_rate = 8000;
        let mut request = PlayRequest::default();
        request.set_fields(2014, 5, 7, 3, 13, 27, true);
        request.set_warnings(7, 0);

        let mut player = Player::new(sample_rate, 0.0, 0.0);
        let mut mem = MemoryStream::default();
        player.play(&mut mem, &mut request, &CancellationToken::new()).unwrap();

        mem.pos = 0;
        let mut decoder = Decoder::new(DecoderConfig {
            sample_rate,
            do_sync: false,
            ..DecoderConfig::default()
        });
        let outcome = decoder.decode(&mut mem, &CancellationToken::new()).unwrap();

        assert_eq!(outcome.status, DecodeStatus::Success);
        assert_eq!(outcome.time.year, 2014);
        assert_eq!(outcome.time.month, 5);
        assert_eq!(outcome.time.day, 7);
        assert_eq!(outcome.time.hour, 13);
        assert_eq!(outcome.time.min, 27);
    }
}
