// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The tick synchroniser: locks to the trailing 1 kHz second-marker pulses and derives a
//! sub-millisecond timestamp.

use crate::calendar::CivilTime;
use crate::cancel::CancellationToken;
use crate::dsp::{goertzel_power, AdaptiveThreshold, WindowBuffer};
use crate::errors::{DecodeStatus, Result};
use crate::io::SampleSource;
use crate::units::{tick_len, FSYNC_HZ};
use log::{debug, trace};
use std::time::Instant;

/// Number of silent windows, immediately after cell 47, used to calibrate the threshold before
/// the first tick is searched for.
const CALIBRATION_WINDOWS: usize = 5;

pub struct SyncOutcome {
    pub msec: u16,
    /// Nanoseconds elapsed between the last successful read and the moment the outcome was
    /// produced — the post-processing delay a caller can subtract to correct its wall-clock stamp.
    pub nanosec: i64,
    pub status: DecodeStatus,
}

/// `T` from §4.G: the expected tick count for this minute. `6` normally; at the UTC-month
/// rollover boundary the original also checks `day == 1 ∧ hour - dst == 0 ∧ min == 59`, reading
/// the minute fields as they stood immediately after decode (i.e. *before* the post-sync
/// `add_minute` roll-over this same call is about to trigger). Preserved verbatim per spec Open
/// Question 1, including its apparent UTC/local mismatch; see DESIGN.md.
pub fn number_of_rp(decoded: &CivilTime) -> i8 {
    let hour_std = decoded.hour as i32 - decoded.dst as i32;
    if decoded.day == 1 && hour_std == 0 && decoded.min == 59 {
        6 + decoded.leap_second
    } else {
        6
    }
}

/// Runs the tick-lock phase to completion (success or timeout) and, on success, advances `time`
/// by one minute.
pub fn run(
    source: &mut dyn SampleSource,
    sample_rate: u32,
    threshold: &mut AdaptiveThreshold,
    time: &mut CivilTime,
    cancel: &CancellationToken,
) -> Result<SyncOutcome> {
    let expected_ticks = number_of_rp(time);
    let nsync = tick_len(sample_rate);
    let mut wb = WindowBuffer::new(nsync, nsync);
    let mut last_read_at = Instant::now();

    for _ in 0..CALIBRATION_WINDOWS {
        wb.read_window(source)?;
        last_read_at = Instant::now();
        let power = goertzel_power(f64::from(FSYNC_HZ), sample_rate, wb.current_window());
        threshold.raise_to(power);
    }

    let timeout_windows = (expected_ticks.max(0) as u64 + 1) * u64::from(sample_rate) / nsync as u64;
    let mut windows_seen = 0u64;
    let mut ticks = 0i8;
    let mut locked = false;

    while ticks < expected_ticks {
        if cancel.is_cancelled() {
            break;
        }

        wb.read_window(source)?;
        last_read_at = Instant::now();
        windows_seen += 1;

        let power = goertzel_power(f64::from(FSYNC_HZ), sample_rate, wb.current_window());

        if power > threshold.threshold_linear() {
            if !locked {
                let locked_power =
                    wb.tune(source, sample_rate, f64::from(FSYNC_HZ), nsync / 100)?;
                last_read_at = Instant::now();
                threshold.pin(locked_power / 2.0);
                locked = true;
            }
            ticks += 1;
            time.sec += 1;
            trace!("sync: tick {}/{} locked", ticks, expected_ticks);
        }

        if windows_seen > timeout_windows {
            break;
        }
    }

    if ticks >= expected_ticks {
        time.add_minute();
        debug!("sync: locked after {} ticks", ticks);
        Ok(SyncOutcome {
            msec: 100,
            nanosec: last_read_at.elapsed().as_nanos() as i64,
            status: DecodeStatus::Success,
        })
    } else {
        time.sec = 53;
        Ok(SyncOutcome {
            msec: 0,
            nanosec: last_read_at.elapsed().as_nanos() as i64,
            status: DecodeStatus::SyncTimeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_time() -> CivilTime {
        CivilTime {
            year: 2014,
            month: 5,
            day: 7,
            hour: 13,
            min: 27,
            sec: 53,
            msec: 0,
            wday: 3,
            dst: true,
            change_time: 7,
            leap_second: 0,
            decoded: true,
        }
    }

    #[test]
    fn number_of_rp_is_six_in_the_ordinary_case() {
        assert_eq!(number_of_rp(&base_time()), 6);
    }

    #[test]
    fn number_of_rp_adds_leap_second_at_month_rollover() {
        let mut t = base_time();
        t.day = 1;
        t.hour = 0;
        t.dst = false;
        t.min = 59;
        t.leap_second = 1;
        assert_eq!(number_of_rp(&t), 7);

        t.leap_second = -1;
        assert_eq!(number_of_rp(&t), 5);
    }
}
