// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `units` module collects the fixed frequencies and durations that define the SRC signal,
//! and the small arithmetic to turn them into sample counts at a given sample rate.

/// Tone frequency for a `0` symbol, in Hz.
pub const F0_HZ: u32 = 2000;
/// Tone frequency for a `1` symbol, in Hz.
pub const F1_HZ: u32 = 2500;
/// Tone frequency of the trailing second-marker ticks, in Hz.
pub const FSYNC_HZ: u32 = 1000;

/// Duration of one data symbol, in seconds.
pub const SYMBOL_SECS: f64 = 0.030;
/// Duration of the inter-block gap between cell 31 and cell 32, in seconds.
pub const GAP_SECS: f64 = 0.04;
/// Duration of a single tick burst, in seconds.
pub const TICK_SECS: f64 = 0.1;

/// Number of cells in an SRC frame.
pub const FRAME_LEN: usize = 48;

/// Default sample rate, in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 8000;
/// Default static decision threshold, in dB.
pub const DEFAULT_THRESHOLD_DB: f64 = -35.0;
/// Default decode timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u32 = 600;
/// Default Window Decision System length, in symbols.
pub const DEFAULT_WDS_LEN: usize = 50;
/// Default WDS SNR margin, in dB.
pub const DEFAULT_SNR_DB: f64 = 16.0;

/// Number of samples in one data symbol window at the given sample rate.
pub fn symbol_len(sample_rate: u32) -> usize {
    (f64::from(sample_rate) * SYMBOL_SECS).round() as usize
}

/// Number of samples in the inter-block gap at the given sample rate.
pub fn gap_len(sample_rate: u32) -> usize {
    (f64::from(sample_rate) * GAP_SECS).round() as usize
}

/// Number of samples in one tick window at the given sample rate.
pub fn tick_len(sample_rate: u32) -> usize {
    (f64::from(sample_rate) * TICK_SECS).round() as usize
}

/// Converts a power ratio to decibels: `10 * log10(p)`.
pub fn to_db(power: f64) -> f64 {
    10.0 * power.log10()
}

/// Converts a decibel value to a linear power ratio: `10^(db/10)`.
pub fn from_db(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_len_at_8khz() {
        assert_eq!(symbol_len(8000), 240);
        assert_eq!(gap_len(8000), 320);
        assert_eq!(tick_len(8000), 800);
    }

    #[test]
    fn db_roundtrip() {
        let db = -35.0;
        let lin = from_db(db);
        assert!((to_db(lin) - db).abs() < 1e-9);
    }
}
