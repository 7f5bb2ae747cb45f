// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The Window Decision System (WDS): a sliding-window noise-floor estimator feeding an adaptive
//! decision threshold.

use crate::units::from_db;
use log::trace;

/// Tracks the average tone power over the last `L` symbol windows and derives a decision
/// threshold `snr_dB` above the noise floor. With `L == 0` the threshold is static and set
/// directly via [`AdaptiveThreshold::set_static_db`].
#[derive(Debug, Clone)]
pub struct AdaptiveThreshold {
    window: Vec<f64>,
    next: usize,
    filled_once: bool,
    total_symbols: u64,
    snr_linear: f64,
    threshold: f64,
}

impl AdaptiveThreshold {
    /// Creates a new threshold tracker. `window_len <= 0` (passed as `0`) disables adaptation:
    /// the threshold is then whatever [`set_static_db`](Self::set_static_db) last set.
    pub fn new(window_len: usize, snr_db: f64, initial_threshold_db: f64) -> Self {
        AdaptiveThreshold {
            window: vec![0.0; window_len],
            next: 0,
            filled_once: false,
            total_symbols: 0,
            snr_linear: from_db(snr_db),
            threshold: from_db(initial_threshold_db),
        }
    }

    /// Directly sets the (static) decision threshold in dB. Used both as the initial value and,
    /// when the window length is 0, as the only value ever used.
    pub fn set_static_db(&mut self, db: f64) {
        let db = if db > 0.0 { -db } else { db };
        self.threshold = from_db(db);
    }

    pub fn threshold_linear(&self) -> f64 {
        self.threshold
    }

    pub fn threshold_db(&self) -> f64 {
        crate::units::to_db(self.threshold)
    }

    fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Feeds the average of `(power_f0 + power_f1) / 2` for the current symbol window into the
    /// ring buffer, and — when the decoder is still searching for block start (`searching`) and
    /// the ring has filled at least once — recomputes the threshold from the ring's mean.
    ///
    /// Mirrors the original's `(total / window_length) != 0 && c == 0` gate.
    pub fn observe(&mut self, power_f0: f64, power_f1: f64, searching: bool) {
        if self.window_len() == 0 {
            return;
        }

        self.window[self.next] = (power_f0 + power_f1) / 2.0;
        self.next = (self.next + 1) % self.window_len();
        if self.next == 0 {
            self.filled_once = true;
        }
        self.total_symbols += 1;

        if self.filled_once && searching {
            let avg: f64 = self.window.iter().sum::<f64>() / self.window_len() as f64;
            self.recalibrate(avg);
            trace!(
                "WDS: threshold now {:.2} dB, noise average {:.2} dB over last {} symbols",
                self.threshold_db(),
                crate::units::to_db(avg),
                self.window_len()
            );
        }
    }

    /// Recomputes `threshold = avg * snr_linear`, clamped so that if that product exceeds 1.0 the
    /// threshold becomes `max(avg, 1/snr_linear)`.
    fn recalibrate(&mut self, avg: f64) {
        let mut threshold = avg * self.snr_linear;
        if threshold > 1.0 {
            threshold = avg.max(1.0 / self.snr_linear);
        }
        self.threshold = threshold;
    }

    /// Raises the threshold to `max(current, value * snr_linear)`, clamped as in
    /// [`recalibrate`](Self::recalibrate). Used by the tick synchroniser's calibration window
    /// and by the decoder when carrying the data-phase average power into the sync phase.
    pub fn raise_to(&mut self, value: f64) {
        let mut candidate = value * self.snr_linear;
        if candidate > 1.0 {
            candidate = value.max(1.0 / self.snr_linear);
        }
        self.threshold = self.threshold.max(candidate);
    }

    /// Pins the threshold to exactly `value` (used once tick-phase lock is acquired, to pin the
    /// threshold 3 dB below the signal).
    pub fn pin(&mut self, value: f64) {
        self.threshold = value;
    }

    pub fn snr_linear(&self) -> f64 {
        self.snr_linear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_threshold_never_adapts() {
        let mut th = AdaptiveThreshold::new(0, 16.0, -35.0);
        let before = th.threshold_linear();
        for _ in 0..1000 {
            th.observe(1.0, 1.0, true);
        }
        assert_eq!(th.threshold_linear(), before);
    }

    #[test]
    fn adaptive_threshold_tracks_noise_floor() {
        let mut th = AdaptiveThreshold::new(4, 16.0, -35.0);
        // Fill the window once with a known noise floor.
        for _ in 0..4 {
            th.observe(0.001, 0.001, true);
        }
        let snr_linear = from_db(16.0);
        let expected = (0.001f64 * snr_linear).min(0.001f64.max(1.0 / snr_linear));
        assert!((th.threshold_linear() - expected).abs() < 1e-9);
    }

    #[test]
    fn recalibrate_clamps_above_unity() {
        let mut th = AdaptiveThreshold::new(1, 16.0, -35.0);
        th.observe(10.0, 10.0, true);
        assert!(th.threshold_linear() <= 10.0);
        assert!(th.threshold_linear() >= 1.0 / th.snr_linear());
    }
}
