// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Symbol timing recovery ("tuning"): peak-search tone alignment at block boundaries, plus the
//! double-buffered window reader the decoder and tick synchroniser share.

use super::goertzel::goertzel_power;
use crate::errors::Result;
use crate::io::SampleSource;
use log::trace;

/// A double-buffered `N`-sample window reader with `DELTA`-sample look-ahead for tuning.
///
/// The buffer holds `2*N + DELTA` samples: the previous window, the current window (at
/// `[N, 2*N)`, the slice handed to Goertzel), and up to `DELTA` samples of look-ahead used only
/// during [`tune`](Self::tune). This mirrors the original decoder's `read_buffer`/`tuning`
/// bookkeeping (including its `extra`/`bytes2read` carry-over), expressed with named fields
/// instead of reference out-parameters.
pub struct WindowBuffer {
    buf: Vec<f32>,
    n: usize,
    delta: usize,
    bytes_to_read: usize,
    extra: usize,
}

impl WindowBuffer {
    pub fn new(n: usize, delta: usize) -> Self {
        WindowBuffer { buf: vec![0.0; 2 * n + delta], n, delta, bytes_to_read: n, extra: 0 }
    }

    /// Clears the buffer and resets read bookkeeping to "read one fresh window next".
    pub fn reset(&mut self) {
        self.buf.iter_mut().for_each(|s| *s = 0.0);
        self.bytes_to_read = self.n;
        self.extra = 0;
    }

    /// The current `N`-sample window, ready for Goertzel evaluation.
    pub fn current_window(&self) -> &[f32] {
        &self.buf[self.n..2 * self.n]
    }

    /// Reads the next window, carrying over any shift performed by a prior [`tune`](Self::tune)
    /// call. Returns the number of samples actually read; a short read (including `0`, signalling
    /// end-of-stream on file sources) desynchronises the following window exactly as the original
    /// does — its return value is not otherwise validated here, preserved per spec Open Question 2.
    pub fn read_window(&mut self, source: &mut dyn SampleSource) -> Result<usize> {
        let m = self.n;

        let offset = if self.bytes_to_read == m {
            for i in 0..(m + self.extra) {
                self.buf[i] = self.buf[m + i];
            }
            let offset = m + self.extra;
            self.bytes_to_read -= self.extra;
            self.extra = 0;
            offset
        } else {
            2 * m - self.bytes_to_read
        };

        let requested = self.bytes_to_read;
        let got = source.read(&mut self.buf[offset..offset + requested])?;

        self.bytes_to_read = if got != requested { m - got } else { m };

        Ok(got)
    }

    /// Performs the tuning peak search: reads `DELTA - extra` more look-ahead samples, evaluates
    /// `freq_hz`'s Goertzel power at every candidate window start in `[N-DELTA, N+DELTA]` stepping
    /// by `step`, and shifts the buffer so the winning offset becomes the new anchor. Returns the
    /// winning offset's power, for use by the adaptive threshold recalibration.
    pub fn tune(
        &mut self,
        source: &mut dyn SampleSource,
        sample_rate: u32,
        freq_hz: f64,
        step: usize,
    ) -> Result<f64> {
        let n = self.n;
        let delta = self.delta;

        let need = delta - self.extra;
        let base = 2 * n + self.extra;
        source.read(&mut self.buf[base..base + need])?;

        let start = n.saturating_sub(delta);
        let end = n + delta;
        let step = step.max(1);

        let mut best_power = 0.0_f64;
        let mut tuned = start;
        let mut i = start;
        while i <= end {
            let power = goertzel_power(freq_hz, sample_rate, &self.buf[i..i + n]);
            if power > best_power {
                best_power = power;
                tuned = i;
            }
            i += step;
        }

        let remaining = 2 * n + delta - tuned;
        for i in 0..remaining {
            self.buf[i] = self.buf[tuned + i];
        }

        if tuned <= n {
            self.extra = delta - tuned;
            self.bytes_to_read = 0;
        } else {
            self.bytes_to_read = tuned - delta;
            self.extra = 0;
        }

        trace!(
            "tuning @ {} Hz: anchor={} (range [{}, {}], step {}), power={:.4}",
            freq_hz,
            tuned,
            start,
            end,
            step,
            best_power
        );

        Ok(best_power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SampleSource;
    use std::f64::consts::PI;

    /// A source that always yields a unit-amplitude cosine at a fixed frequency.
    struct ToneSource {
        freq_hz: f64,
        sample_rate: u32,
        phase_samples: u64,
    }

    impl SampleSource for ToneSource {
        fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
            for (k, s) in buf.iter_mut().enumerate() {
                let t = (self.phase_samples + k as u64) as f64;
                *s = (2.0 * PI * self.freq_hz * t / f64::from(self.sample_rate)).cos() as f32;
            }
            self.phase_samples += buf.len() as u64;
            Ok(buf.len())
        }
    }

    #[test]
    fn tune_locks_onto_a_clean_tone() {
        let n = 240;
        let delta = n;
        let mut wb = WindowBuffer::new(n, delta);
        let mut src = ToneSource { freq_hz: 2000.0, sample_rate: 8000, phase_samples: 0 };

        wb.read_window(&mut src).unwrap();
        let power = wb.tune(&mut src, 8000, 2000.0, n / 30).unwrap();
        assert!(power > 0.9, "expected near-unity power, got {}", power);
    }
}
