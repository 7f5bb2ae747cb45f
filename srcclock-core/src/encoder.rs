// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The encoder/player: builds a frame from civil fields and renders the full minute's waveform,
//! including the inter-block gap, optional noise, and the trailing tick train.

use crate::calendar::CivilTime;
use crate::cancel::CancellationToken;
use crate::errors::Result;
use crate::frame::{DecodedFields, Frame};
use crate::io::SampleSink;
use crate::noise::GaussianNoise;
use crate::sync::number_of_rp;
use crate::units::{gap_len, symbol_len, tick_len, F0_HZ, F1_HZ, FSYNC_HZ};
use std::f64::consts::PI;

/// The civil fields and per-call rendering knobs for one minute's playback. Mutable and reused
/// across repeated calls to [`Player::play`]: each call advances `time` by one minute so the next
/// call emits the following minute, mirroring the original's `set`/`setWarnings`/`setOE` mutators.
#[derive(Clone, Debug)]
pub struct PlayRequest {
    pub time: CivilTime,
    /// Attenuation in dB; forced to `<= 0` at render time (power is expressed as attenuation).
    pub power_db: f64,
    pub sigma: f64,
    pub random_theta: bool,
    pub do_sync: bool,
    pub initial_delay: bool,
}

impl Default for PlayRequest {
    fn default() -> Self {
        let mut time = CivilTime::today();
        time.decoded = false;
        PlayRequest {
            time,
            power_db: 0.0,
            sigma: 0.0,
            random_theta: false,
            do_sync: true,
            initial_delay: true,
        }
    }
}

impl PlayRequest {
    /// Sets the civil date/time fields directly, as the original's `set()` mutator did.
    pub fn set_fields(&mut self, year: i32, month: u8, day: u8, wday: u8, hour: u8, min: u8, dst: bool) {
        self.time.year = year;
        self.time.month = month;
        self.time.day = day;
        self.time.wday = wday;
        self.time.hour = hour;
        self.time.min = min;
        self.time.dst = dst;
    }

    /// Sets the two warning fields, as the original's `setWarnings()` mutator did.
    pub fn set_warnings(&mut self, change_time: u8, leap_second: i8) {
        self.time.change_time = change_time;
        self.time.leap_second = leap_second;
    }

    /// Sets the DST flag alone, as the original's `setOE()` mutator did.
    pub fn set_dst(&mut self, dst: bool) {
        self.time.dst = dst;
    }
}

pub struct Player {
    sample_rate: u32,
    power_db: f64,
    sigma: f64,
    noise: GaussianNoise,
}

impl Player {
    pub fn new(sample_rate: u32, power_db: f64, sigma: f64) -> Self {
        Player { sample_rate, power_db, sigma, noise: GaussianNoise::from_clock() }
    }

    /// Seeds the noise generator explicitly, for reproducible output in tests.
    pub fn seeded(sample_rate: u32, power_db: f64, sigma: f64, seed: u64) -> Self {
        Player { sample_rate, power_db, sigma, noise: GaussianNoise::seeded(seed) }
    }

    /// Renders one full minute — 48 data cells, the inter-block gap, and (if `request.do_sync`)
    /// the trailing tick train — to `sink`, then advances `request.time` by one minute.
    pub fn play(
        &mut self,
        sink: &mut dyn SampleSink,
        request: &mut PlayRequest,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let fs = self.sample_rate;
        let amp = 10f64.powf(self.power_db.min(0.0) / 20.0);
        let theta = if request.random_theta {
            self.noise_rng_angle()
        } else {
            0.0
        };

        if request.initial_delay {
            let delay_len = self.uniform_index(fs as usize);
            self.write_noise(sink, delay_len)?;
        }

        let fields = DecodedFields {
            hour: request.time.hour,
            minute: request.time.min,
            dst: request.time.dst,
            month: request.time.month,
            day: request.time.day,
            wday: request.time.wday,
            year2: (request.time.year.rem_euclid(100)) as u8,
            change_time: request.time.change_time,
            leap_second: request.time.leap_second,
        };
        let frame = Frame::encode_fields(&fields);

        let n = symbol_len(fs);
        for cell_index in 0..48 {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let freq_hz = if frame.get(cell_index).bit() == Some(true) { F1_HZ } else { F0_HZ };
            self.write_tone(sink, n, f64::from(freq_hz), theta, amp)?;

            if cell_index == 31 {
                self.write_noise(sink, gap_len(fs))?;
            }
        }

        if request.do_sync {
            self.write_noise(sink, (0.52 * f64::from(fs)).round() as usize)?;
            let tick_len_samples = tick_len(fs);
            let second_len = fs as usize;
            let expected = number_of_rp(&request.time).max(0) as usize;

            for tick in 0..expected.max(6) {
                if tick > 0 {
                    self.write_noise(sink, second_len - tick_len_samples)?;
                }
                self.write_tone(sink, tick_len_samples, f64::from(FSYNC_HZ), theta, amp)?;
                if tick + 1 >= expected && expected < 6 {
                    break;
                }
            }
        }

        request.time.add_minute();
        Ok(())
    }

    fn write_tone(
        &mut self,
        sink: &mut dyn SampleSink,
        len: usize,
        freq_hz: f64,
        theta: f64,
        amp: f64,
    ) -> Result<()> {
        let fs = f64::from(self.sample_rate);
        let mut buf = Vec::with_capacity(len);
        for i in 0..len {
            let clean = amp * (2.0 * PI * freq_hz * i as f64 / fs + theta).cos();
            let sample = (clean + self.noise.sample(self.sigma)).clamp(-1.0, 1.0);
            buf.push(sample as f32);
        }
        sink.write(&buf)?;
        Ok(())
    }

    fn write_noise(&mut self, sink: &mut dyn SampleSink, len: usize) -> Result<()> {
        let mut buf = Vec::with_capacity(len);
        for _ in 0..len {
            buf.push(self.noise.sample(self.sigma).clamp(-1.0, 1.0) as f32);
        }
        sink.write(&buf)?;
        Ok(())
    }

    fn uniform_index(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.noise.uniform() * bound as f64) as usize % bound
    }

    fn noise_rng_angle(&mut self) -> f64 {
        self.noise.uniform() * 2.0 * PI
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sink(Vec<f32>);
    impl SampleSink for Sink {
        fn write(&mut self, buf: &[f32]) -> Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }
    }

    #[test]
    fn play_advances_the_minute() {
        let mut request = PlayRequest::default();
        request.set_fields(2014, 5, 7, 3, 13, 27, true);
        let mut player = Player::seeded(8000, -6.0, 0.0, 7);
        let mut sink = Sink(Vec::new());
        player.play(&mut sink, &mut request, &CancellationToken::new()).unwrap();
        assert_eq!((request.time.hour, request.time.min), (13, 28));
        assert!(sink.0.iter().all(|s| (-1.0..=1.0).contains(s)));
    }
}
