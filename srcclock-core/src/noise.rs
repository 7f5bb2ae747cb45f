// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gaussian noise generation for the encoder, via the polar Box-Muller transform.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// A small, explicitly-seeded source of Gaussian noise. Owned by [`crate::encoder::Player`] —
/// never a process-global RNG (§9 Design Notes, "Global RNG seed").
pub struct GaussianNoise {
    rng: SmallRng,
    cached: Option<f64>,
}

impl GaussianNoise {
    pub fn seeded(seed: u64) -> Self {
        GaussianNoise { rng: SmallRng::seed_from_u64(seed), cached: None }
    }

    /// Seeds from the host clock. Used when the caller has no specific seed to reproduce.
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::seeded(nanos)
    }

    /// Draws a uniform value in `[0, 1)` directly from the underlying RNG, bypassing the
    /// Box-Muller cache. Used for one-off randomisation (initial play delay, phase angle) that
    /// has no business being Gaussian.
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Draws one sample from `N(0, sigma^2)`. `sigma == 0.0` short-circuits to `0.0` and discards
    /// any cached second value from the polar Box-Muller pair.
    pub fn sample(&mut self, sigma: f64) -> f64 {
        if sigma == 0.0 {
            self.cached = None;
            return 0.0;
        }

        if let Some(cached) = self.cached.take() {
            return cached * sigma;
        }

        loop {
            let u1 = self.rng.gen::<f64>() * 2.0 - 1.0;
            let u2 = self.rng.gen::<f64>() * 2.0 - 1.0;
            let s = u1 * u1 + u2 * u2;
            if s > 0.0 && s < 1.0 {
                let mul = (-2.0 * s.ln() / s).sqrt();
                self.cached = Some(u2 * mul);
                return u1 * mul * sigma;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sigma_is_always_zero() {
        let mut noise = GaussianNoise::seeded(1);
        for _ in 0..10 {
            assert_eq!(noise.sample(0.0), 0.0);
        }
    }

    #[test]
    fn nonzero_sigma_yields_a_spread_of_values() {
        let mut noise = GaussianNoise::seeded(42);
        let samples: Vec<f64> = (0..200).map(|_| noise.sample(1.0)).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 1.0, "mean drifted too far: {}", mean);
        assert!(samples.iter().any(|&s| s.abs() > 0.1));
    }
}
