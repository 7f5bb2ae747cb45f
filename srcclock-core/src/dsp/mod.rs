// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Signal-processing primitives: tone detection, adaptive thresholding, and symbol timing
//! recovery. These are pure/stateless-per-call building blocks; the decoding state machine lives
//! in [`crate::decoder`].

pub mod goertzel;
pub mod threshold;
pub mod tuning;

pub use goertzel::goertzel_power;
pub use threshold::AdaptiveThreshold;
pub use tuning::WindowBuffer;
