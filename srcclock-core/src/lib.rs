// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `srcclock-core`: signal-processing and frame logic for the SRC (Segnale orario Rai Codificato)
//! radio time signal. Consumes or produces an abstract mono `f32` sample stream (see [`io`]) —
//! nothing in this crate talks to a sound card, a file, or the command line directly.

pub mod calendar;
pub mod cancel;
pub mod decoder;
pub mod dsp;
pub mod encoder;
pub mod errors;
pub mod format;
pub mod frame;
pub mod io;
pub mod noise;
pub mod sync;
pub mod units;

pub use cancel::CancellationToken;
pub use calendar::CivilTime;
pub use decoder::{DecodeOutcome, Decoder, DecoderConfig};
pub use encoder::{Player, PlayRequest};
pub use errors::{DecodeStatus, Result, SrcError};
pub use frame::{Cell, Frame};
