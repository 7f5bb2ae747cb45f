// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type and the internal decode status codes.

use std::error::Error as StdError;
use std::fmt;
use std::result;

/// `SrcError` enumerates everything that can go wrong while decoding, playing, or opening a
/// stream.
#[derive(Debug)]
pub enum SrcError {
    /// An I/O error occurred while reading, writing, or opening a sample stream.
    IoError(Box<dyn StdError + Send + Sync>),
    /// No stream is open in the direction the caller requested.
    NoStream,
    /// The instance is still in its initial / not-yet-run state.
    NotRun,
    /// A malformed or incomplete frame was encountered; carries the `DecodeStatus` that failed.
    Decode(DecodeStatus),
    /// The requested civil date/time does not name a real calendar day, or is out of range.
    InvalidDate,
    /// A stream was already open in the requested slot and direction when a conflicting open was
    /// attempted (e.g. opening an output stream while an input stream of the same kind is live).
    StreamBusy,
}

impl fmt::Display for SrcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SrcError::IoError(err) => write!(f, "io error: {}", err),
            SrcError::NoStream => write!(f, "no stream open"),
            SrcError::NotRun => write!(f, "decoder has not been run yet"),
            SrcError::Decode(status) => write!(f, "decode error: {}", status),
            SrcError::InvalidDate => write!(f, "invalid civil date/time"),
            SrcError::StreamBusy => write!(f, "a stream is already open in that slot"),
        }
    }
}

impl StdError for SrcError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SrcError::IoError(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SrcError {
    fn from(err: std::io::Error) -> Self {
        SrcError::IoError(Box::new(err))
    }
}

pub type Result<T> = result::Result<T, SrcError>;

/// Convenience function to create an I/O error from an arbitrary source.
pub fn io_error<T>(err: impl StdError + Send + Sync + 'static) -> Result<T> {
    Err(SrcError::IoError(Box::new(err)))
}

/// Convenience function to create a decode error carrying the given status.
pub fn decode_error<T>(status: DecodeStatus) -> Result<T> {
    Err(SrcError::Decode(status))
}

/// The internal status/error codes from the SRC decoder, as used throughout the original
/// implementation's `error` field. `code()` returns the exact integer the wire protocol's
/// "internal field `error`" uses, for callers (CLI exit codes, textual reports) that want the
/// raw number rather than the enum.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecodeStatus {
    /// Initial / running state, no verdict yet.
    Initial,
    /// No stream is open.
    NoStream,
    /// An I/O read failed.
    IoFailure,
    /// Decoding (and, if enabled, synchronisation) succeeded.
    Success,
    /// `ID1` (bits 0..1 must read `0,1`) violation.
    Id1,
    /// `P1` (even parity over bits 0..15) violation.
    Parity1,
    /// `P2` (even parity over bits 17..30) violation.
    Parity2,
    /// `ID2` (bits 32..33 must read `1,0`) violation.
    Id2,
    /// `PA` (even parity over bits 32..46) violation, or an invalid leap-second bit pattern.
    ParityAOrInvalidLeap,
    /// Acquisition timed out, or an illegal (unknown) symbol was observed mid-frame.
    TimeoutOrIllegalSymbol,
    /// The frame decoded successfully but the trailing tick synchronisation timed out.
    SyncTimeout,
}

impl DecodeStatus {
    /// The exact integer from spec.md §6 "Error codes (internal field `error`)".
    pub fn code(self) -> i8 {
        match self {
            DecodeStatus::Initial => -1,
            DecodeStatus::NoStream => -2,
            DecodeStatus::IoFailure => -3,
            DecodeStatus::Success => 0,
            DecodeStatus::Id1 => 1,
            DecodeStatus::Parity1 => 2,
            DecodeStatus::Parity2 => 3,
            DecodeStatus::Id2 => 4,
            DecodeStatus::ParityAOrInvalidLeap => 5,
            DecodeStatus::TimeoutOrIllegalSymbol => 6,
            DecodeStatus::SyncTimeout => 7,
        }
    }
}

impl fmt::Display for DecodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DecodeStatus::Initial => "decoder has not produced a verdict yet",
            DecodeStatus::NoStream => "no stream open",
            DecodeStatus::IoFailure => "stream read failure",
            DecodeStatus::Success => "success",
            DecodeStatus::Id1 => "ID1 violation",
            DecodeStatus::Parity1 => "P1 parity violation",
            DecodeStatus::Parity2 => "P2 parity violation",
            DecodeStatus::Id2 => "ID2 violation",
            DecodeStatus::ParityAOrInvalidLeap => "PA parity violation or invalid leap-second pattern",
            DecodeStatus::TimeoutOrIllegalSymbol => "acquisition timeout or illegal symbol",
            DecodeStatus::SyncTimeout => "decoded but tick synchronisation timed out",
        };
        write!(f, "{}", msg)
    }
}
