// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The 48-bit SRC frame: cell storage, BCD field conversion, parity, and progressive validation.

use crate::errors::{decode_error, DecodeStatus, Result};
use crate::units::FRAME_LEN;
use std::ops::Range;

/// One of the 48 cells in a frame. `Unknown` stands in for the original's `-1` sentinel: a
/// window where neither tone crossed the decision threshold.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Zero,
    One,
    Unknown,
}

impl Cell {
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Cell::One
        } else {
            Cell::Zero
        }
    }

    pub fn bit(self) -> Option<bool> {
        match self {
            Cell::Zero => Some(false),
            Cell::One => Some(true),
            Cell::Unknown => None,
        }
    }

    fn as_u32(self) -> u32 {
        matches!(self, Cell::One) as u32
    }
}

/// The greatest-weight-first BCD table used by both `bcd_encode` and `bcd_decode`. A field of
/// `length` bits uses the trailing `length` entries of this table.
const WEIGHTS: [u32; 8] = [80, 40, 20, 10, 8, 4, 2, 1];

fn weights_for(length: usize) -> &'static [u32] {
    &WEIGHTS[8 - length..]
}

/// Encodes `value` into `length` cells, most-significant weight first, by greedily subtracting
/// each weight in turn. This reproduces decimal BCD for the weight groupings the format actually
/// uses (e.g. `{40,20,10}` then `{8,4,2,1}` for a two-digit `0..=59` field).
fn bcd_encode(value: u32, length: usize) -> Vec<Cell> {
    let mut remaining = value;
    weights_for(length)
        .iter()
        .map(|&w| {
            if remaining >= w {
                remaining -= w;
                Cell::One
            } else {
                Cell::Zero
            }
        })
        .collect()
}

/// Recovers the integer a `bcd_encode`d field represents. No range validation here — that is the
/// calendar layer's job, per §4.E ("no range check at this layer").
fn bcd_decode(cells: &[Cell]) -> u32 {
    cells.iter().zip(weights_for(cells.len())).map(|(c, w)| c.as_u32() * w).sum()
}

fn even_parity(cells: &[Cell]) -> Cell {
    let ones: u32 = cells.iter().map(|c| c.as_u32()).sum();
    Cell::from_bit(ones % 2 == 0)
}

/// The civil fields a frame carries, independent of calendar validity (that is checked once all
/// 48 cells are in hand; see [`crate::calendar`]).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecodedFields {
    pub hour: u8,
    pub minute: u8,
    pub dst: bool,
    pub month: u8,
    pub day: u8,
    pub wday: u8,
    pub year2: u8,
    pub change_time: u8,
    pub leap_second: i8,
}

const ID1: Range<usize> = 0..2;
const HOUR: Range<usize> = 2..8;
const MINUTE: Range<usize> = 8..15;
const DST_BIT: usize = 15;
const P1_BIT: usize = 16;
const P1_RANGE: Range<usize> = 0..16;
const MONTH: Range<usize> = 17..22;
const DAY: Range<usize> = 22..28;
const WDAY: Range<usize> = 28..31;
const P2_BIT: usize = 31;
const P2_RANGE: Range<usize> = 17..31;
const ID2: Range<usize> = 32..34;
const YEAR: Range<usize> = 34..42;
const CHANGE_TIME: Range<usize> = 42..45;
const LEAP: Range<usize> = 45..47;
const PA_BIT: usize = 47;
const PA_RANGE: Range<usize> = 32..47;

/// A 48-cell SRC frame, as received (possibly still incomplete) or as synthesised for playback.
#[derive(Clone, Debug)]
pub struct Frame {
    cells: [Cell; FRAME_LEN],
}

impl Default for Frame {
    fn default() -> Self {
        Frame { cells: [Cell::Unknown; FRAME_LEN] }
    }
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.cells = [Cell::Unknown; FRAME_LEN];
    }

    pub fn get(&self, index: usize) -> Cell {
        self.cells[index]
    }

    pub fn set(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }

    pub fn cells(&self) -> &[Cell; FRAME_LEN] {
        &self.cells
    }

    /// Validates the frame incrementally, assuming `index` is the cell that was just written.
    /// Mirrors §4.E's `check(bits)`: ID and parity cells are checked the moment they themselves
    /// arrive; any still-`Unknown` cell at or before `index` is an illegal/timeout symbol.
    pub fn check_after(&self, index: usize) -> Result<()> {
        if self.cells[..=index].iter().any(|c| *c == Cell::Unknown) {
            return decode_error(DecodeStatus::TimeoutOrIllegalSymbol);
        }

        match index {
            0 if self.cells[0] != Cell::Zero => return decode_error(DecodeStatus::Id1),
            1 if self.cells[1] != Cell::One => return decode_error(DecodeStatus::Id1),
            _ if index == P1_BIT && self.cells[P1_BIT] != even_parity(&self.cells[P1_RANGE]) => {
                return decode_error(DecodeStatus::Parity1)
            }
            _ if index == P2_BIT && self.cells[P2_BIT] != even_parity(&self.cells[P2_RANGE]) => {
                return decode_error(DecodeStatus::Parity2)
            }
            32 if self.cells[32] != Cell::One => return decode_error(DecodeStatus::Id2),
            33 if self.cells[33] != Cell::Zero => return decode_error(DecodeStatus::Id2),
            _ if index == PA_BIT => {
                if self.cells[PA_BIT] != even_parity(&self.cells[PA_RANGE]) {
                    return decode_error(DecodeStatus::ParityAOrInvalidLeap);
                }
                if self.cells[LEAP.start] == Cell::Zero && self.cells[LEAP.start + 1] == Cell::One
                {
                    // 01: the only leap-second pattern the format declares invalid.
                    return decode_error(DecodeStatus::ParityAOrInvalidLeap);
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Extracts civil fields by BCD deconversion. Assumes every cell is `Zero`/`One` (i.e.
    /// `check_after(47)` already returned `Ok`).
    pub fn decode_fields(&self) -> DecodedFields {
        let leap_hi = self.cells[LEAP.start].as_u32();
        let leap_lo = self.cells[LEAP.start + 1].as_u32();
        let leap_second = match (leap_hi, leap_lo) {
            (0, 0) => 0,
            (1, 0) => 1,
            (1, 1) => -1,
            _ => 0, // unreachable once check_after(47) has passed
        };

        DecodedFields {
            hour: bcd_decode(&self.cells[HOUR]) as u8,
            minute: bcd_decode(&self.cells[MINUTE]) as u8,
            dst: self.cells[DST_BIT] == Cell::One,
            month: bcd_decode(&self.cells[MONTH]) as u8,
            day: bcd_decode(&self.cells[DAY]) as u8,
            wday: bcd_decode(&self.cells[WDAY]) as u8,
            year2: bcd_decode(&self.cells[YEAR]) as u8,
            change_time: bcd_decode(&self.cells[CHANGE_TIME]) as u8,
            leap_second,
        }
    }

    /// Builds a fully valid frame (including ID literals and all three parity cells) from civil
    /// fields. `change_time` values outside `0..=6` are forced to `7` ("no warning").
    pub fn encode_fields(fields: &DecodedFields) -> Frame {
        let mut frame = Frame::new();

        frame.set(0, Cell::Zero);
        frame.set(1, Cell::One);
        write_field(&mut frame, HOUR, fields.hour as u32);
        write_field(&mut frame, MINUTE, fields.minute as u32);
        frame.set(DST_BIT, Cell::from_bit(fields.dst));

        write_field(&mut frame, MONTH, fields.month as u32);
        write_field(&mut frame, DAY, fields.day as u32);
        write_field(&mut frame, WDAY, fields.wday as u32);

        frame.set(32, Cell::One);
        frame.set(33, Cell::Zero);
        write_field(&mut frame, YEAR, fields.year2 as u32);
        let change_time = if fields.change_time <= 6 { fields.change_time as u32 } else { 7 };
        write_field(&mut frame, CHANGE_TIME, change_time);
        let (leap_hi, leap_lo) = match fields.leap_second {
            1 => (true, false),
            -1 => (true, true),
            _ => (false, false),
        };
        frame.set(LEAP.start, Cell::from_bit(leap_hi));
        frame.set(LEAP.start + 1, Cell::from_bit(leap_lo));

        frame.set(P1_BIT, even_parity(&frame.cells[P1_RANGE]));
        frame.set(P2_BIT, even_parity(&frame.cells[P2_RANGE]));
        frame.set(PA_BIT, even_parity(&frame.cells[PA_RANGE]));

        frame
    }

    /// Renders the frame as the 49-character text form: 32 binary digits, a space, then the
    /// remaining 16 binary digits. `Unknown` cells render as `?`.
    pub fn text(&self) -> String {
        let mut s = String::with_capacity(49);
        for (i, cell) in self.cells.iter().enumerate() {
            if i == 32 {
                s.push(' ');
            }
            s.push(match cell {
                Cell::Zero => '0',
                Cell::One => '1',
                Cell::Unknown => '?',
            });
        }
        s
    }
}

fn write_field(frame: &mut Frame, range: Range<usize>, value: u32) {
    for (offset, cell) in bcd_encode(value, range.len()).into_iter().enumerate() {
        frame.set(range.start + offset, cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> DecodedFields {
        DecodedFields {
            hour: 13,
            minute: 27,
            dst: true,
            month: 5,
            day: 7,
            wday: 3,
            year2: 14,
            change_time: 7,
            leap_second: 0,
        }
    }

    #[test]
    fn round_trips_civil_fields() {
        let frame = Frame::encode_fields(&sample_fields());
        for i in 0..FRAME_LEN {
            frame.check_after(i).unwrap();
        }
        assert_eq!(frame.decode_fields(), sample_fields());
    }

    #[test]
    fn id1_violation_is_detected_immediately() {
        let mut frame = Frame::encode_fields(&sample_fields());
        frame.set(1, Cell::Zero);
        assert!(matches!(
            frame.check_after(1),
            Err(crate::errors::SrcError::Decode(DecodeStatus::Id1))
        ));
    }

    #[test]
    fn flipped_parity_bit_is_caught_at_p1() {
        let mut frame = Frame::encode_fields(&sample_fields());
        let flipped = if frame.get(3) == Cell::One { Cell::Zero } else { Cell::One };
        frame.set(3, flipped);
        for i in 0..16 {
            frame.check_after(i).unwrap();
        }
        assert!(matches!(
            frame.check_after(16),
            Err(crate::errors::SrcError::Decode(DecodeStatus::Parity1))
        ));
    }

    #[test]
    fn invalid_leap_pattern_is_rejected() {
        let mut frame = Frame::encode_fields(&sample_fields());
        frame.set(45, Cell::Zero);
        frame.set(46, Cell::One);
        frame.set(47, even_parity(&frame.cells()[PA_RANGE]));
        for i in 0..47 {
            frame.check_after(i).unwrap();
        }
        assert!(matches!(
            frame.check_after(47),
            Err(crate::errors::SrcError::Decode(DecodeStatus::ParityAOrInvalidLeap))
        ));
    }

    #[test]
    fn unknown_cell_yields_illegal_symbol_error() {
        let mut frame = Frame::encode_fields(&sample_fields());
        frame.set(5, Cell::Unknown);
        assert!(matches!(
            frame.check_after(5),
            Err(crate::errors::SrcError::Decode(DecodeStatus::TimeoutOrIllegalSymbol))
        ));
    }

    #[test]
    fn text_has_a_space_at_position_32() {
        let frame = Frame::encode_fields(&sample_fields());
        let text = frame.text();
        assert_eq!(text.len(), 49);
        assert_eq!(text.chars().nth(32), Some(' '));
    }
}
