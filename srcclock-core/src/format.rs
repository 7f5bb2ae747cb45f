// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Date/time text rendering: RFC 2822 and ISO 8601, with the original's month/weekday
//! abbreviation tables (note "Set" for September, not "Sep").

use crate::calendar::CivilTime;

const WEEKDAY_ABBR: [&str; 8] =
    ["", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTH_ABBR: [&str; 13] = [
    "", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Set", "Oct", "Nov", "Dec",
];

fn utc_offset_str(dst: bool) -> &'static str {
    if dst {
        "+0200"
    } else {
        "+0100"
    }
}

/// Renders `time` as RFC 2822, e.g. `Wed, 07 May 2014 13:27:53 +0200`.
pub fn rfc2822(time: &CivilTime) -> String {
    format!(
        "{}, {:02} {} {:04} {:02}:{:02}:{:02} {}",
        WEEKDAY_ABBR[time.wday as usize],
        time.day,
        MONTH_ABBR[time.month as usize],
        time.year,
        time.hour,
        time.min,
        time.sec,
        utc_offset_str(time.dst)
    )
}

/// Renders `time` as ISO 8601, e.g. `2014-05-07T13:27:53+0200`.
pub fn iso8601(time: &CivilTime) -> String {
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}",
        time.year,
        time.month,
        time.day,
        time.hour,
        time.min,
        time.sec,
        utc_offset_str(time.dst)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CivilTime {
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
    fn rfc2822_matches_the_documented_example() {
        assert_eq!(rfc2822(&sample()), "Wed, 07 May 2014 13:27:53 +0200");
    }

    #[test]
    fn iso8601_matches_the_documented_example() {
        assert_eq!(iso8601(&sample()), "2014-05-07T13:27:53+0200");
    }

    #[test]
    fn september_uses_the_set_abbreviation() {
        let mut t = sample();
        t.month = 9;
        t.day = 1;
        t.wday = 1;
        assert!(rfc2822(&t).contains("Set"));
        assert!(!rfc2822(&t).contains("Sep "));
    }
}
