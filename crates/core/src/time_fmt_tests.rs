// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    zero = { 0, "0s" },
    seconds = { 45, "45s" },
    minutes = { 125, "2m5s" },
    exact_minute = { 60, "1m0s" },
    hours = { 5400, "1h30m" },
    exact_hour = { 7200, "2h" },
    days = { 200_000, "2d" },
)]
fn formats_short_durations(secs: u64, expected: &str) {
    assert_eq!(format_elapsed(secs), expected);
}
