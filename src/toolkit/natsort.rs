/*
Copyright 2024 Jakub Lewandowski

This file is part of Wave Model Verification Toolkit (WMVT).

Wave Model Verification Toolkit (WMVT) is a free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation; either version 3 of the License, or
(at your option) any later version.

Wave Model Verification Toolkit (WMVT) is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with Wave Model Verification Toolkit (WMVT). If not, see https://www.gnu.org/licenses/.
*/

//! Natural ordering of file names.
//!
//! Model output is usually split into cycles numbered
//! without zero-padding (`ww3.1.nc`, `ww3.2.nc`, `ww3.10.nc`),
//! so plain lexicographic order would mix the cycles.

use std::{cmp::Ordering, iter::Peekable, path::PathBuf, str::Chars};

/// Compares two strings treating embedded runs of ASCII digits
/// as integers. Other characters are compared as they are.
///
/// Strings equal in natural order (eg. `a01` and `a1`) are
/// ordered lexicographically so the ordering stays total.
pub fn natural_cmp(left: &str, right: &str) -> Ordering {
    let mut left_chars = left.chars().peekable();
    let mut right_chars = right.chars().peekable();

    loop {
        match (left_chars.peek().copied(), right_chars.peek().copied()) {
            (None, None) => return left.cmp(right),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let left_num = take_digits(&mut left_chars);
                let right_num = take_digits(&mut right_chars);

                let ord = compare_digit_runs(&left_num, &right_num);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(&r);
                }

                left_chars.next();
                right_chars.next();
            }
        }
    }
}

/// Sorts paths in natural order of their full string form.
pub fn sort_paths(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
}

fn take_digits(chars: &mut Peekable<Chars>) -> String {
    let mut digits = String::new();

    while let Some(c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }

        digits.push(*c);
        chars.next();
    }

    digits
}

/// Digit runs can be longer than any integer type,
/// so they are compared by length first.
fn compare_digit_runs(left: &str, right: &str) -> Ordering {
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');

    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

#[cfg(test)]
mod tests {
    use super::{natural_cmp, sort_paths};
    use std::{cmp::Ordering, path::PathBuf};

    #[test]
    fn cycles_in_numeric_order() {
        let mut paths: Vec<PathBuf> = ["ww3.2.nc", "ww3.10.nc", "ww3.1.nc"]
            .iter()
            .map(PathBuf::from)
            .collect();

        sort_paths(&mut paths);

        let names: Vec<_> = paths.iter().map(|p| p.to_string_lossy().to_string()).collect();
        assert_eq!(names, vec!["ww3.1.nc", "ww3.2.nc", "ww3.10.nc"]);
    }

    #[test]
    fn mixed_runs() {
        assert_eq!(natural_cmp("ww3.2020010100.nc", "ww3.2020010200.nc"), Ordering::Less);
        assert_eq!(natural_cmp("a9b", "a10a"), Ordering::Less);
        assert_eq!(natural_cmp("a10b", "a10a"), Ordering::Greater);
        assert_eq!(natural_cmp("exp", "exp1"), Ordering::Less);
        assert_eq!(natural_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn leading_zeros() {
        assert_eq!(natural_cmp("ww3.002.nc", "ww3.10.nc"), Ordering::Less);
        // equal numerically, falls back to plain ordering
        assert_eq!(natural_cmp("ww3.01.nc", "ww3.1.nc"), Ordering::Less);
    }

    #[test]
    fn numbers_longer_than_u64() {
        assert_eq!(
            natural_cmp("f99999999999999999999999", "f100000000000000000000000"),
            Ordering::Less
        );
    }
}
