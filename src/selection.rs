//! Playlist selection strings
//!
//! Users pick playlist entries with 1-based indices and inclusive ranges,
//! e.g. `1,3-5,9`. The result is always a sorted, duplicate-free list of
//! 0-based indices inside the playlist.

use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Nothing selected")]
    Empty,

    #[error("Invalid selection '{0}': expected a number or a range like 3-7")]
    InvalidToken(String),

    #[error("Invalid range '{0}': start is after end")]
    ReversedRange(String),

    #[error("Index {index} is out of range, the playlist has {total} entries")]
    OutOfRange { index: usize, total: usize },
}

/// Parse a selection string against a playlist of `total` entries.
///
/// Any malformed token rejects the whole input. Range ends past the end of
/// the playlist are clipped.
pub fn parse_selection(input: &str, total: usize) -> Result<Vec<usize>, SelectionError> {
    if input.trim().is_empty() || total == 0 {
        return Err(SelectionError::Empty);
    }

    let mut indices = BTreeSet::new();
    for raw in input.split(',') {
        let token = raw.trim();
        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_index(start, token)?;
                let end = parse_index(end, token)?;
                if start > end {
                    return Err(SelectionError::ReversedRange(token.to_string()));
                }
                check_bounds(start, total)?;
                indices.extend(start - 1..end.min(total));
            }
            None => {
                let index = parse_index(token, token)?;
                check_bounds(index, total)?;
                indices.insert(index - 1);
            }
        }
    }

    Ok(indices.into_iter().collect())
}

/// A 1-based index; zero is not a valid position.
fn parse_index(part: &str, token: &str) -> Result<usize, SelectionError> {
    match part.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(SelectionError::InvalidToken(token.to_string())),
        Ok(n) => Ok(n),
    }
}

fn check_bounds(index: usize, total: usize) -> Result<(), SelectionError> {
    if index > total {
        Err(SelectionError::OutOfRange { index, total })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_and_ranges() {
        assert_eq!(parse_selection("1,3-5", 10), Ok(vec![0, 2, 3, 4]));
    }

    #[test]
    fn test_range_end_is_clipped() {
        assert_eq!(parse_selection("2-100", 5), Ok(vec![1, 2, 3, 4]));
    }

    #[test]
    fn test_overlaps_collapse_and_sort() {
        assert_eq!(parse_selection("5, 2-4 ,3,1-2", 6), Ok(vec![0, 1, 2, 3, 4]));
        assert_eq!(parse_selection("3-3", 3), Ok(vec![2]));
    }

    #[test]
    fn test_malformed_token_rejects_everything() {
        assert_eq!(
            parse_selection("1,abc,3", 5),
            Err(SelectionError::InvalidToken("abc".into()))
        );
        assert_eq!(
            parse_selection("1,,3", 5),
            Err(SelectionError::InvalidToken("".into()))
        );
        assert_eq!(
            parse_selection("2-", 5),
            Err(SelectionError::InvalidToken("2-".into()))
        );
        assert_eq!(
            parse_selection("1-2-3", 5),
            Err(SelectionError::InvalidToken("1-2-3".into()))
        );
    }

    #[test]
    fn test_reversed_range() {
        assert_eq!(
            parse_selection("5-2", 10),
            Err(SelectionError::ReversedRange("5-2".into()))
        );
    }

    #[test]
    fn test_zero_and_out_of_range() {
        assert_eq!(
            parse_selection("0", 5),
            Err(SelectionError::InvalidToken("0".into()))
        );
        assert_eq!(
            parse_selection("6", 5),
            Err(SelectionError::OutOfRange { index: 6, total: 5 })
        );
        assert_eq!(
            parse_selection("7-9", 5),
            Err(SelectionError::OutOfRange { index: 7, total: 5 })
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_selection("  ", 5), Err(SelectionError::Empty));
        assert_eq!(parse_selection("1", 0), Err(SelectionError::Empty));
    }

    #[test]
    fn test_every_result_is_in_bounds() {
        let inputs = ["1", "1-3", "2,4-9", "9-20", "1-20,5,5,5", "10"];
        for total in 1..=12 {
            for input in inputs {
                if let Ok(indices) = parse_selection(input, total) {
                    assert!(indices.windows(2).all(|w| w[0] < w[1]), "{input} / {total}");
                    assert!(indices.iter().all(|&i| i < total), "{input} / {total}");
                }
            }
        }
    }
}
