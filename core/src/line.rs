//! Compress-and-merge on a single row or column.
//!
//! Lines are always oriented so tiles travel toward index 0; the caller
//! (see [`crate::Grid::slide`]) handles reversing and transposing.

use crate::config::{Score, Tile, BOARD_SIZE};

/// One row or column, ordered in the direction of travel.
pub type Line = [Tile; BOARD_SIZE];

/// Result of transforming a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSlide {
    pub line: Line,
    /// Sum of the tiles created by merges.
    pub reward: Score,
}

impl LineSlide {
    /// Whether the transform changed the input line.
    pub fn changed(&self, before: &Line) -> bool {
        self.line != *before
    }
}

/// Move all non-zero values to the front, keeping their order.
pub fn compress(line: &Line) -> Line {
    let mut out = [0; BOARD_SIZE];
    for (slot, value) in out.iter_mut().zip(line.iter().filter(|&&v| v != 0)) {
        *slot = *value;
    }
    out
}

/// Combine equal neighbours in one forward pass.
///
/// A tile produced by a merge is skipped over, so it never merges twice in
/// the same move: `[2, 2, 2, 2]` becomes `[4, 0, 4, 0]`.
pub fn merge(line: &Line) -> LineSlide {
    let mut out = *line;
    let mut reward = 0;
    let mut i = 0;
    while i + 1 < BOARD_SIZE {
        if out[i] != 0 && out[i] == out[i + 1] {
            out[i] *= 2;
            out[i + 1] = 0;
            reward += Score::from(out[i]);
            i += 2;
        } else {
            i += 1;
        }
    }
    LineSlide { line: out, reward }
}

/// Compress, merge, compress again.
pub fn slide(line: &Line) -> LineSlide {
    let merged = merge(&compress(line));
    LineSlide {
        line: compress(&merged.line),
        reward: merged.reward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_simple() {
        assert_eq!(compress(&[0, 2, 0, 4]), [2, 4, 0, 0]);
    }

    #[test]
    fn test_compress_already_compressed() {
        assert_eq!(compress(&[2, 4, 8, 16]), [2, 4, 8, 16]);
        assert_eq!(compress(&[2, 4, 0, 0]), [2, 4, 0, 0]);
    }

    #[test]
    fn test_compress_all_zeros() {
        assert_eq!(compress(&[0, 0, 0, 0]), [0, 0, 0, 0]);
    }

    #[test]
    fn test_compress_is_idempotent() {
        let lines = [[0, 2, 0, 4], [8, 0, 0, 8], [0, 0, 0, 2], [4, 4, 4, 4]];
        for line in lines {
            let once = compress(&line);
            assert_eq!(compress(&once), once);
        }
    }

    #[test]
    fn test_merge_skips_merged_tile() {
        let result = merge(&[2, 2, 2, 2]);
        assert_eq!(result.line, [4, 0, 4, 0]);
        assert_eq!(result.reward, 8);
    }

    #[test]
    fn test_merge_ignores_zero_pairs() {
        let result = merge(&[0, 0, 2, 4]);
        assert_eq!(result.line, [0, 0, 2, 4]);
        assert_eq!(result.reward, 0);
    }

    #[test]
    fn test_slide_simple() {
        let result = slide(&[2, 2, 0, 0]);
        assert_eq!(result.line, [4, 0, 0, 0]);
        assert_eq!(result.reward, 4);
    }

    #[test]
    fn test_slide_two_pairs() {
        let result = slide(&[2, 2, 4, 4]);
        assert_eq!(result.line, [4, 8, 0, 0]);
        assert_eq!(result.reward, 12);
    }

    #[test]
    fn test_no_double_merge() {
        // [4, 2, 2, 0] -> [4, 4, 0, 0], not [8, 0, 0, 0]
        let result = slide(&[4, 2, 2, 0]);
        assert_eq!(result.line, [4, 4, 0, 0]);
        assert_eq!(result.reward, 4);
    }

    #[test]
    fn test_no_double_merge_chain() {
        let result = slide(&[2, 2, 2, 2]);
        assert_eq!(result.line, [4, 4, 0, 0]);
        assert_eq!(result.reward, 8);
    }

    #[test]
    fn test_three_equal_merges_front_pair() {
        let result = slide(&[2, 2, 2, 0]);
        assert_eq!(result.line, [4, 2, 0, 0]);
        assert_eq!(result.reward, 4);
    }

    #[test]
    fn test_merge_with_gaps() {
        let result = slide(&[2, 0, 2, 0]);
        assert_eq!(result.line, [4, 0, 0, 0]);
        assert_eq!(result.reward, 4);
    }

    #[test]
    fn test_packed_line_without_pairs_is_unchanged() {
        let before = [2, 4, 2, 4];
        let result = slide(&before);
        assert!(!result.changed(&before));
        assert_eq!(result.reward, 0);
    }

    #[test]
    fn test_reward_implies_change() {
        for before in [[2, 2, 0, 0], [4, 4, 4, 4], [8, 0, 8, 2], [0, 16, 16, 0]] {
            let result = slide(&before);
            assert!(result.reward > 0);
            assert!(result.changed(&before));
        }
    }
}
