//! Score encoding onto the score row and side column
//!
//! A score is shown as two segments: the ones value `score % 9` and the tens
//! value `score / 9`, each lighting the column `value - 1` (0 lights nothing).
//! Scores 1 and 10 therefore light the same single column.

use anyhow::ensure;

use crate::consts::{MAX_PHYSICAL, SCORE_ROW, SIDE_COLUMN};
use crate::platform::DevicePort;

use super::frame::Color;

/// Columns available to each score segment
const SEGMENTS: i64 = 8;

/// Color of live scores
pub const SCORE_COLOR: Color = Color::AMBER;
/// Color of high scores
pub const HIGH_SCORE_COLOR: Color = Color::GREEN;

/// Whether score-row column `column` (0..8) is lit for `score`
pub fn row_segment_lit(score: u32, column: u8) -> bool {
    let (ones, tens) = segments(score);
    let column = column as i64;
    ones == column || tens == column
}

/// Whether side-column physical row `row` (1..=8) is lit for `score`.
///
/// The side column reads as a bar growing up from the bottom row.
pub fn side_segment_lit(score: u32, row: u8) -> bool {
    let (ones, tens) = segments(score);
    let threshold = SEGMENTS - row as i64;
    ones >= threshold || tens >= threshold
}

fn segments(score: u32) -> (i64, i64) {
    let score = score as i64;
    (score % 9 - 1, score / 9 - 1)
}

/// Score Display for one or two players
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreDisplay {
    players: usize,
}

impl ScoreDisplay {
    /// Fails for any player count other than 1 or 2
    pub fn new(players: usize) -> anyhow::Result<Self> {
        ensure!(
            (1..=2).contains(&players),
            "can only paint scores for 1 or 2 players, got {players}"
        );
        Ok(Self { players })
    }

    /// Paint live scores. Cumulative mode never clears a segment.
    pub fn paint_score<D: DevicePort + ?Sized>(
        &self,
        device: &mut D,
        scores: &[u32],
        cumulative: bool,
    ) -> anyhow::Result<()> {
        debug_assert_eq!(scores.len(), self.players);
        self.paint(device, scores, SCORE_COLOR, !cumulative)
    }

    /// Paint high scores, always clearing unlit segments
    pub fn paint_high_score<D: DevicePort + ?Sized>(
        &self,
        device: &mut D,
        high_scores: &[u32],
    ) -> anyhow::Result<()> {
        debug_assert_eq!(high_scores.len(), self.players);
        self.paint(device, high_scores, HIGH_SCORE_COLOR, true)
    }

    fn paint<D: DevicePort + ?Sized>(
        &self,
        device: &mut D,
        scores: &[u32],
        color: Color,
        clear_unlit: bool,
    ) -> anyhow::Result<()> {
        let first = scores.first().copied().unwrap_or(0);
        for column in 0..SEGMENTS as u8 {
            if row_segment_lit(first, column) {
                device.set_cell(column, SCORE_ROW, color.red, color.green)?;
            } else if clear_unlit {
                device.set_cell(column, SCORE_ROW, 0, 0)?;
            }
        }

        if self.players == 2 {
            let second = scores.get(1).copied().unwrap_or(0);
            for row in 1..=MAX_PHYSICAL {
                if side_segment_lit(second, row) {
                    device.set_cell(SIDE_COLUMN, row, color.red, color.green)?;
                } else if clear_unlit {
                    device.set_cell(SIDE_COLUMN, row, 0, 0)?;
                }
            }
        }
        Ok(())
    }
}
