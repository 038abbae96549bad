//! LED matrix rendering
//!
//! Games mark cells into a `FrameSet`; `FrameDiff` pushes only the changes to
//! the device. Scores bypass the diff and are painted by `ScoreDisplay`.

pub mod frame;
pub mod score;

pub use frame::{Cell, Color, CommitStats, FrameDiff, FrameSet};
pub use score::ScoreDisplay;
