//! Launchpad Arcade - small arcade games for an 8x8 bi-color LED button matrix
//!
//! Core modules:
//! - `sim`: Per-game state machines (Flappy, Pong, Invaders, Tetris)
//! - `renderer`: Frame diffing and score encoding onto the matrix
//! - `engine`: Idle/countdown/active/game-over loop driving one game
//! - `platform`: Device port abstraction and the terminal stand-in
//! - `settings`: Tunable engine timings

pub mod engine;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use engine::{Engine, Phase};
pub use highscores::HighScores;
pub use settings::Settings;

/// Board geometry and raw button identifiers
pub mod consts {
    use std::ops::{Range, RangeInclusive};

    /// Playfield is BOARD_SIZE x BOARD_SIZE cells
    pub const BOARD_SIZE: i32 = 8;
    /// Physical row holding the first player's score
    pub const SCORE_ROW: u8 = 0;
    /// Physical column holding the second player's score
    pub const SIDE_COLUMN: u8 = 8;
    /// Physical rows are offset by one, row 0 belongs to the score
    pub const PLAYFIELD_ROW_OFFSET: u8 = 1;
    /// Highest valid physical coordinate on either axis
    pub const MAX_PHYSICAL: u8 = 8;

    /// Side buttons that move left
    pub const LEFT_BUTTONS: RangeInclusive<u8> = 112..=115;
    /// Every identifier from here up moves right (Flappy, Pong, Invaders)
    pub const RIGHT_BUTTONS_START: u8 = 116;
    /// Side buttons that move right in Tetris
    pub const RIGHT_BUTTONS: RangeInclusive<u8> = 116..=119;
    /// Hard drop in Tetris
    pub const DROP_BUTTON: u8 = 120;
    /// Grid pads sit below this identifier
    pub const GRID_PADS_END: u8 = 111;
    /// Top-row buttons steering the Pong top paddle left
    pub const TOP_LEFT_BUTTONS: Range<u8> = 0..4;
    /// Top-row buttons steering the Pong top paddle right
    pub const TOP_RIGHT_BUTTONS: Range<u8> = 4..8;
}

/// True when (x, y) lies on the 8x8 playfield
#[inline]
pub fn on_board(x: i32, y: i32) -> bool {
    (0..consts::BOARD_SIZE).contains(&x) && (0..consts::BOARD_SIZE).contains(&y)
}
