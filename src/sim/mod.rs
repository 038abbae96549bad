//! Game simulations
//!
//! Each game is a small real-time state machine behind the `Game` trait:
//! - Input is the raw button batch of one tick plus the scaled elapsed time
//! - Output is the next frame, score deltas, game over and render cues
//! - Randomness comes from an injected, seedable `Pcg32`
//! - No device access; side effects are requested through `Cue`s

pub mod flappy;
pub mod invaders;
pub mod pong;
pub mod tetris;

use std::time::Duration;

pub use flappy::Flappy;
pub use invaders::Invaders;
pub use pong::Pong;
pub use tetris::Tetris;

use crate::platform::ButtonEvent;
use crate::renderer::FrameSet;

/// How a game wants its scores shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreLayout {
    pub players: usize,
    pub high_score: bool,
    /// Never clear lit score segments
    pub cumulative: bool,
}

impl ScoreLayout {
    pub const fn single_player() -> Self {
        Self {
            players: 1,
            high_score: true,
            cumulative: false,
        }
    }
}

/// Everything a game sees in one tick
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    pub events: &'a [ButtonEvent],
    /// Scaled time since the previous tick
    pub elapsed: Duration,
    /// Current round scores, indexed by player
    pub scores: &'a [u32],
}

impl<'a> StepInput<'a> {
    pub fn new(events: &'a [ButtonEvent], elapsed: Duration, scores: &'a [u32]) -> Self {
        Self {
            events,
            elapsed,
            scores,
        }
    }

    /// Identifier of the pressed button, if the batch starts with a press
    pub fn pressed(&self) -> Option<u8> {
        self.events
            .first()
            .filter(|event| event.is_press())
            .map(|event| event.id)
    }

    pub fn score(&self, player: usize) -> u32 {
        self.scores.get(player).copied().unwrap_or(0)
    }
}

/// Side effects a game asks the engine to render outside the frame diff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Pong ball left the board at (x, y), logical coordinates
    PointScored { x: i32, y: i32 },
    /// Tetris reached a new level
    LevelUp { level: u32 },
    /// Tetris cleared full rows
    RowsCleared { rows: u32 },
}

/// Result of one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Points gained per player this tick
    pub score_deltas: [u32; 2],
    pub game_over: bool,
    pub cues: Vec<Cue>,
}

impl StepOutcome {
    pub fn game_over() -> Self {
        Self {
            game_over: true,
            ..Self::default()
        }
    }

    pub fn add_score(&mut self, player: usize, amount: u32) {
        self.score_deltas[player] += amount;
    }

    pub fn scored(&self) -> bool {
        self.score_deltas.iter().any(|&d| d > 0)
    }
}

/// One arcade title
pub trait Game {
    fn title(&self) -> &'static str;

    fn layout(&self) -> ScoreLayout;

    /// Reinitialize round entities and timers
    fn reset(&mut self);

    /// Advance one tick, marking the next frame into `frame`
    fn step(&mut self, input: &StepInput<'_>, frame: &mut FrameSet) -> StepOutcome;
}

/// Whole timer units elapsed, as a fraction
#[inline]
pub(crate) fn units(timer: Duration, unit: Duration) -> f64 {
    timer.as_secs_f64() / unit.as_secs_f64()
}

/// Score-scaled threshold: shrinks linearly as the score approaches 100
#[inline]
pub(crate) fn scaled_threshold(base: f64, score: u32) -> f64 {
    base * (1.0 - score as f64 / 100.0)
}
