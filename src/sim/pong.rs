//! Pong for two players on one device
//!
//! Player 0 steers the top paddle with the top-row buttons, player 1 the
//! bottom paddle with the side buttons. The ball speeds up over a rally and
//! returns at an angle depending on where it hits the paddle. First to 8
//! points wins.

use std::time::Duration;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{Cue, Game, ScoreLayout, StepInput, StepOutcome};
use crate::consts::{LEFT_BUTTONS, RIGHT_BUTTONS_START, TOP_LEFT_BUTTONS, TOP_RIGHT_BUTTONS};
use crate::renderer::{Color, FrameSet};

/// Points needed to win
pub const WINNING_SCORE: u32 = 8;
/// Row of the top paddle (player 0)
pub const TOP_ROW: i32 = 0;
/// Row of the bottom paddle (player 1)
pub const BOTTOM_ROW: i32 = 7;
/// Paddle centers stay within 1..=6 so the 3-wide bar fits
pub const PADDLE_MIN: i32 = 1;
pub const PADDLE_MAX: i32 = 6;
/// Rally ticks the ball waits (blinking) before it moves
pub const SERVE_PAUSE: u32 = 4;

/// Ball advance period at the start of a rally
const BASE_PERIOD: Duration = Duration::from_millis(50);
/// Spin fires when a roll in 0..=SPIN_ODDS comes up zero
const SPIN_ODDS: u32 = 1000;

const BALL_COLOR: Color = Color::AMBER;
const TOP_COLOR: Color = Color::RED;
const BOTTOM_COLOR: Color = Color::GREEN;

#[derive(Debug, Clone)]
pub struct Pong {
    rng: Pcg32,
    /// Paddle centers, indexed by player
    paddles: [i32; 2],
    ball: IVec2,
    dir: IVec2,
    timer: Duration,
    /// Ball advance opportunities since the serve
    rally_ticks: u32,
}

impl Pong {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            rng: Pcg32::seed_from_u64(seed),
            paddles: [4, 4],
            ball: IVec2::new(3, 3),
            dir: IVec2::ONE,
            timer: Duration::ZERO,
            rally_ticks: 0,
        };
        game.reset();
        game
    }

    pub fn ball(&self) -> IVec2 {
        self.ball
    }

    pub fn dir(&self) -> IVec2 {
        self.dir
    }

    /// Paddle center for `player`
    pub fn paddle(&self, player: usize) -> i32 {
        self.paddles[player]
    }

    pub fn rally_ticks(&self) -> u32 {
        self.rally_ticks
    }

    fn random_dir(&mut self) -> IVec2 {
        let mut sign = || if self.rng.random_bool(0.5) { 1 } else { -1 };
        IVec2::new(sign(), sign())
    }

    /// Put the ball near the center, rows biased away from the side that just lost it
    fn serve(&mut self, rows: std::ops::RangeInclusive<i32>) {
        self.ball = IVec2::new(self.rng.random_range(3..=4), self.rng.random_range(rows));
        self.dir = self.random_dir();
        self.rally_ticks = 0;
    }

    fn steer(&mut self, id: u8) {
        let [top, bottom] = &mut self.paddles;
        if LEFT_BUTTONS.contains(&id) && *bottom > PADDLE_MIN {
            *bottom -= 1;
        } else if id >= RIGHT_BUTTONS_START && *bottom < PADDLE_MAX {
            *bottom += 1;
        } else if TOP_LEFT_BUTTONS.contains(&id) && *top > PADDLE_MIN {
            *top -= 1;
        } else if TOP_RIGHT_BUTTONS.contains(&id) && *top < PADDLE_MAX {
            *top += 1;
        }
    }

    /// Reflect off a paddle, angled by the hit offset, then move on from the
    /// position before the bounce
    fn bounce_off_paddle(&mut self, paddle: i32) {
        let before = self.ball - self.dir;
        let offset = self.ball.x - paddle;
        self.dir.y = -self.dir.y;
        self.dir.x *= if offset != 0 { offset } else { 1 };
        self.ball = before + self.dir;
    }

    fn advance_ball(&mut self, outcome: &mut StepOutcome) {
        self.ball += self.dir;
        let [top, bottom] = self.paddles;

        if self.ball.y == TOP_ROW && (self.ball.x - top).abs() <= 1 {
            self.bounce_off_paddle(top);
        } else if self.ball.y == BOTTOM_ROW && (self.ball.x - bottom).abs() <= 1 {
            self.bounce_off_paddle(bottom);
        } else if self.ball.x <= 0 {
            self.ball.x = 0;
            self.dir.x = -self.dir.x;
        } else if self.ball.x >= 7 {
            self.ball.x = 7;
            self.dir.x = -self.dir.x;
        } else if self.ball.y < TOP_ROW {
            log::info!("Player 2 scored!");
            outcome.cues.push(Cue::PointScored {
                x: self.ball.x,
                y: self.ball.y,
            });
            outcome.add_score(1, 1);
            self.serve(3..=4);
        } else if self.ball.y > BOTTOM_ROW {
            log::info!("Player 1 scored!");
            outcome.cues.push(Cue::PointScored {
                x: self.ball.x,
                y: self.ball.y,
            });
            outcome.add_score(0, 1);
            self.serve(4..=5);
        } else if self.rng.random_range(0..=SPIN_ODDS) == 0 {
            let mut nudge = || if self.rng.random_bool(0.5) { 1 } else { -1 };
            self.dir += IVec2::new(nudge(), nudge());
        }
    }

    fn advance_threshold(&self) -> Duration {
        BASE_PERIOD.div_f64(self.rally_ticks as f64 / 10.0 + 1.0)
    }
}

impl Game for Pong {
    fn title(&self) -> &'static str {
        "Pong"
    }

    fn layout(&self) -> ScoreLayout {
        ScoreLayout {
            players: 2,
            high_score: false,
            cumulative: true,
        }
    }

    fn reset(&mut self) {
        self.timer = Duration::ZERO;
        self.paddles = [4, 4];
        self.serve(3..=4);
    }

    fn step(&mut self, input: &StepInput<'_>, frame: &mut FrameSet) -> StepOutcome {
        if let Some(id) = input.pressed() {
            self.steer(id);
        }

        if input.score(0) >= WINNING_SCORE || input.score(1) >= WINNING_SCORE {
            log::info!(
                "Game over! Player 1: {} Player 2: {}",
                input.score(0),
                input.score(1)
            );
            return StepOutcome::game_over();
        }

        let mut outcome = StepOutcome::default();
        self.timer += input.elapsed;
        if self.timer > self.advance_threshold() {
            self.timer = Duration::ZERO;
            if self.rally_ticks > SERVE_PAUSE {
                self.advance_ball(&mut outcome);
            }
            self.rally_ticks += 1;
        }

        // The ball blinks during the serve pause
        if self.rally_ticks > SERVE_PAUSE || self.rally_ticks % 2 == 1 {
            frame.mark(self.ball.x, self.ball.y, BALL_COLOR);
        }
        let [top, bottom] = self.paddles;
        for dx in -1..=1 {
            frame.mark(bottom + dx, BOTTOM_ROW, BOTTOM_COLOR);
            frame.mark(top + dx, TOP_ROW, TOP_COLOR);
        }
        outcome
    }
}
