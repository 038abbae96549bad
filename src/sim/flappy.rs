//! Flappy: keep the bird in the air and through the pipe gaps
//!
//! The bird sits on column 1 and falls one row per gravity tick; any press
//! flaps it up one row. Three pipes scroll towards it, each with a three-row
//! gap. Pipes speed up as the score rises.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{Game, ScoreLayout, StepInput, StepOutcome, scaled_threshold, units};
use crate::consts::BOARD_SIZE;
use crate::renderer::{Color, FrameSet};

/// Column the bird flies in
pub const PLAYER_COLUMN: i32 = 1;
/// Lowest row the bird survives on
pub const GROUND_ROW: i32 = 7;
/// Starting row
pub const START_ROW: i32 = 3;
/// Distance a pipe respawns at
pub const RESPAWN_DISTANCE: i32 = 8;
/// Pipes at start, as (distance, gap center); distances past 7 are still off-board
pub const INITIAL_PIPES: [(i32, i32); 3] = [(8, 3), (11, 3), (14, 3)];

/// Timer unit for both accumulators
const TIMER_UNIT: Duration = Duration::from_millis(30);
/// Pipe advance threshold at score 0, in timer units
const PIPE_PERIOD: f64 = 0.7;
/// Gravity threshold, in timer units
const GRAVITY_PERIOD: f64 = 0.5;

const BIRD_COLOR: Color = Color::GREEN;
const PIPE_COLOR: Color = Color::RED;

/// A scrolling pipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipe {
    /// Columns left until the pipe reaches the left edge
    pub distance: i32,
    /// Center row of the gap, 1..=5
    pub gap: i32,
}

impl Pipe {
    /// Whether `row` is solid pipe rather than gap
    fn blocks(&self, row: i32) -> bool {
        (row - self.gap).abs() > 1
    }
}

#[derive(Debug, Clone)]
pub struct Flappy {
    rng: Pcg32,
    y: i32,
    pipes: [Pipe; 3],
    pipe_timer: Duration,
    gravity_timer: Duration,
}

impl Flappy {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            rng: Pcg32::seed_from_u64(seed),
            y: START_ROW,
            pipes: INITIAL_PIPES.map(|(distance, gap)| Pipe { distance, gap }),
            pipe_timer: Duration::ZERO,
            gravity_timer: Duration::ZERO,
        };
        game.reset();
        game
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn pipes(&self) -> &[Pipe; 3] {
        &self.pipes
    }

    fn advance_pipes(&mut self, outcome: &mut StepOutcome) {
        for pipe in &mut self.pipes {
            match pipe.distance {
                0 => {
                    pipe.distance = RESPAWN_DISTANCE;
                    pipe.gap = self.rng.random_range(1..=5);
                }
                1 => {
                    outcome.add_score(0, 1);
                    pipe.distance = 0;
                }
                _ => pipe.distance -= 1,
            }
        }
    }
}

impl Game for Flappy {
    fn title(&self) -> &'static str {
        "Flappy Bird"
    }

    fn layout(&self) -> ScoreLayout {
        ScoreLayout::single_player()
    }

    fn reset(&mut self) {
        self.y = START_ROW;
        self.pipes = INITIAL_PIPES.map(|(distance, gap)| Pipe { distance, gap });
        self.pipe_timer = Duration::ZERO;
        self.gravity_timer = Duration::ZERO;
    }

    fn step(&mut self, input: &StepInput<'_>, frame: &mut FrameSet) -> StepOutcome {
        if input.pressed().is_some() && self.y > 0 {
            self.y -= 1;
        }

        if self.y > GROUND_ROW {
            log::info!("Game over, you smashed into the ground!");
            return StepOutcome::game_over();
        }
        if self
            .pipes
            .iter()
            .any(|pipe| pipe.distance == PLAYER_COLUMN && pipe.blocks(self.y))
        {
            log::info!("Game over, you hit a pipe!");
            return StepOutcome::game_over();
        }

        let mut outcome = StepOutcome::default();
        self.pipe_timer += input.elapsed;
        self.gravity_timer += input.elapsed;

        if units(self.pipe_timer, TIMER_UNIT) > scaled_threshold(PIPE_PERIOD, input.score(0)) {
            self.advance_pipes(&mut outcome);
            self.pipe_timer = Duration::ZERO;
        }
        if units(self.gravity_timer, TIMER_UNIT) > GRAVITY_PERIOD {
            self.y += 1;
            self.gravity_timer = Duration::ZERO;
        }

        frame.mark(PLAYER_COLUMN, self.y, BIRD_COLOR);
        for pipe in &self.pipes {
            for row in (0..BOARD_SIZE).filter(|&row| pipe.blocks(row)) {
                frame.mark(pipe.distance, row, PIPE_COLOR);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::harness::Harness;

    const TICK: Duration = Duration::from_millis(16);

    #[test]
    fn test_press_flaps_up_but_not_past_the_top() {
        let mut h = Harness::new(Flappy::new(1));
        h.press(0, Duration::ZERO);
        assert_eq!(h.game.y(), 2);

        h.game.y = 0;
        h.press(0, Duration::ZERO);
        assert_eq!(h.game.y(), 0);
    }

    #[test]
    fn test_release_does_not_flap() {
        let mut h = Harness::new(Flappy::new(1));
        h.step(&[crate::platform::ButtonEvent::release(0)], Duration::ZERO);
        assert_eq!(h.game.y(), START_ROW);
    }

    #[test]
    fn test_falls_to_the_ground_without_input() {
        let mut h = Harness::new(Flappy::new(7));
        let mut gravity_ticks = 0;
        let mut outcome = StepOutcome::default();
        for _ in 0..20 {
            let before = h.game.y();
            outcome = h.idle(TICK);
            if outcome.game_over {
                break;
            }
            if h.game.y() > before {
                gravity_ticks += 1;
            }
        }
        assert!(outcome.game_over);
        assert!(h.game.y() > GROUND_ROW);
        assert_eq!(gravity_ticks, GROUND_ROW - START_ROW + 1);
        assert_eq!(h.scores, vec![0]);
    }

    #[test]
    fn test_pipe_collision_ends_the_game() {
        let mut h = Harness::new(Flappy::new(3));
        h.game.pipes[0] = Pipe {
            distance: PLAYER_COLUMN,
            gap: 5,
        };
        h.game.y = 2;
        assert!(h.idle(Duration::ZERO).game_over);
    }

    #[test]
    fn test_flying_through_the_gap_is_safe() {
        let mut h = Harness::new(Flappy::new(3));
        h.game.pipes[0] = Pipe {
            distance: PLAYER_COLUMN,
            gap: 3,
        };
        h.game.y = 4;
        assert!(!h.idle(Duration::ZERO).game_over);
    }

    #[test]
    fn test_passing_a_pipe_scores_and_respawns() {
        let mut h = Harness::new(Flappy::new(11));
        h.game.pipes = [
            Pipe { distance: 1, gap: 3 },
            Pipe { distance: 0, gap: 3 },
            Pipe { distance: 5, gap: 3 },
        ];
        h.game.y = 3;
        // Enough to advance pipes once, not enough for gravity
        h.game.pipe_timer = Duration::from_millis(25);
        let outcome = h.idle(Duration::ZERO);

        assert_eq!(outcome.score_deltas, [1, 0]);
        assert_eq!(h.game.pipes[0].distance, 0);
        assert_eq!(h.game.pipes[1].distance, RESPAWN_DISTANCE);
        assert!((1..=5).contains(&h.game.pipes[1].gap));
        assert_eq!(h.game.pipes[2].distance, 4);
    }

    #[test]
    fn test_pipes_speed_up_with_score() {
        let mut h = Harness::new(Flappy::new(5));
        // 15 ms is 0.5 units: below the base 0.7 threshold, above it at score 50
        h.game.pipe_timer = Duration::from_millis(15);
        h.idle(Duration::ZERO);
        assert_eq!(h.game.pipes[0].distance, 8);

        h.scores[0] = 50;
        h.game.pipe_timer = Duration::from_millis(15);
        h.idle(Duration::ZERO);
        assert_eq!(h.game.pipes[0].distance, 7);
    }

    #[test]
    fn test_renders_bird_and_solid_pipe_rows() {
        let mut h = Harness::new(Flappy::new(2));
        h.game.pipes[0] = Pipe { distance: 5, gap: 2 };
        h.idle(Duration::ZERO);

        assert_eq!(h.frame.get(PLAYER_COLUMN, START_ROW), Some(BIRD_COLOR));
        let pipe_rows: Vec<i32> = (0..8).filter(|&r| h.frame.contains(5, r)).collect();
        assert_eq!(pipe_rows, vec![0, 4, 5, 6, 7]);
    }

    #[test]
    fn test_reset_restores_start() {
        let mut h = Harness::new(Flappy::new(9));
        for _ in 0..3 {
            h.idle(TICK);
        }
        h.game.reset();
        assert_eq!(h.game.y(), START_ROW);
        assert_eq!(h.game.pipes()[0], Pipe { distance: 8, gap: 3 });
    }
}
