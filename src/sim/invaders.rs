//! Space Invaders on the matrix
//!
//! The player moves along row 6 and fires a single shot upward. Aliens drift
//! down and sideways at random and new ones appear on the top row. The game
//! ends once an alien reaches the bottom row.

use std::time::Duration;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{Game, ScoreLayout, StepInput, StepOutcome, scaled_threshold, units};
use crate::consts::{BOARD_SIZE, LEFT_BUTTONS, RIGHT_BUTTONS_START};
use crate::renderer::{Color, FrameSet};

/// Row the player moves along
pub const PLAYER_ROW: i32 = 6;
/// Row a fresh shot starts on
pub const SHOT_START_ROW: i32 = 5;
/// An alien on this row ends the game
pub const BREACH_ROW: i32 = 7;
/// Starting swarm as (x, y, red, green)
pub const INITIAL_SWARM: [(i32, i32, u8, u8); 4] =
    [(0, 0, 1, 1), (2, 0, 1, 3), (4, 0, 2, 2), (6, 0, 3, 1)];

const SWARM_UNIT: Duration = Duration::from_millis(31);
const SWARM_PERIOD: f64 = 0.9;
const SHOT_UNIT: Duration = Duration::from_millis(50);
const SHOT_PERIOD: f64 = 0.1;
/// An alien descends when a roll in 0..=DESCEND_ODDS is zero
const DESCEND_ODDS: u32 = 5;
/// An alien wanders when a roll in 0..=WANDER_ODDS is zero
const WANDER_ODDS: u32 = 8;

const PLAYER_COLOR: Color = Color::GREEN;
const SHOT_COLOR: Color = Color::AMBER;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alien {
    pub pos: IVec2,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct Invaders {
    rng: Pcg32,
    x: i32,
    aliens: Vec<Alien>,
    shot: Option<IVec2>,
    swarm_timer: Duration,
    shot_timer: Duration,
}

impl Invaders {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            rng: Pcg32::seed_from_u64(seed),
            x: 4,
            aliens: Vec::new(),
            shot: None,
            swarm_timer: Duration::ZERO,
            shot_timer: Duration::ZERO,
        };
        game.reset();
        game
    }

    pub fn player_x(&self) -> i32 {
        self.x
    }

    pub fn aliens(&self) -> &[Alien] {
        &self.aliens
    }

    pub fn shot(&self) -> Option<IVec2> {
        self.shot
    }

    fn occupied(&self, pos: IVec2) -> bool {
        self.aliens.iter().any(|alien| alien.pos == pos)
    }

    fn control(&mut self, id: u8) {
        if LEFT_BUTTONS.contains(&id) && self.x > 0 {
            self.x -= 1;
        } else if id >= RIGHT_BUTTONS_START && self.x < BOARD_SIZE - 1 {
            self.x += 1;
        } else if self.shot.is_none() {
            self.shot = Some(IVec2::new(self.x, SHOT_START_ROW));
        }
    }

    /// Remove the first alien under the shot. Returns true on a hit.
    fn resolve_hit(&mut self) -> bool {
        let Some(shot) = self.shot else {
            return false;
        };
        match self.aliens.iter().position(|alien| alien.pos == shot) {
            Some(index) => {
                self.aliens.remove(index);
                self.shot = None;
                true
            }
            None => false,
        }
    }

    fn move_swarm(&mut self) {
        for index in 0..self.aliens.len() {
            if self.rng.random_range(0..=DESCEND_ODDS) == 0 {
                self.aliens[index].pos.y += 1;
            }
            if self.rng.random_range(0..=WANDER_ODDS) == 0 {
                self.wander(index);
            }
        }
    }

    /// Try random sideways steps until one is legal; staying put always is
    fn wander(&mut self, index: usize) {
        let current = self.aliens[index].pos;
        loop {
            let x = current.x + self.rng.random_range(-1..=1);
            if x == current.x {
                return;
            }
            let target = IVec2::new(x, current.y);
            if (0..BOARD_SIZE).contains(&x) && !self.occupied(target) {
                self.aliens[index].pos = target;
                return;
            }
        }
    }

    /// Spawn on a free top-row column, more likely the smaller the swarm
    fn maybe_spawn(&mut self) {
        if self.rng.random_range(0..=self.aliens.len()) != 0 {
            return;
        }
        let free: Vec<i32> = (0..BOARD_SIZE)
            .filter(|&x| !self.occupied(IVec2::new(x, 0)))
            .collect();
        if free.is_empty() {
            return;
        }
        let x = free[self.rng.random_range(0..free.len())];
        let color = Color::new(self.rng.random_range(1..=3), self.rng.random_range(1..=3));
        self.aliens.push(Alien {
            pos: IVec2::new(x, 0),
            color,
        });
    }

    fn advance_shot(&mut self) {
        if let Some(shot) = self.shot {
            let next = shot - IVec2::Y;
            self.shot = (next.y >= 0).then_some(next);
        }
    }
}

impl Game for Invaders {
    fn title(&self) -> &'static str {
        "Space Invaders"
    }

    fn layout(&self) -> ScoreLayout {
        ScoreLayout::single_player()
    }

    fn reset(&mut self) {
        self.x = 4;
        self.swarm_timer = Duration::ZERO;
        self.shot_timer = Duration::ZERO;
        self.aliens = INITIAL_SWARM
            .iter()
            .map(|&(x, y, red, green)| Alien {
                pos: IVec2::new(x, y),
                color: Color::new(red, green),
            })
            .collect();
        self.shot = None;
    }

    fn step(&mut self, input: &StepInput<'_>, frame: &mut FrameSet) -> StepOutcome {
        if let Some(id) = input.pressed() {
            self.control(id);
        }

        if self.aliens.iter().any(|alien| alien.pos.y >= BREACH_ROW) {
            log::info!("Game over, the aliens have landed!");
            return StepOutcome::game_over();
        }

        let mut outcome = StepOutcome::default();
        if self.resolve_hit() {
            outcome.add_score(0, 1);
        }

        self.swarm_timer += input.elapsed;
        if units(self.swarm_timer, SWARM_UNIT) > scaled_threshold(SWARM_PERIOD, input.score(0)) {
            self.swarm_timer = Duration::ZERO;
            self.move_swarm();
            self.maybe_spawn();
        }

        self.shot_timer += input.elapsed;
        if units(self.shot_timer, SHOT_UNIT) > SHOT_PERIOD {
            self.shot_timer = Duration::ZERO;
            self.advance_shot();
        }

        frame.mark(self.x, PLAYER_ROW, PLAYER_COLOR);
        for alien in &self.aliens {
            frame.mark(alien.pos.x, alien.pos.y, alien.color);
        }
        if let Some(shot) = self.shot {
            frame.mark(shot.x, shot.y, SHOT_COLOR);
        }
        outcome
    }
}
