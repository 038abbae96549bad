//! Tetris on an 8x8 well
//!
//! Pieces spawn at a random column and orientation, fall faster every level
//! and lock when they come to rest. Rows filled by a locking piece collapse.
//! Every 15 locked pieces (a cleared row counts as two more) raise the
//! level.

use std::time::Duration;

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{Cue, Game, ScoreLayout, StepInput, StepOutcome};
use crate::consts::{BOARD_SIZE, DROP_BUTTON, GRID_PADS_END, LEFT_BUTTONS, RIGHT_BUTTONS};
use crate::on_board;
use crate::renderer::{Color, FrameSet};

const SIZE: usize = BOARD_SIZE as usize;

/// The seven tetrominoes, +x right and +y down
pub const SHAPES: [[IVec2; 4]; 7] = [
    [IVec2::new(0, 0), IVec2::new(1, 0), IVec2::new(2, 0), IVec2::new(3, 0)],
    [IVec2::new(0, -1), IVec2::new(0, 0), IVec2::new(1, -1), IVec2::new(1, 0)],
    [IVec2::new(0, -1), IVec2::new(1, -1), IVec2::new(2, -1), IVec2::new(1, 0)],
    [IVec2::new(0, -1), IVec2::new(1, -1), IVec2::new(2, -1), IVec2::new(2, 0)],
    [IVec2::new(0, -1), IVec2::new(1, -1), IVec2::new(2, -1), IVec2::new(0, 0)],
    [IVec2::new(0, -1), IVec2::new(1, -1), IVec2::new(1, 0), IVec2::new(2, 0)],
    [IVec2::new(0, -1), IVec2::new(1, -1), IVec2::new(1, 0), IVec2::new(2, -1)],
];

/// Locked pieces needed per level
pub const PIECES_PER_LEVEL: u32 = 15;
/// Gravity period at level 1 is GRAVITY_BASE / 5
const GRAVITY_BASE: Duration = Duration::from_millis(100);
const GRAVITY_LEVEL_FACTOR: u32 = 5;
/// Lowest row of the well
const FLOOR_ROW: i32 = BOARD_SIZE - 1;

/// Settled cells, indexed `[row][column]`
pub type Grid = [[Option<Color>; SIZE]; SIZE];

/// A falling tetromino
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Piece {
    cells: [IVec2; 4],
    /// Rotation center, moves with the piece
    pivot: Vec2,
    color: Color,
}

impl Piece {
    pub fn new(cells: [IVec2; 4], color: Color) -> Self {
        Self {
            cells,
            pivot: rotation_pivot(&cells),
            color,
        }
    }

    pub fn cells(&self) -> &[IVec2; 4] {
        &self.cells
    }

    pub fn color(&self) -> Color {
        self.color
    }

    fn translated(&self, delta: IVec2) -> Self {
        Self {
            cells: self.cells.map(|c| c + delta),
            pivot: self.pivot + delta.as_vec2(),
            color: self.color,
        }
    }

    /// Quarter turn about the pivot
    pub fn rotated(&self) -> Self {
        let pivot = self.pivot;
        Self {
            cells: self
                .cells
                .map(|c| (pivot + (c.as_vec2() - pivot).perp()).round().as_ivec2()),
            pivot,
            color: self.color,
        }
    }

    fn has_distinct_cells(&self) -> bool {
        (0..4).all(|i| (i + 1..4).all(|j| self.cells[i] != self.cells[j]))
    }
}

/// The piece centroid, rounded to the nearest point a quarter turn maps onto
/// whole cells (both coordinates whole, or both halves). Ties round up.
pub fn rotation_pivot(cells: &[IVec2; 4]) -> Vec2 {
    let centroid = cells.iter().fold(Vec2::ZERO, |acc, c| acc + c.as_vec2()) / 4.0;
    let u = (centroid.x + centroid.y + 0.5).floor();
    let v = (centroid.x - centroid.y + 0.5).floor();
    Vec2::new(u + v, u - v) / 2.0
}

#[derive(Debug, Clone)]
pub struct Tetris {
    rng: Pcg32,
    piece: Piece,
    settled: Grid,
    level: u32,
    blocks_passed: u32,
    timer: Duration,
}

impl Tetris {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            rng: Pcg32::seed_from_u64(seed),
            piece: Piece::new(SHAPES[0], Color::RED),
            settled: [[None; SIZE]; SIZE],
            level: 1,
            blocks_passed: 0,
            timer: Duration::ZERO,
        };
        game.reset();
        game
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn settled(&self) -> &Grid {
        &self.settled
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn gravity_period(&self) -> Duration {
        GRAVITY_BASE / (self.level * GRAVITY_LEVEL_FACTOR)
    }

    fn settled_at(&self, pos: IVec2) -> bool {
        on_board(pos.x, pos.y) && self.settled[pos.y as usize][pos.x as usize].is_some()
    }

    fn spawn(&mut self) {
        let shape = SHAPES[self.rng.random_range(0..SHAPES.len())];
        let color = Color::new(self.rng.random_range(1..=3), self.rng.random_range(0..=3));
        let widest = shape.iter().map(|c| c.x).max().unwrap_or(0);
        let offset = self.rng.random_range(0..=BOARD_SIZE - 1 - widest);
        self.piece = Piece::new(shape, color).translated(IVec2::new(offset, 0));

        for _ in 0..self.rng.random_range(0..=3) {
            self.try_rotate();
        }
    }

    /// Rotate unless the result leaves the well, overlaps the stack or folds
    /// onto itself
    pub fn try_rotate(&mut self) -> bool {
        let candidate = self.piece.rotated();
        let fits = candidate
            .cells
            .iter()
            .all(|c| (0..BOARD_SIZE).contains(&c.x) && c.y <= FLOOR_ROW && !self.settled_at(*c));
        if !fits || !candidate.has_distinct_cells() {
            log::debug!("Can't rotate");
            return false;
        }
        self.piece = candidate;
        true
    }

    fn can_shift(&self, dx: i32) -> bool {
        self.piece.cells.iter().all(|c| {
            let target = *c + IVec2::new(dx, 0);
            (0..BOARD_SIZE).contains(&target.x) && !self.settled_at(target)
        })
    }

    /// True when the piece cannot fall one more row
    fn resting(&self) -> bool {
        self.piece
            .cells
            .iter()
            .any(|c| c.y >= FLOOR_ROW || self.settled_at(*c + IVec2::Y))
    }

    fn lock(&mut self, outcome: &mut StepOutcome) {
        log::debug!("Piece locked at {:?}", self.piece.cells);
        self.blocks_passed += 1;

        let color = self.piece.color;
        for cell in self.piece.cells {
            if cell.y <= 0 {
                outcome.game_over = true;
            }
            if on_board(cell.x, cell.y) {
                self.settled[cell.y as usize][cell.x as usize] = Some(color);
            }
        }
        if outcome.game_over {
            log::info!("Game over, the stack reached the top!");
        }

        let rows = self.piece.cells.map(|c| c.y);
        let mut cleared = 0;
        while self.clear_full_row(&rows, outcome) {
            cleared += 1;
        }
        if cleared > 0 {
            // Each cleared row is credited again on top of clear_full_row
            outcome.add_score(0, cleared);
            outcome.cues.push(Cue::RowsCleared { rows: cleared });
        }

        self.spawn();
    }

    /// Collapse the first full row among `rows`. Returns true if one was cleared.
    fn clear_full_row(&mut self, rows: &[i32; 4], outcome: &mut StepOutcome) -> bool {
        for &row in rows {
            if !(0..BOARD_SIZE).contains(&row) {
                continue;
            }
            let row = row as usize;
            if self.settled[row].iter().all(Option::is_some) {
                log::debug!("Full row ({row})");
                for y in (1..=row).rev() {
                    self.settled[y] = self.settled[y - 1];
                }
                self.settled[0] = [None; SIZE];
                outcome.add_score(0, 1);
                self.blocks_passed += 2;
                return true;
            }
        }
        false
    }
}

impl Game for Tetris {
    fn title(&self) -> &'static str {
        "Tetris"
    }

    fn layout(&self) -> ScoreLayout {
        ScoreLayout::single_player()
    }

    fn reset(&mut self) {
        self.settled = [[None; SIZE]; SIZE];
        self.level = 1;
        self.blocks_passed = 0;
        self.timer = Duration::ZERO;
        self.spawn();
    }

    fn step(&mut self, input: &StepInput<'_>, frame: &mut FrameSet) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        let mut shift = 0;
        let mut drops = 0;

        if let Some(id) = input.pressed() {
            if LEFT_BUTTONS.contains(&id) && self.can_shift(-1) {
                shift = -1;
            } else if RIGHT_BUTTONS.contains(&id) && self.can_shift(1) {
                shift = 1;
            } else if id == DROP_BUTTON {
                drops += 1;
            } else if id < GRID_PADS_END {
                self.try_rotate();
            }
        }

        self.timer += input.elapsed;
        if self.timer > self.gravity_period() {
            self.timer = Duration::ZERO;
            drops += 1;
        }

        if shift != 0 {
            self.piece = self.piece.translated(IVec2::new(shift, 0));
        }
        for _ in 0..drops {
            if self.resting() {
                self.lock(&mut outcome);
                break;
            }
            self.piece = self.piece.translated(IVec2::Y);
        }

        if self.blocks_passed >= PIECES_PER_LEVEL {
            self.blocks_passed = 0;
            self.level += 1;
            log::info!("Level {}", self.level);
            outcome.cues.push(Cue::LevelUp { level: self.level });
        }

        for cell in &self.piece.cells {
            frame.mark(cell.x, cell.y, self.piece.color);
        }
        for (y, row) in self.settled.iter().enumerate() {
            for (x, color) in row.iter().enumerate() {
                if let Some(color) = color {
                    frame.mark(x as i32, y as i32, *color);
                }
            }
        }
        outcome
    }
}
