//! Sparse frame generations and the diff that pushes them to the device
//!
//! Only cells that appear or disappear between two commits are written.
//! Cell identity is the (x, y) position alone: a cell that stays lit but
//! changes color is not rewritten. Games that need a visible color change on
//! a stationary cell must drop it for one frame first.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use crate::consts::PLAYFIELD_ROW_OFFSET;
use crate::on_board;
use crate::platform::DevicePort;

/// Highest intensity a channel can take
pub const MAX_INTENSITY: u8 = 3;

/// Red/green intensity pair, each 0..=3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub red: u8,
    pub green: u8,
}

impl Color {
    pub const OFF: Color = Color { red: 0, green: 0 };
    pub const RED: Color = Color { red: 3, green: 0 };
    pub const GREEN: Color = Color { red: 0, green: 3 };
    pub const AMBER: Color = Color { red: 3, green: 3 };

    /// Channels are clamped to the device range
    pub const fn new(red: u8, green: u8) -> Self {
        Self {
            red: if red > MAX_INTENSITY { MAX_INTENSITY } else { red },
            green: if green > MAX_INTENSITY { MAX_INTENSITY } else { green },
        }
    }
}

/// A lit playfield position. Equality, ordering and hashing use (x, y) only.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    pub x: u8,
    pub y: u8,
    pub color: Color,
}

impl Cell {
    fn key(&self) -> (u8, u8) {
        (self.x, self.y)
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// One generation of lit cells, in logical playfield coordinates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSet {
    cells: BTreeSet<Cell>,
}

impl FrameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Light (x, y) in this generation. Off-board positions are ignored;
    /// marking an already lit position replaces its color.
    pub fn mark(&mut self, x: i32, y: i32, color: Color) {
        if !on_board(x, y) {
            return;
        }
        self.cells.replace(Cell {
            x: x as u8,
            y: y as u8,
            color,
        });
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        if !on_board(x, y) {
            return None;
        }
        let probe = Cell {
            x: x as u8,
            y: y as u8,
            color: Color::OFF,
        };
        self.cells.get(&probe).map(|cell| cell.color)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

/// Writes issued by one commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitStats {
    pub cleared: usize,
    pub drawn: usize,
}

impl CommitStats {
    pub fn writes(&self) -> usize {
        self.cleared + self.drawn
    }
}

/// Frame Diff Renderer: keeps the committed generation and the one being built
#[derive(Debug, Default)]
pub struct FrameDiff {
    previous: FrameSet,
    next: FrameSet,
}

impl FrameDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell to the generation being built
    pub fn mark_cell(&mut self, x: i32, y: i32, color: Color) {
        self.next.mark(x, y, color);
    }

    /// The generation being built, handed to a game's step
    pub fn next_mut(&mut self) -> &mut FrameSet {
        &mut self.next
    }

    /// What the device currently shows, as far as this renderer knows
    pub fn committed(&self) -> &FrameSet {
        &self.previous
    }

    /// Clear cells that left, draw cells that arrived, then rotate generations
    pub fn commit<D: DevicePort + ?Sized>(&mut self, device: &mut D) -> anyhow::Result<CommitStats> {
        let mut stats = CommitStats::default();

        for cell in self.previous.cells.difference(&self.next.cells) {
            device.set_cell(cell.x, cell.y + PLAYFIELD_ROW_OFFSET, 0, 0)?;
            stats.cleared += 1;
        }
        for cell in self.next.cells.difference(&self.previous.cells) {
            device.set_cell(
                cell.x,
                cell.y + PLAYFIELD_ROW_OFFSET,
                cell.color.red,
                cell.color.green,
            )?;
            stats.drawn += 1;
        }

        self.previous = std::mem::take(&mut self.next);
        log::trace!("commit: {} cleared, {} drawn", stats.cleared, stats.drawn);
        Ok(stats)
    }

    /// Drop the committed generation after the board was wiped behind our
    /// back. The generation being built is drawn in full on the next commit.
    pub fn forget_committed(&mut self) {
        self.previous.clear();
    }

    /// Drop both generations after the board was wiped behind our back
    pub fn forget(&mut self) {
        self.previous.clear();
        self.next.clear();
    }
}
