//! Platform abstraction layer
//!
//! Handles the hardware side the games never see directly:
//! - Raw LED writes and button polling (`DevicePort`)
//! - Wall-clock time and sleeping (`Clock`)
//! - A terminal stand-in for the LED matrix

pub mod terminal;
#[cfg(test)]
pub(crate) mod testing;

use std::time::{Duration, Instant};

pub use terminal::TerminalLaunchpad;

/// One raw button transition reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    /// Raw button identifier
    pub id: u8,
    /// Actuation strength, positive means pressed
    pub strength: u8,
    /// Device-specific payload, unused by the games
    pub extra: u8,
}

impl ButtonEvent {
    pub fn press(id: u8) -> Self {
        Self {
            id,
            strength: 127,
            extra: 0,
        }
    }

    pub fn release(id: u8) -> Self {
        Self {
            id,
            strength: 0,
            extra: 0,
        }
    }

    #[inline]
    pub fn is_press(&self) -> bool {
        self.strength > 0
    }
}

/// Capability surface of the LED matrix device.
///
/// Coordinates are physical: row 0 is the score row, column 8 is the side
/// column. Writes outside 0..=8 are ignored by implementations.
pub trait DevicePort {
    /// Connect to the device
    fn open(&mut self) -> anyhow::Result<()>;

    /// Drop any button events queued before now
    fn flush_buttons(&mut self) -> anyhow::Result<()>;

    /// Next batch of raw button events (possibly empty)
    fn poll_events(&mut self) -> anyhow::Result<Vec<ButtonEvent>>;

    /// Unconditionally write one cell; (0, 0) turns it off
    fn set_cell(&mut self, x: u8, y: u8, red: u8, green: u8) -> anyhow::Result<()>;

    /// Fill every cell with the same intensity on both channels
    fn set_all(&mut self, intensity: u8) -> anyhow::Result<()>;

    /// Show a character glyph across the grid (countdown digits)
    fn draw_glyph(&mut self, glyph: char, red: u8, green: u8) -> anyhow::Result<()>;

    /// False once the device has gone away
    fn is_connected(&self) -> bool {
        true
    }
}

impl<D: DevicePort + ?Sized> DevicePort for Box<D> {
    fn open(&mut self) -> anyhow::Result<()> {
        (**self).open()
    }

    fn flush_buttons(&mut self) -> anyhow::Result<()> {
        (**self).flush_buttons()
    }

    fn poll_events(&mut self) -> anyhow::Result<Vec<ButtonEvent>> {
        (**self).poll_events()
    }

    fn set_cell(&mut self, x: u8, y: u8, red: u8, green: u8) -> anyhow::Result<()> {
        (**self).set_cell(x, y, red, green)
    }

    fn set_all(&mut self, intensity: u8) -> anyhow::Result<()> {
        (**self).set_all(intensity)
    }

    fn draw_glyph(&mut self, glyph: char, red: u8, green: u8) -> anyhow::Result<()> {
        (**self).draw_glyph(glyph, red, green)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

/// Source of wall-clock time for the engine
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&mut self, duration: Duration);
}

/// Real time via `std`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
