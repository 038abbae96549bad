//! In-memory device and clock for tests

use std::cell::Cell as StdCell;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::{ButtonEvent, Clock, DevicePort};

/// Everything the device was asked to do, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCall {
    Set { x: u8, y: u8, red: u8, green: u8 },
    Fill(u8),
    Glyph { glyph: char, red: u8, green: u8 },
    Flush,
}

/// Records writes and replays scripted event batches.
///
/// Disconnects after the script runs dry when `disconnect_when_drained` is set.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    pub calls: Vec<DeviceCall>,
    pub script: VecDeque<Vec<ButtonEvent>>,
    pub disconnect_when_drained: bool,
    disconnected: bool,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripted(batches: impl IntoIterator<Item = Vec<ButtonEvent>>) -> Self {
        Self {
            script: batches.into_iter().collect(),
            disconnect_when_drained: true,
            ..Self::default()
        }
    }

    /// Cell writes only, dropping fills and glyphs
    pub fn cell_writes(&self) -> Vec<(u8, u8, u8, u8)> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                DeviceCall::Set { x, y, red, green } => Some((x, y, red, green)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl DevicePort for RecordingDevice {
    fn open(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn flush_buttons(&mut self) -> anyhow::Result<()> {
        self.calls.push(DeviceCall::Flush);
        Ok(())
    }

    fn poll_events(&mut self) -> anyhow::Result<Vec<ButtonEvent>> {
        match self.script.pop_front() {
            Some(batch) => Ok(batch),
            None => {
                if self.disconnect_when_drained {
                    self.disconnected = true;
                }
                Ok(Vec::new())
            }
        }
    }

    fn set_cell(&mut self, x: u8, y: u8, red: u8, green: u8) -> anyhow::Result<()> {
        self.calls.push(DeviceCall::Set { x, y, red, green });
        Ok(())
    }

    fn set_all(&mut self, intensity: u8) -> anyhow::Result<()> {
        self.calls.push(DeviceCall::Fill(intensity));
        Ok(())
    }

    fn draw_glyph(&mut self, glyph: char, red: u8, green: u8) -> anyhow::Result<()> {
        self.calls.push(DeviceCall::Glyph { glyph, red, green });
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.disconnected
    }
}

/// Clock that advances by a fixed step on every reading and jumps on sleep
#[derive(Debug)]
pub struct ManualClock {
    now: StdCell<Instant>,
    step: Duration,
    pub slept: Duration,
}

impl ManualClock {
    pub fn stepping(step: Duration) -> Self {
        Self {
            now: StdCell::new(Instant::now()),
            step,
            slept: Duration::ZERO,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let now = self.now.get() + self.step;
        self.now.set(now);
        now
    }

    fn sleep(&mut self, duration: Duration) {
        self.slept += duration;
        self.now.set(self.now.get() + duration);
    }
}
