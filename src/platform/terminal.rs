//! Terminal stand-in for the LED matrix
//!
//! Draws the 9x9 physical grid (score row on top, side column on the right)
//! with truecolor blocks and turns key presses into raw button ids:
//!
//! | Key                 | Button |
//! |---------------------|--------|
//! | Left                | 112    |
//! | Right               | 116    |
//! | Down                | 120    |
//! | Up, Space, Enter    | 34     |
//! | a                   | 0      |
//! | d                   | 7      |
//! | q, Esc, Ctrl-C      | disconnect |

use std::io::{Stdout, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{self, Color as TermColor};
use crossterm::{cursor, queue, terminal};

use super::{ButtonEvent, DevicePort};
use crate::consts::{DROP_BUTTON, MAX_PHYSICAL, RIGHT_BUTTONS_START};

const GRID_CELLS: u16 = MAX_PHYSICAL as u16 + 1;
/// Row of the glyph and status line, below the grid
const STATUS_ROW: u16 = GRID_CELLS + 1;
/// Terminal RGB step per intensity level
const CHANNEL_STEP: u8 = 85;
const ROTATE_BUTTON: u8 = 34;
const LEFT_BUTTON: u8 = 112;

/// Terminal color of a lit LED
fn led_color(red: u8, green: u8) -> TermColor {
    TermColor::Rgb {
        r: red.min(3) * CHANNEL_STEP,
        g: green.min(3) * CHANNEL_STEP,
        b: 0,
    }
}

pub struct TerminalLaunchpad {
    out: Stdout,
    poll_timeout: Duration,
    connected: bool,
    raw_mode: bool,
}

impl TerminalLaunchpad {
    pub fn new(poll_timeout: Duration) -> Self {
        Self {
            out: std::io::stdout(),
            poll_timeout,
            connected: false,
            raw_mode: false,
        }
    }

    fn key_to_button(key: &KeyEvent) -> Option<u8> {
        match key.code {
            KeyCode::Left => Some(LEFT_BUTTON),
            KeyCode::Right => Some(RIGHT_BUTTONS_START),
            KeyCode::Down => Some(DROP_BUTTON),
            KeyCode::Up | KeyCode::Char(' ') | KeyCode::Enter => Some(ROTATE_BUTTON),
            KeyCode::Char('a') => Some(0),
            KeyCode::Char('d') => Some(7),
            _ => None,
        }
    }

    fn is_quit(key: &KeyEvent) -> bool {
        matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
    }

    fn queue_cell(&mut self, x: u8, y: u8, red: u8, green: u8) -> std::io::Result<()> {
        queue!(self.out, cursor::MoveTo(u16::from(x) * 2, u16::from(y)))?;
        if red == 0 && green == 0 {
            queue!(
                self.out,
                style::SetForegroundColor(TermColor::DarkGrey),
                style::Print("· ")
            )
        } else {
            queue!(
                self.out,
                style::SetForegroundColor(led_color(red, green)),
                style::Print("██")
            )
        }
    }

    fn restore(&mut self) {
        if !self.raw_mode {
            return;
        }
        let _ = queue!(
            self.out,
            style::ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = self.out.flush();
        let _ = terminal::disable_raw_mode();
        self.raw_mode = false;
    }
}

impl DevicePort for TerminalLaunchpad {
    fn open(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        self.raw_mode = true;
        queue!(
            self.out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;
        self.connected = true;
        self.set_all(0)?;
        log::info!("Terminal launchpad opened");
        Ok(())
    }

    fn flush_buttons(&mut self) -> anyhow::Result<()> {
        while event::poll(Duration::ZERO)? {
            event::read()?;
        }
        Ok(())
    }

    fn poll_events(&mut self) -> anyhow::Result<Vec<ButtonEvent>> {
        let mut events = Vec::new();
        let mut timeout = self.poll_timeout;
        while event::poll(timeout)? {
            timeout = Duration::ZERO;
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if Self::is_quit(&key) {
                log::info!("Terminal launchpad disconnected");
                self.connected = false;
                break;
            }
            let Some(id) = Self::key_to_button(&key) else {
                continue;
            };
            events.push(match key.kind {
                KeyEventKind::Release => ButtonEvent::release(id),
                KeyEventKind::Press | KeyEventKind::Repeat => ButtonEvent::press(id),
            });
        }
        Ok(events)
    }

    fn set_cell(&mut self, x: u8, y: u8, red: u8, green: u8) -> anyhow::Result<()> {
        if x > MAX_PHYSICAL || y > MAX_PHYSICAL {
            return Ok(());
        }
        self.queue_cell(x, y, red, green)?;
        queue!(self.out, style::ResetColor)?;
        self.out.flush()?;
        Ok(())
    }

    fn set_all(&mut self, intensity: u8) -> anyhow::Result<()> {
        for y in 0..=MAX_PHYSICAL {
            for x in 0..=MAX_PHYSICAL {
                self.queue_cell(x, y, intensity, intensity)?;
            }
        }
        queue!(
            self.out,
            style::ResetColor,
            cursor::MoveTo(0, STATUS_ROW),
            terminal::Clear(terminal::ClearType::CurrentLine)
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn draw_glyph(&mut self, glyph: char, red: u8, green: u8) -> anyhow::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(0, STATUS_ROW),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::SetForegroundColor(led_color(red, green)),
            style::Print(format!("   {glyph}")),
            style::ResetColor
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

impl Drop for TerminalLaunchpad {
    fn drop(&mut self) {
        self.restore();
    }
}
