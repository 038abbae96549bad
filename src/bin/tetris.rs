//! Tetris entry point
//!
//! Left / Right move, Down drops a row, Up or Space rotates.

use launchpad_arcade::platform::{DevicePort, TerminalLaunchpad};
use launchpad_arcade::sim::Tetris;
use launchpad_arcade::{Engine, Settings};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = Settings::load();
    let mut device = TerminalLaunchpad::new(settings.poll_timeout());
    device.open()?;

    let game = Box::new(Tetris::new(rand::random()));
    Engine::new(device, game, settings)?.run()
}
