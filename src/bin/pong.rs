//! Two-player Pong entry point
//!
//! Top paddle: a / d. Bottom paddle: Left / Right.

use launchpad_arcade::platform::{DevicePort, TerminalLaunchpad};
use launchpad_arcade::sim::Pong;
use launchpad_arcade::{Engine, Settings};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = Settings::load();
    let mut device = TerminalLaunchpad::new(settings.poll_timeout());
    device.open()?;

    let game = Box::new(Pong::new(rand::random()));
    Engine::new(device, game, settings)?.run()
}
