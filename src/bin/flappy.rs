//! Flappy entry point: runs the game on the terminal launchpad

use launchpad_arcade::platform::{DevicePort, TerminalLaunchpad};
use launchpad_arcade::sim::Flappy;
use launchpad_arcade::{Engine, Settings};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = Settings::load();
    let mut device = TerminalLaunchpad::new(settings.poll_timeout());
    device.open()?;

    let game = Box::new(Flappy::new(rand::random()));
    Engine::new(device, game, settings)?.run()
}
