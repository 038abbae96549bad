//! Space Invaders entry point

use launchpad_arcade::platform::{DevicePort, TerminalLaunchpad};
use launchpad_arcade::sim::Invaders;
use launchpad_arcade::{Engine, Settings};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = Settings::load();
    let mut device = TerminalLaunchpad::new(settings.poll_timeout());
    device.open()?;

    let game = Box::new(Invaders::new(rand::random()));
    Engine::new(device, game, settings)?.run()
}
