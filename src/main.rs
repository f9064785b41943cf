// Game Boy Presentation - Main Entry Point
//
// Loads a program image into the tile viewer core and presents it
// fullscreen until Escape is pressed or the window is closed.

use clap::Parser;
use env_logger::Env;
use gb_present::display::run_presentation;
use gb_present::emulator::{FramePump, PresentConfig, TileViewer, CONFIG_FILE};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gb-present", version, about = "Game Boy video presentation")]
struct Args {
    /// Program image to run
    rom: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = PresentConfig::load_or_default(CONFIG_FILE);

    let pump = match FramePump::launch(TileViewer::new(), &args.rom, &config) {
        Ok(pump) => pump,
        Err(err) => {
            // Nothing was opened, so there is nothing to tear down
            log::error!("{}", err);
            return Ok(());
        }
    };

    run_presentation(config.video, pump)
}
