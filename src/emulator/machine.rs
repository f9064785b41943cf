// Emulator core collaborator
//
// The presentation pipeline does not emulate anything itself. It drives a
// core through this trait: advance to the next vertical blank, optionally
// capturing the finished frame.

use crate::display::LogicalFrame;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a program image into a core
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read program image '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("program image '{}' is empty", path.display())]
    Empty { path: PathBuf },

    #[error("this core cannot boot through a boot ROM")]
    BootRomUnavailable,
}

/// A machine that produces one logical frame per vertical blank
pub trait EmulatorCore {
    /// Native resolution of the frames this core produces, as (width, height)
    fn frame_size(&self) -> (usize, usize);

    /// Advance emulated time up to the next vertical blank
    ///
    /// With `Some(frame)` the completed picture is written into `frame`;
    /// with `None` the picture is discarded while audio and machine state
    /// still advance.
    fn run_to_vblank(&mut self, frame: Option<&mut LogicalFrame>);

    /// Load the program to run
    fn load_program_image(&mut self, path: &Path, use_boot_rom: bool) -> Result<(), LoadError>;

    /// One-time audio output setup
    fn configure_audio(&mut self, enabled: bool);
}
