// Emulator module - Frame pump driving a core into the display
//
// This module owns everything that is touched once per presented frame:
// the scratch logical frame, the atlas, and the stop flag. Each iteration
// runs the core to its next vertical blank `frame_divisor` times, keeps
// only the last picture, converts it into the atlas and hands it to a
// presenter.

mod config;
mod machine;
mod tile_viewer;

pub use config::{AudioConfig, BootConfig, ConfigError, PresentConfig, VideoConfig, CONFIG_FILE};
pub use machine::{EmulatorCore, LoadError};
pub use tile_viewer::{header_title, TileViewer, DMG_PALETTE};

use crate::display::{convert_frame, AtlasBuffer, LogicalFrame};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of handing one atlas to a presenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// The frame reached the screen
    Presented,
    /// The display could not take a frame this time; nothing was shown
    Skipped,
}

/// Anything that can put a finished atlas on screen
///
/// `present` is expected to block until the display accepts the frame; that
/// wait is the only pacing the pump has. Conditions the presenter cannot
/// recover from are returned as errors and end the pump.
pub trait Presenter {
    type Error;

    fn present(&mut self, atlas: &AtlasBuffer) -> Result<PresentOutcome, Self::Error>;
}

/// Shared flag asking the pump to stop
///
/// Raising it never interrupts an iteration; the pump checks it once, before
/// starting the next one.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request termination
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Frame pump lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    /// Producing and presenting frames
    Running,
    /// Stopped for good
    Terminated,
}

/// Drives an emulator core and feeds its frames to a presenter
///
/// A pump only exists once its program image has loaded, so a load failure
/// can never lead to an iteration or a present.
pub struct FramePump<C> {
    core: C,
    frame: LogicalFrame,
    atlas: AtlasBuffer,
    frame_divisor: u32,
    stop: StopSignal,
    state: PumpState,
    presented_frames: u64,
    skipped_frames: u64,
}

impl<C: EmulatorCore> FramePump<C> {
    /// Configure the core, load the program image and build the pump
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gb_present::emulator::{FramePump, PresentConfig, TileViewer};
    ///
    /// let config = PresentConfig::default();
    /// let pump = FramePump::launch(TileViewer::new(), "game.gb", &config)
    ///     .expect("Failed to load program image");
    /// ```
    pub fn launch<P: AsRef<Path>>(
        mut core: C,
        image_path: P,
        config: &PresentConfig,
    ) -> Result<Self, LoadError> {
        core.configure_audio(config.audio.enabled);
        core.load_program_image(image_path.as_ref(), config.boot.use_boot_rom)?;

        Ok(Self::from_loaded(core, config))
    }

    /// Build a pump around a core that already holds its program
    pub fn from_loaded(core: C, config: &PresentConfig) -> Self {
        let (width, height) = core.frame_size();
        let frame_divisor = config.video.frame_divisor();
        log::info!(
            "Frame {}x{}, atlas {}x{}, {} vblank(s) per presented frame",
            width,
            height,
            width.next_power_of_two(),
            height.next_power_of_two(),
            frame_divisor
        );

        Self {
            core,
            frame: LogicalFrame::new(width, height),
            atlas: AtlasBuffer::new(width, height),
            frame_divisor,
            stop: StopSignal::new(),
            state: PumpState::Running,
            presented_frames: 0,
            skipped_frames: 0,
        }
    }

    /// Replace the pump's stop signal with one owned elsewhere
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Handle that stops this pump when raised
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented_frames
    }

    /// Iterations whose frame the presenter could not show
    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }

    pub fn frame_divisor(&self) -> u32 {
        self.frame_divisor
    }

    /// The atlas as last converted
    pub fn atlas(&self) -> &AtlasBuffer {
        &self.atlas
    }

    pub fn core(&self) -> &C {
        &self.core
    }

    /// Check the stop signal, then run one full iteration
    ///
    /// Returns the state after the call. Once `Terminated`, further calls do
    /// nothing.
    pub fn step<P: Presenter>(&mut self, presenter: &mut P) -> Result<PumpState, P::Error> {
        if self.state == PumpState::Terminated {
            return Ok(PumpState::Terminated);
        }
        if self.stop.is_raised() {
            log::info!(
                "Stopping after {} presented frames ({} skipped)",
                self.presented_frames,
                self.skipped_frames
            );
            self.state = PumpState::Terminated;
            return Ok(PumpState::Terminated);
        }

        self.advance();
        convert_frame(&self.frame, &mut self.atlas);
        match presenter.present(&self.atlas)? {
            PresentOutcome::Presented => self.presented_frames += 1,
            PresentOutcome::Skipped => self.skipped_frames += 1,
        }

        Ok(PumpState::Running)
    }

    /// Run until the stop signal is raised
    pub fn run<P: Presenter>(&mut self, presenter: &mut P) -> Result<(), P::Error> {
        while self.step(presenter)? == PumpState::Running {}
        Ok(())
    }

    /// Advance one presented frame's worth of emulated time
    fn advance(&mut self) {
        for _ in 1..self.frame_divisor {
            self.core.run_to_vblank(None);
        }
        self.core.run_to_vblank(Some(&mut self.frame));
    }
}
