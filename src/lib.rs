// Game Boy Presentation Library
// Video output pipeline for a Game Boy emulator core

// Public modules
pub mod display;
pub mod emulator;

// Re-export main types for convenience
pub use display::{
    convert_frame, AtlasBuffer, Color, DisplayGeometry, LogicalFrame, UndersizedScreen,
};
pub use emulator::{
    EmulatorCore, FramePump, LoadError, PresentConfig, PresentOutcome, Presenter, PumpState,
    StopSignal, TileViewer,
};
