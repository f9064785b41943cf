// Display module - Frame conversion and scaled presentation
//
// This module provides:
// - Logical frames as produced by an emulator core (160×144 for Game Boy)
// - The power-of-two texture atlas and frame-to-atlas conversion
// - Integer-zoom, centered presentation geometry
// - The GPU display context and the presentation window

pub mod atlas;
pub mod context;
pub mod convert;
pub mod frame;
pub mod geometry;
pub mod window;

pub use atlas::{AtlasBuffer, BYTES_PER_TEXEL};
pub use context::{DisplayContext, DisplayError};
pub use convert::convert_frame;
pub use frame::{Color, LogicalFrame, GAMEBOY_HEIGHT, GAMEBOY_WIDTH};
pub use geometry::{
    ortho_projection, tex_coord_quad, DisplayGeometry, GeometryError, UndersizedScreen,
    QUAD_INDICES,
};
pub use window::{run_presentation, PresentationWindow, WindowMode};
