// Scaled presentation geometry
//
// Integer-zoom placement of the logical frame on the physical screen. The
// zoom is the largest whole multiple that fits both axes; the surplus on
// the other axis becomes a centered letterbox.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What to do when the screen is smaller than the logical frame on some axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndersizedScreen {
    /// Draw at 1x centered, clipping the overhang on both sides
    #[default]
    Clamp,
    /// Refuse to initialize
    Fail,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error(
        "screen {screen_width}x{screen_height} cannot fit a \
         {logical_width}x{logical_height} frame at any integer zoom"
    )]
    ZeroZoom {
        screen_width: u32,
        screen_height: u32,
        logical_width: u32,
        logical_height: u32,
    },
}

/// Placement of the scaled frame in screen pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayGeometry {
    /// Physical screen width
    pub screen_width: u32,
    /// Physical screen height
    pub screen_height: u32,
    /// Integer zoom factor (Z)
    pub zoom: u32,
    /// Destination width, W·Z
    pub width: u32,
    /// Destination height, H·Z
    pub height: u32,
    /// Left edge of the destination; negative only when clamped
    pub offset_x: i32,
    /// Top edge of the destination; negative only when clamped
    pub offset_y: i32,
}

impl DisplayGeometry {
    /// Compute the zoom and centered destination rectangle
    ///
    /// Z = min(⌊screen_w / W⌋, ⌊screen_h / H⌋). When Z would be zero the
    /// `undersized` policy decides between a clipped 1x image and an error.
    ///
    /// # Example
    ///
    /// ```
    /// use gb_present::display::{DisplayGeometry, UndersizedScreen};
    ///
    /// let g = DisplayGeometry::compute(1920, 1080, 160, 144, UndersizedScreen::Clamp).unwrap();
    /// assert_eq!(g.zoom, 7);
    /// assert_eq!((g.width, g.height), (1120, 1008));
    /// assert_eq!((g.offset_x, g.offset_y), (400, 36));
    /// ```
    pub fn compute(
        screen_width: u32,
        screen_height: u32,
        logical_width: u32,
        logical_height: u32,
        undersized: UndersizedScreen,
    ) -> Result<Self, GeometryError> {
        let zoom_x = screen_width / logical_width.max(1);
        let zoom_y = screen_height / logical_height.max(1);
        let mut zoom = zoom_x.min(zoom_y);

        if zoom == 0 {
            match undersized {
                UndersizedScreen::Clamp => {
                    log::warn!(
                        "Screen {}x{} is smaller than the {}x{} frame; clipping at 1x",
                        screen_width,
                        screen_height,
                        logical_width,
                        logical_height
                    );
                    zoom = 1;
                }
                UndersizedScreen::Fail => {
                    return Err(GeometryError::ZeroZoom {
                        screen_width,
                        screen_height,
                        logical_width,
                        logical_height,
                    });
                }
            }
        }

        let width = logical_width * zoom;
        let height = logical_height * zoom;

        Ok(Self {
            screen_width,
            screen_height,
            zoom,
            width,
            height,
            offset_x: centered_offset(screen_width, width),
            offset_y: centered_offset(screen_height, height),
        })
    }

    /// Destination quad corners in screen pixels
    ///
    /// Order is top-left, top-right, bottom-right, bottom-left, matching
    /// [`tex_coord_quad`].
    pub fn quad_vertices(&self) -> [[i32; 2]; 4] {
        let left = self.offset_x;
        let top = self.offset_y;
        let right = left + self.width as i32;
        let bottom = top + self.height as i32;

        [[left, top], [right, top], [right, bottom], [left, bottom]]
    }
}

fn centered_offset(screen: u32, scaled: u32) -> i32 {
    (i64::from(screen) - i64::from(scaled)).div_euclid(2) as i32
}

/// Texture coordinates of the live atlas region, in quad order
pub fn tex_coord_quad(extent: (f32, f32)) -> [[f32; 2]; 4] {
    let (u, v) = extent;
    [[0.0, 0.0], [u, 0.0], [u, v], [0.0, v]]
}

/// Triangle list indices drawing the quad as the fan 0-1-2, 0-2-3
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Column-major orthographic projection of screen pixel space
///
/// Maps x in [0, width] and y in [0, height] onto clip space with y
/// increasing downward, the equivalent of `ortho(0, w, h, 0, -1, 1)`.
pub fn ortho_projection(width: u32, height: u32) -> [[f32; 4]; 4] {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;

    [
        [2.0 / w, 0.0, 0.0, 0.0],
        [0.0, -2.0 / h, 0.0, 0.0],
        [0.0, 0.0, -1.0, 0.0],
        [-1.0, 1.0, 0.0, 1.0],
    ]
}
