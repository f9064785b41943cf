// Pixel format conversion between the core's frame and the atlas
//
// The core hands over RGBA pixels; the atlas wants opaque texels laid out
// at the atlas pitch. Alpha from the source is dropped.

use super::atlas::{AtlasBuffer, BYTES_PER_TEXEL};
use super::frame::LogicalFrame;

/// Copy a logical frame into the live region of the atlas
///
/// Writes every pixel in [0, W)×[0, H) and nothing else. The atlas is
/// reused from frame to frame, so this never allocates.
///
/// # Panics
/// Panics if the atlas was sized for a different logical frame
///
/// # Example
///
/// ```
/// use gb_present::display::{convert_frame, AtlasBuffer, Color, LogicalFrame};
///
/// let mut frame = LogicalFrame::gameboy();
/// frame.set_pixel(0, 0, Color::rgba(0x12, 0x34, 0x56, 0x00));
///
/// let mut atlas = AtlasBuffer::default();
/// convert_frame(&frame, &mut atlas);
/// assert_eq!(atlas.texel(0, 0), [0x12, 0x34, 0x56]);
/// ```
pub fn convert_frame(frame: &LogicalFrame, atlas: &mut AtlasBuffer) {
    assert_eq!(
        (frame.width(), frame.height()),
        (atlas.logical_width(), atlas.logical_height()),
        "Atlas must be sized for the logical frame"
    );

    for (src_row, dst_row) in frame.rows().zip(atlas.live_rows_mut()) {
        for (pixel, texel) in src_row.iter().zip(dst_row.chunks_exact_mut(BYTES_PER_TEXEL)) {
            texel[0] = pixel.red;
            texel[1] = pixel.green;
            texel[2] = pixel.blue;
            texel[3] = 0xFF;
        }
    }
}
