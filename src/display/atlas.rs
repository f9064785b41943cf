// Texture Atlas - Power-of-two staging buffer for the GPU texture
//
// The atlas is the smallest power-of-two rectangle that holds the logical
// frame. Only the top-left W×H sub-rectangle carries live pixels; the
// padding stays zero and is never sampled because texture coordinates stop
// at W/Wt and H/Ht.
//
// Texels are 4 bytes wide because the upload path has no 24-bit format.
// The fourth byte is written opaque for live pixels and never read by the
// presentation shader.

/// Bytes per atlas texel (R, G, B, X)
pub const BYTES_PER_TEXEL: usize = 4;

/// CPU-side copy of the atlas texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasBuffer {
    logical_width: usize,
    logical_height: usize,
    width: usize,
    height: usize,
    texels: Vec<u8>,
}

impl AtlasBuffer {
    /// Allocate a zeroed atlas large enough for a `logical_width`×`logical_height` frame
    ///
    /// # Panics
    /// Panics if either dimension is zero
    pub fn new(logical_width: usize, logical_height: usize) -> Self {
        assert!(
            logical_width > 0 && logical_height > 0,
            "Atlas needs a non-empty logical frame ({}x{})",
            logical_width,
            logical_height
        );

        let width = logical_width.next_power_of_two();
        let height = logical_height.next_power_of_two();

        Self {
            logical_width,
            logical_height,
            width,
            height,
            texels: vec![0; width * height * BYTES_PER_TEXEL],
        }
    }

    /// Atlas width (Wt), a power of two
    pub fn width(&self) -> usize {
        self.width
    }

    /// Atlas height (Ht), a power of two
    pub fn height(&self) -> usize {
        self.height
    }

    /// Width of the live sub-rectangle (W)
    pub fn logical_width(&self) -> usize {
        self.logical_width
    }

    /// Height of the live sub-rectangle (H)
    pub fn logical_height(&self) -> usize {
        self.logical_height
    }

    /// Row pitch in bytes
    pub fn bytes_per_row(&self) -> usize {
        self.width * BYTES_PER_TEXEL
    }

    /// Used fraction of the texture on each axis: (W / Wt, H / Ht)
    ///
    /// Both ratios are exact in `f32` since the denominators are powers of two.
    pub fn tex_coord_extent(&self) -> (f32, f32) {
        (
            self.logical_width as f32 / self.width as f32,
            self.logical_height as f32 / self.height as f32,
        )
    }

    /// Read back the RGB triple stored at (x, y)
    ///
    /// # Panics
    /// Panics if coordinates are outside the full atlas
    pub fn texel(&self, x: usize, y: usize) -> [u8; 3] {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        assert!(y < self.height, "Y coordinate {} out of bounds", y);

        let offset = y * self.bytes_per_row() + x * BYTES_PER_TEXEL;
        [
            self.texels[offset],
            self.texels[offset + 1],
            self.texels[offset + 2],
        ]
    }

    /// Raw bytes of the whole atlas, used for the initial texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.texels
    }

    /// Bytes of the rows that hold live pixels, used for per-frame partial uploads
    ///
    /// Each row still spans the full atlas pitch; the upload extent selects
    /// the W×H region.
    pub fn used_rows(&self) -> &[u8] {
        &self.texels[..self.logical_height * self.bytes_per_row()]
    }

    /// Mutable iterator over the live part of each used row
    pub(crate) fn live_rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        let live_bytes = self.logical_width * BYTES_PER_TEXEL;
        let pitch = self.bytes_per_row();
        self.texels
            .chunks_exact_mut(pitch)
            .take(self.logical_height)
            .map(move |row| &mut row[..live_bytes])
    }
}

impl Default for AtlasBuffer {
    fn default() -> Self {
        Self::new(
            super::frame::GAMEBOY_WIDTH,
            super::frame::GAMEBOY_HEIGHT,
        )
    }
}
