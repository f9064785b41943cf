// Logical Frame - The emulated machine's native-resolution output
//
// The Game Boy LCD is 160×144 pixels. The core writes one completed frame
// into this buffer per presented frame; the pump reuses it as scratch
// space for the next one.

/// Game Boy screen width in pixels
pub const GAMEBOY_WIDTH: usize = 160;

/// Game Boy screen height in pixels
pub const GAMEBOY_HEIGHT: usize = 144;

/// A single RGBA pixel as produced by the emulator core
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    /// Opaque black, the power-on contents of every frame
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    /// Create an opaque color
    #[inline]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 0xFF,
        }
    }

    /// Create a color with an explicit alpha channel
    #[inline]
    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// Fixed-size grid of RGBA pixels, row-major
pub struct LogicalFrame {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl LogicalFrame {
    /// Create a frame of the given size filled with opaque black
    ///
    /// # Panics
    /// Panics if either dimension is zero
    pub fn new(width: usize, height: usize) -> Self {
        assert!(
            width > 0 && height > 0,
            "Logical frame must not be empty ({}x{})",
            width,
            height
        );

        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width * height],
        }
    }

    /// Create a frame at the Game Boy's native resolution
    pub fn gameboy() -> Self {
        Self::new(GAMEBOY_WIDTH, GAMEBOY_HEIGHT)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Set a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        assert!(y < self.height, "Y coordinate {} out of bounds", y);

        self.pixels[y * self.width + x] = color;
    }

    /// Get a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        assert!(y < self.height, "Y coordinate {} out of bounds", y);

        self.pixels[y * self.width + x]
    }

    /// Fill the whole frame with one color
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Iterate over the frame one row at a time
    pub fn rows(&self) -> impl Iterator<Item = &[Color]> {
        self.pixels.chunks_exact(self.width)
    }

    /// Get the raw pixels, row-major
    pub fn as_slice(&self) -> &[Color] {
        &self.pixels
    }

    /// Get mutable access to the raw pixels
    pub fn as_mut_slice(&mut self) -> &mut [Color] {
        &mut self.pixels
    }
}

impl Default for LogicalFrame {
    fn default() -> Self {
        Self::gameboy()
    }
}
