// Tile viewer core
//
// A stand-in machine that lets the presentation pipeline run without a
// full emulator: the program image is drawn as Game Boy 2bpp tiles, 20
// tiles per row, and the view scrolls down one pixel row per vertical
// blank. Discarded vblanks still scroll, so the frame divisor is visible
// as the scroll speed.

use super::machine::{EmulatorCore, LoadError};
use crate::display::{Color, LogicalFrame, GAMEBOY_HEIGHT, GAMEBOY_WIDTH};
use std::fs;
use std::path::Path;

const TILE_SIZE: usize = 8;
const TILE_BYTES: usize = 16;
const TILES_PER_ROW: usize = GAMEBOY_WIDTH / TILE_SIZE;

/// Cartridge title field in the Game Boy header
const TITLE_START: usize = 0x134;
const TITLE_END: usize = 0x144;

/// Original DMG green shades, lightest first
pub const DMG_PALETTE: [Color; 4] = [
    Color::rgb(0xE0, 0xF8, 0xD0),
    Color::rgb(0x88, 0xC0, 0x70),
    Color::rgb(0x34, 0x68, 0x56),
    Color::rgb(0x08, 0x18, 0x20),
];

/// Renders a program image as scrolling tile data
#[derive(Default)]
pub struct TileViewer {
    image: Vec<u8>,
    scroll: usize,
    vblanks: u64,
    audio_enabled: bool,
}

impl TileViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewer over an in-memory image
    pub fn with_image(image: Vec<u8>) -> Self {
        Self {
            image,
            ..Self::default()
        }
    }

    /// Number of vertical blanks run so far
    pub fn vblanks(&self) -> u64 {
        self.vblanks
    }

    /// Whether audio output was requested
    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    /// Height in pixels of the whole image laid out as tiles
    fn content_height(&self) -> usize {
        let tiles = self.image.len().div_ceil(TILE_BYTES);
        let rows = tiles.div_ceil(TILES_PER_ROW).max(1);
        rows * TILE_SIZE
    }

    /// 2-bit shade of the image pixel at (x, y) in tile space
    fn shade_at(&self, x: usize, y: usize) -> usize {
        let tile_index = (y / TILE_SIZE) * TILES_PER_ROW + x / TILE_SIZE;
        let offset = tile_index * TILE_BYTES + (y % TILE_SIZE) * 2;
        let (Some(&lo), Some(&hi)) = (self.image.get(offset), self.image.get(offset + 1)) else {
            return 0;
        };

        let bit = 7 - (x % TILE_SIZE);
        (((hi >> bit) & 0x1) << 1 | ((lo >> bit) & 0x1)) as usize
    }

    fn render(&self, frame: &mut LogicalFrame) {
        let height = self.content_height();
        for y in 0..frame.height() {
            let source_y = (y + self.scroll) % height;
            for x in 0..frame.width() {
                frame.set_pixel(x, y, DMG_PALETTE[self.shade_at(x, source_y)]);
            }
        }
    }
}

/// Title stored in a Game Boy cartridge header, if it looks printable
pub fn header_title(image: &[u8]) -> Option<String> {
    let field = image.get(TITLE_START..TITLE_END)?;
    let title: String = field
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect();

    let title = title.trim();
    if title.is_empty() || !title.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
        None
    } else {
        Some(title.to_string())
    }
}

impl EmulatorCore for TileViewer {
    fn frame_size(&self) -> (usize, usize) {
        (GAMEBOY_WIDTH, GAMEBOY_HEIGHT)
    }

    fn run_to_vblank(&mut self, frame: Option<&mut LogicalFrame>) {
        if let Some(frame) = frame {
            self.render(frame);
        }
        self.scroll = (self.scroll + 1) % self.content_height();
        self.vblanks += 1;
    }

    fn load_program_image(&mut self, path: &Path, use_boot_rom: bool) -> Result<(), LoadError> {
        if use_boot_rom {
            return Err(LoadError::BootRomUnavailable);
        }

        let image = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if image.is_empty() {
            return Err(LoadError::Empty {
                path: path.to_path_buf(),
            });
        }

        match header_title(&image) {
            Some(title) => log::info!("Loaded '{}' ({} bytes)", title, image.len()),
            None => log::info!("Loaded {} ({} bytes)", path.display(), image.len()),
        }

        self.image = image;
        self.scroll = 0;
        self.vblanks = 0;
        Ok(())
    }

    fn configure_audio(&mut self, enabled: bool) {
        self.audio_enabled = enabled;
    }
}
