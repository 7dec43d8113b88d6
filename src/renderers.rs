use std::fs::File;
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops;
use image::{Delay, Frame, ImageError, Rgba, RgbaImage};
use log::debug;
use rand::Rng;

use crate::grid::Grid;
use crate::rooms::{CompassPrimary, GridCoordinate};

/// A room renders as a 3x3 block of tiles: the centre marks visitation, the
/// four edge slots mark open walls, and the corners stay background.
pub const ROOM_TILE_SPAN: u32 = 3;

/// Tile strip slot stamped on the walk's active room.
pub const CURSOR_TILE: usize = 0;
/// Tile strip slot stamped on visited room centres and open walls.
pub const ROOM_TILE: usize = 7;
/// The background is pre-filled from the first few strip slots.
const BACKGROUND_TILE_CHOICES: usize = 4;

const BAKED_TILE_SIZE: u32 = 8;
const BAKED_TILE_COLOURS: [[u8; 4]; 8] = [[46, 52, 64, 255],
                                          [59, 66, 82, 255],
                                          [67, 76, 94, 255],
                                          [76, 86, 106, 255],
                                          [94, 129, 172, 255],
                                          [129, 161, 193, 255],
                                          [163, 190, 140, 255],
                                          [216, 222, 233, 255]];

/// A strip of square tiles used to stamp rooms, walls and background onto the
/// frame canvas.
pub struct TileSet {
    tiles: Vec<RgbaImage>,
    tile_size: u32,
}

impl TileSet {
    /// Slice a horizontal sprite strip into square tiles. The strip's height
    /// is the tile size; its width must be a whole number of tiles.
    pub fn from_sprite_sheet<P: AsRef<Path>>(path: P) -> Result<TileSet, ImageError> {
        let sheet = image::open(path)?.to_rgba8();
        let tile_size = sheet.height();
        let tiles_count = (sheet.width() / tile_size) as usize;

        let mut tiles = Vec::with_capacity(tiles_count);
        for tile_number in 0..tiles_count {
            let tile = imageops::crop_imm(&sheet,
                                          tile_number as u32 * tile_size,
                                          0,
                                          tile_size,
                                          tile_size)
                .to_image();
            tiles.push(tile);
        }
        debug!("sliced sprite sheet into {} tiles of {}px", tiles_count, tile_size);

        Ok(TileSet { tiles, tile_size })
    }

    /// A built-in flat-colour strip so rendering needs no asset on disk. Same
    /// slot conventions as a sprite sheet: slots 0-3 background shades, slot 0
    /// doubling as the cursor, slot 7 the room tile.
    pub fn baked() -> TileSet {
        let tiles = BAKED_TILE_COLOURS
            .iter()
            .map(|&colour| RgbaImage::from_pixel(BAKED_TILE_SIZE, BAKED_TILE_SIZE, Rgba(colour)))
            .collect();
        TileSet {
            tiles,
            tile_size: BAKED_TILE_SIZE,
        }
    }

    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    fn tile(&self, index: usize) -> &RgbaImage {
        &self.tiles[index]
    }
}

/// Renders generation frames onto a persistent canvas. The canvas is filled
/// once with a random scatter of background tiles; every `draw` stamps the
/// current visitation and wall state on top, so carved passages accumulate
/// across frames just as they do in the grid.
pub struct FrameRenderer {
    tiles: TileSet,
    canvas: RgbaImage,
}

impl FrameRenderer {
    pub fn new<R: Rng>(grid: &Grid, tiles: TileSet, rng: &mut R) -> FrameRenderer {
        assert!(tiles.len() > ROOM_TILE,
                "tile strip too short: need at least {} tiles",
                ROOM_TILE + 1);

        let tile_size = tiles.tile_size();
        let room_pixels = tile_size * ROOM_TILE_SPAN;
        let canvas_width = grid.width().0 as u32 * room_pixels;
        let canvas_height = grid.height().0 as u32 * room_pixels;
        let mut canvas = RgbaImage::new(canvas_width, canvas_height);

        for tile_y in 0..(canvas_height / tile_size) {
            for tile_x in 0..(canvas_width / tile_size) {
                let background = tiles.tile(rng.gen_range(0..BACKGROUND_TILE_CHOICES));
                imageops::overlay(&mut canvas,
                                  background,
                                  i64::from(tile_x * tile_size),
                                  i64::from(tile_y * tile_size));
            }
        }
        debug!("frame canvas is {}x{} pixels", canvas_width, canvas_height);

        FrameRenderer { tiles, canvas }
    }

    #[inline]
    pub fn frame_width(&self) -> u32 {
        self.canvas.width()
    }

    #[inline]
    pub fn frame_height(&self) -> u32 {
        self.canvas.height()
    }

    /// Stamp every room's state onto the canvas and return the finished
    /// frame. `current` marks the walk's active room with the cursor tile.
    pub fn draw(&mut self, grid: &Grid, current: Option<GridCoordinate>) -> &RgbaImage {
        let tile_size = self.tiles.tile_size();
        let room_pixels = tile_size * ROOM_TILE_SPAN;

        for room in grid.rooms() {
            let coord = room.coordinate();
            let x = coord.x * room_pixels;
            let y = coord.y * room_pixels;

            if room.is_visited() {
                let centre = if current == Some(coord) {
                    CURSOR_TILE
                } else {
                    ROOM_TILE
                };
                self.stamp(centre, x + tile_size, y + tile_size);
            }

            // an open wall extends the room tile into the edge slot
            if !room.walls().is_closed(CompassPrimary::North) {
                self.stamp(ROOM_TILE, x + tile_size, y);
            }
            if !room.walls().is_closed(CompassPrimary::East) {
                self.stamp(ROOM_TILE, x + tile_size * 2, y + tile_size);
            }
            if !room.walls().is_closed(CompassPrimary::South) {
                self.stamp(ROOM_TILE, x + tile_size, y + tile_size * 2);
            }
            if !room.walls().is_closed(CompassPrimary::West) {
                self.stamp(ROOM_TILE, x, y + tile_size);
            }
        }

        &self.canvas
    }

    fn stamp(&mut self, tile_index: usize, x: u32, y: u32) {
        imageops::overlay(&mut self.canvas,
                          self.tiles.tile(tile_index),
                          i64::from(x),
                          i64::from(y));
    }
}

/// Streams frames into an animated gif on disk. Frames are encoded as they
/// arrive; dropping the recorder finalises the file.
pub struct GifRecorder {
    encoder: GifEncoder<File>,
    frame_delay_ms: u32,
}

impl GifRecorder {
    pub fn create<P: AsRef<Path>>(path: P, frame_delay_ms: u32) -> Result<GifRecorder, ImageError> {
        let file = File::create(path)?;
        let mut encoder = GifEncoder::new(file);
        encoder.set_repeat(Repeat::Infinite)?;
        Ok(GifRecorder {
            encoder,
            frame_delay_ms,
        })
    }

    pub fn add_frame(&mut self, frame: &RgbaImage) -> Result<(), ImageError> {
        let delay = Delay::from_numer_denom_ms(self.frame_delay_ms, 1);
        self.encoder
            .encode_frame(Frame::from_parts(frame.clone(), 0, 0, delay))
    }
}

/// Save a single frame as a still image; the format follows the extension.
pub fn save_still<P: AsRef<Path>>(frame: &RgbaImage, path: P) -> Result<(), ImageError> {
    frame.save(path)
}
