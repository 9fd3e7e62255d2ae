/// Default tile edge in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 200;

/// Index of a tile within its grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

/// A rectangular tile within the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    /// Pixel x of the top-left corner.
    pub x: u32,
    /// Pixel y of the top-left corner.
    pub y: u32,
    /// Tile width in pixels (may be smaller at the right edge).
    pub width: u32,
    /// Tile height in pixels (may be smaller at the bottom edge).
    pub height: u32,
}

impl TileRect {
    /// Number of pixels in this tile.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// Partition a `width × height` image into row-major tiles of at most
/// `tile_size × tile_size`. Edge tiles are clipped to the image.
pub fn build_tile_grid(width: u32, height: u32, tile_size: u32) -> Vec<TileRect> {
    let mut tiles = Vec::new();
    if tile_size == 0 {
        return tiles;
    }
    let mut y = 0;
    while y < height {
        let th = tile_size.min(height - y);
        let mut x = 0;
        while x < width {
            let tw = tile_size.min(width - x);
            tiles.push(TileRect {
                x,
                y,
                width: tw,
                height: th,
            });
            x += tw;
        }
        y += th;
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(width: u32, height: u32, tile_size: u32) {
        let tiles = build_tile_grid(width, height, tile_size);
        let mut covered = vec![false; width as usize * height as usize];
        for tile in &tiles {
            assert!(tile.width <= tile_size && tile.height <= tile_size);
            assert!(tile.width > 0 && tile.height > 0);
            for py in tile.y..tile.y + tile.height {
                for px in tile.x..tile.x + tile.width {
                    assert!(px < width && py < height, "tile leaves the image");
                    let idx = py as usize * width as usize + px as usize;
                    assert!(!covered[idx], "pixel ({px}, {py}) covered twice");
                    covered[idx] = true;
                }
            }
        }
        assert!(covered.iter().all(|&c| c), "all pixels must be covered");
    }

    #[test]
    fn tile_grid_covers_image_exactly_once() {
        for &(w, h, t) in &[
            (200, 150, 64),
            (64, 64, 64),
            (65, 63, 64),
            (1, 1, 200),
            (7, 300, 1),
            (1920, 1080, 200),
            (37, 23, 5),
        ] {
            assert_exact_cover(w, h, t);
        }
    }

    #[test]
    fn tile_count_matches_ceiling_division() {
        let tiles = build_tile_grid(1000, 450, 200);
        assert_eq!(tiles.len(), 5 * 3);
        let last = tiles.last().unwrap();
        assert_eq!((last.x, last.y, last.width, last.height), (800, 400, 200, 50));
    }

    #[test]
    fn empty_inputs_produce_no_tiles() {
        assert!(build_tile_grid(0, 100, 16).is_empty());
        assert!(build_tile_grid(100, 0, 16).is_empty());
        assert!(build_tile_grid(100, 100, 0).is_empty());
    }

    #[test]
    fn contains_is_half_open() {
        let r = TileRect {
            x: 10,
            y: 20,
            width: 5,
            height: 5,
        };
        assert!(r.contains(10, 20));
        assert!(r.contains(14, 24));
        assert!(!r.contains(15, 20));
        assert!(!r.contains(10, 25));
    }
}
