use crate::palette::Rgba;

/// Destination for a tile's colored pixels.
///
/// Coordinates are tile-local. The renderer writes every pixel of a
/// finished run and then calls [`commit`](Self::commit) once, which is where
/// a host uploads the tile to the screen.
pub trait PixelSink {
    fn set_pixel(&mut self, x: u32, y: u32, color: Rgba);

    fn commit(&mut self);
}

/// An in-memory RGBA tile buffer.
#[derive(Debug, Clone)]
pub struct MemorySink {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, 4 bytes per pixel, row-major order.
    pub pixels: Vec<u8>,
    commits: u64,
}

impl MemorySink {
    /// Create a new buffer filled with black (opaque).
    pub fn new(width: u32, height: u32) -> Self {
        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        for chunk in pixels.chunks_exact_mut(4) {
            chunk[3] = 255;
        }
        Self {
            width,
            height,
            pixels,
            commits: 0,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let idx = self.offset(x, y);
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// How many times the buffer has been committed.
    pub fn commits(&self) -> u64 {
        self.commits
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y as usize * self.width as usize + x as usize) * 4
    }
}

impl PixelSink for MemorySink {
    fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        let idx = self.offset(x, y);
        self.pixels[idx..idx + 4].copy_from_slice(&color);
    }

    fn commit(&mut self) {
        self.commits += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_black_opaque() {
        let buf = MemorySink::new(4, 4);
        assert_eq!(buf.pixels.len(), 4 * 4 * 4);
        for chunk in buf.pixels.chunks_exact(4) {
            assert_eq!(chunk, &[0, 0, 0, 255]);
        }
        assert_eq!(buf.commits(), 0);
    }

    #[test]
    fn set_pixel_writes_one_pixel() {
        let mut buf = MemorySink::new(8, 8);
        buf.set_pixel(2, 1, [255, 0, 0, 255]);
        assert_eq!(buf.pixel(2, 1), [255, 0, 0, 255]);
        assert_eq!(buf.pixel(1, 2), [0, 0, 0, 255]);
        buf.commit();
        assert_eq!(buf.commits(), 1);
    }
}
