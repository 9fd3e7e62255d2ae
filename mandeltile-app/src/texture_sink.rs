use eframe::egui;

use mandeltile_render::{MemorySink, PixelSink, Rgba};

const TEXTURE_OPTIONS: egui::TextureOptions = egui::TextureOptions::LINEAR;

/// A tile's pixels, uploaded to the GPU as an egui texture on every commit.
pub struct TextureSink {
    ctx: egui::Context,
    name: String,
    pixels: MemorySink,
    texture: Option<egui::TextureHandle>,
}

impl TextureSink {
    pub fn new(ctx: &egui::Context, name: String, width: u32, height: u32) -> Self {
        Self {
            ctx: ctx.clone(),
            name,
            pixels: MemorySink::new(width, height),
            texture: None,
        }
    }

    /// `None` until the tile has been committed once.
    pub fn texture(&self) -> Option<&egui::TextureHandle> {
        self.texture.as_ref()
    }
}

impl PixelSink for TextureSink {
    fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        self.pixels.set_pixel(x, y, color);
    }

    fn commit(&mut self) {
        self.pixels.commit();
        let size = [self.pixels.width as usize, self.pixels.height as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, &self.pixels.pixels);
        match self.texture.as_mut() {
            Some(handle) => handle.set(image, TEXTURE_OPTIONS),
            None => {
                self.texture = Some(self.ctx.load_texture(&self.name, image, TEXTURE_OPTIONS));
            }
        }
    }
}
