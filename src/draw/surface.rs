use crate::draw::history::Snapshot;
use crate::draw::model::{Color, Compositing, ModeConfig};
use crate::geometry::{Point, Size};
use anyhow::{Context, Result};
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, ImageEncoder, ImageFormat, Rgba, RgbaImage};
use std::path::Path;

/// Something strokes can be painted onto.
pub trait RenderTarget {
    fn apply(&mut self, config: ModeConfig);
    fn stroke_segment(&mut self, from: Point, to: Point);
}

/// RGBA bitmap the drawing canvas paints onto.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pixels: RgbaImage,
    config: ModeConfig,
    revision: u64,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width.max(1), height.max(1)),
            config: crate::draw::model::DrawMode::Pen.config(Default::default()),
            revision: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width() as f32, self.height() as f32)
    }

    /// Bumped on every pixel mutation so hosts can tell when to re-upload.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn config(&self) -> ModeConfig {
        self.config
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let Rgba([r, g, b, a]) = *self.pixels.get_pixel(x, y);
        Color::rgba(r, g, b, a)
    }

    pub fn rgba_pixels(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
        self.touch();
    }

    pub fn encode(&self) -> Result<Snapshot> {
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf)
            .write_image(
                self.pixels.as_raw(),
                self.width(),
                self.height(),
                ColorType::Rgba8,
            )
            .context("encode surface snapshot")?;
        Ok(Snapshot::new(buf))
    }

    /// Replace the whole surface with a snapshot, anchored at the origin.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        let decoded = image::load_from_memory_with_format(snapshot.bytes(), ImageFormat::Png)
            .context("decode surface snapshot")?
            .to_rgba8();
        self.clear();
        imageops::replace(&mut self.pixels, &decoded, 0, 0);
        self.touch();
        Ok(())
    }

    /// Reallocate the backing store. Existing pixels keep their coordinates;
    /// anything outside the new bounds is dropped.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if width == self.width() && height == self.height() {
            return;
        }
        let mut next = RgbaImage::new(width, height);
        imageops::replace(&mut next, &self.pixels, 0, 0);
        self.pixels = next;
        self.touch();
    }

    /// Replace the content with `image` stretched to the surface size.
    pub fn fill_with_image(&mut self, image: &RgbaImage) {
        let scaled = imageops::resize(image, self.width(), self.height(), FilterType::Triangle);
        self.pixels = scaled;
        self.touch();
    }

    /// Paint `image` over the current content at `(x, y)`.
    pub fn overlay_image(&mut self, image: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(&mut self.pixels, image, x, y);
        self.touch();
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.pixels
            .save_with_format(path, ImageFormat::Png)
            .with_context(|| format!("write sketch {}", path.display()))
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn composite(&mut self, x: u32, y: u32) {
        let src_alpha = self.config.opacity.clamp(0.0, 1.0) * (self.config.color.a as f32 / 255.0);
        let dst = self.pixels.get_pixel_mut(x, y);
        let dst_alpha = dst.0[3] as f32 / 255.0;
        match self.config.compositing {
            Compositing::SourceOver => {
                let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
                if out_alpha <= 0.0 {
                    return;
                }
                let src = [self.config.color.r, self.config.color.g, self.config.color.b];
                for (c, s) in dst.0.iter_mut().take(3).zip(src) {
                    let blended = (s as f32 * src_alpha
                        + *c as f32 * dst_alpha * (1.0 - src_alpha))
                        / out_alpha;
                    *c = blended.round().clamp(0.0, 255.0) as u8;
                }
                dst.0[3] = (out_alpha * 255.0).round() as u8;
            }
            Compositing::DestinationOut => {
                let out_alpha = dst_alpha * (1.0 - src_alpha);
                let a = (out_alpha * 255.0).round() as u8;
                dst.0 = if a == 0 { [0, 0, 0, 0] } else { [dst.0[0], dst.0[1], dst.0[2], a] };
            }
        }
    }
}

impl RenderTarget for Surface {
    fn apply(&mut self, config: ModeConfig) {
        self.config = config;
    }

    /// Round-capped segment. Each covered pixel is composited once per call.
    fn stroke_segment(&mut self, from: Point, to: Point) {
        let radius = (self.config.width as f32 / 2.0).max(0.5);
        let min_x = (from.x.min(to.x) - radius).floor().max(0.0) as i64;
        let min_y = (from.y.min(to.y) - radius).floor().max(0.0) as i64;
        let max_x = ((from.x.max(to.x) + radius).ceil() as i64).min(self.width() as i64 - 1);
        let max_y = ((from.y.max(to.y) + radius).ceil() as i64).min(self.height() as i64 - 1);
        if max_x < min_x || max_y < min_y {
            return;
        }

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_sq_to_segment(center, from, to) <= radius * radius {
                    self.composite(x as u32, y as u32);
                }
            }
        }
        self.touch();
    }
}

fn distance_sq_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (vx, vy) = (b.x - a.x, b.y - a.y);
    let len_sq = vx * vx + vy * vy;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * vx + (p.y - a.y) * vy) / len_sq).clamp(0.0, 1.0)
    };
    let (dx, dy) = (p.x - (a.x + vx * t), p.y - (a.y + vy * t));
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::{DrawMode, PenSettings};

    fn painted(surface: &Surface) -> usize {
        surface.rgba_pixels().chunks_exact(4).filter(|px| px[3] > 0).count()
    }

    #[test]
    fn pen_segment_paints_opaque_pixels() {
        let mut surface = Surface::new(40, 40);
        surface.apply(DrawMode::Pen.config(PenSettings::default()));
        surface.stroke_segment(Point::new(5.0, 20.0), Point::new(35.0, 20.0));

        assert!(painted(&surface) > 30);
        assert_eq!(surface.pixel(20, 20), Color::BLACK);
        assert_eq!(surface.pixel(20, 5).a, 0);
    }

    #[test]
    fn highlighter_is_translucent() {
        let mut surface = Surface::new(20, 20);
        surface.apply(DrawMode::Highlighter.config(PenSettings::default()));
        surface.stroke_segment(Point::new(10.0, 10.0), Point::new(10.0, 10.0));
        let px = surface.pixel(10, 10);
        assert_eq!((px.r, px.g, px.b), (255, 255, 0));
        assert_eq!(px.a, 77);
    }

    #[test]
    fn eraser_clears_to_transparent() {
        let mut surface = Surface::new(40, 40);
        surface.apply(DrawMode::Pen.config(PenSettings { size: 10, ..Default::default() }));
        surface.stroke_segment(Point::new(0.0, 20.0), Point::new(40.0, 20.0));
        assert_eq!(surface.pixel(20, 20).a, 255);

        surface.apply(DrawMode::Eraser.config(PenSettings::default()));
        surface.stroke_segment(Point::new(20.0, 0.0), Point::new(20.0, 40.0));
        assert_eq!(surface.pixel(20, 20), Color::TRANSPARENT);
        assert_eq!(surface.pixel(2, 20).a, 255);
    }

    #[test]
    fn snapshot_restore_replaces_content() {
        let mut surface = Surface::new(16, 16);
        let blank = surface.encode().unwrap();
        surface.apply(DrawMode::Pen.config(PenSettings::default()));
        surface.stroke_segment(Point::new(0.0, 8.0), Point::new(16.0, 8.0));
        assert!(painted(&surface) > 0);

        surface.restore(&blank).unwrap();
        assert_eq!(painted(&surface), 0);
    }

    #[test]
    fn resize_keeps_pixels_at_origin() {
        let mut surface = Surface::new(10, 10);
        surface.apply(DrawMode::Pen.config(PenSettings::default()));
        surface.stroke_segment(Point::new(2.0, 2.0), Point::new(2.0, 2.0));
        let before = surface.pixel(2, 2);

        surface.resize(30, 20);
        assert_eq!((surface.width(), surface.height()), (30, 20));
        assert_eq!(surface.pixel(2, 2), before);

        surface.resize(2, 2);
        assert_eq!((surface.width(), surface.height()), (2, 2));
    }
}
