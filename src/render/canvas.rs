use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::{imageops, GrayImage, Rgba, RgbaImage};

use super::fonts::FontBook;
use super::layout::{mm_to_px, Anchor, TextOverlay};
use super::RenderError;

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Offscreen sheet for a single render. Owned by the call that created it and
/// released when it goes out of scope, whether or not the render succeeded.
pub struct RenderTarget {
    bitmap: RgbaImage,
}

struct ShapedRun<'a> {
    font: FontArc,
    scale: PxScale,
    synthetic_bold: bool,
    text: &'a str,
    width: f32,
}

impl RenderTarget {
    /// White sheet with `background` stretched over the full area.
    pub fn new(width: u32, height: u32, background: &RgbaImage) -> Self {
        let mut bitmap = RgbaImage::from_pixel(width, height, PAPER);
        let stretched = if background.dimensions() == (width, height) {
            background.clone()
        } else {
            imageops::resize(background, width, height, imageops::FilterType::CatmullRom)
        };
        imageops::overlay(&mut bitmap, &stretched, 0, 0);
        Self { bitmap }
    }

    pub fn into_bitmap(self) -> RgbaImage {
        self.bitmap
    }

    /// Draws one line of text. Nothing is wrapped or clipped to a box; text running
    /// past the template artwork is accepted.
    pub fn draw_text(&mut self, overlay: &TextOverlay, fonts: &FontBook) -> Result<(), RenderError> {
        let em_px = mm_to_px(overlay.style.size_mm);

        let mut runs = Vec::with_capacity(overlay.runs.len());
        for run in &overlay.runs {
            let weight = run.weight.unwrap_or(overlay.style.weight);
            let face = fonts.resolve(overlay.style.family, weight)?;
            let scale = em_scale(&face.font, em_px);
            let width = measure(&face.font, scale, &run.text);
            runs.push(ShapedRun {
                font: face.font,
                scale,
                synthetic_bold: face.synthetic_bold,
                text: &run.text,
                width,
            });
        }

        let total_width: f32 = runs.iter().map(|r| r.width).sum();
        let mut caret = match overlay.anchor {
            Anchor::Start => mm_to_px(overlay.x_mm),
            Anchor::Center => mm_to_px(overlay.x_mm) - total_width / 2.0,
        };
        let top = mm_to_px(overlay.top_mm);

        let Some(first) = runs.first() else {
            return Ok(());
        };
        let baseline = top + first.font.as_scaled(first.scale).ascent();
        let line_start = caret;

        for run in &runs {
            self.draw_run(run, caret, baseline);
            if run.synthetic_bold {
                self.draw_run(run, caret + (em_px / 40.0).max(1.0), baseline);
            }
            caret += run.width;
        }

        if overlay.style.underline {
            let thickness = (em_px / 16.0).max(1.0);
            let y = baseline + thickness * 1.5;
            self.fill_rect(line_start, y, total_width, thickness);
        }

        Ok(())
    }

    fn draw_run(&mut self, run: &ShapedRun<'_>, x: f32, baseline: f32) {
        let scaled = run.font.as_scaled(run.scale);
        let mut caret = x;
        let mut previous: Option<GlyphId> = None;

        for c in run.text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(run.scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            let Some(outlined) = run.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let bitmap = &mut self.bitmap;
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                blend(bitmap, px, py, INK, coverage);
            });
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let x0 = x.round() as i64;
        let y0 = y.round() as i64;
        for dy in 0..height.round().max(1.0) as i64 {
            for dx in 0..width.round().max(0.0) as i64 {
                blend(&mut self.bitmap, x0 + dx, y0 + dy, INK, 1.0);
            }
        }
    }

    /// Copies a square black-on-white QR bitmap at `(x_mm, top_mm)`.
    pub fn draw_qr(&mut self, qr: &GrayImage, x_mm: f32, top_mm: f32) {
        let x0 = mm_to_px(x_mm).round() as i64;
        let y0 = mm_to_px(top_mm).round() as i64;
        for (x, y, luma) in qr.enumerate_pixels() {
            let v = luma.0[0];
            put(&mut self.bitmap, x0 + x as i64, y0 + y as i64, Rgba([v, v, v, 255]));
        }
    }
}

/// Maps a CSS font size (the em box, in pixels) to the glyph scale ab_glyph expects.
fn em_scale(font: &FontArc, em_px: f32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(em_px * font.height_unscaled() / units_per_em)
}

fn measure(font: &FontArc, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut previous: Option<GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

fn put(bitmap: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= bitmap.width() as i64 || y >= bitmap.height() as i64 {
        return;
    }
    bitmap.put_pixel(x as u32, y as u32, color);
}

fn blend(bitmap: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= bitmap.width() as i64 || y >= bitmap.height() as i64 {
        return;
    }
    let a = coverage.clamp(0.0, 1.0);
    let dst = bitmap.get_pixel_mut(x as u32, y as u32);
    for i in 0..3 {
        let mixed = color.0[i] as f32 * a + dst.0[i] as f32 * (1.0 - a);
        dst.0[i] = mixed.round() as u8;
    }
    dst.0[3] = 255;
}
