use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageOutputFormat, RgbImage, RgbaImage};
use printpdf::{ImageFilter, ImageTransform, Mm, PdfDocument};

use crate::render::layout::{PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use crate::render::RenderError;

const MM_PER_INCH: f32 = 25.4;

pub struct ExportService;

impl ExportService {
    /// Lossless PNG of the bitmap.
    pub fn png_bytes(bitmap: &RgbaImage) -> Result<Vec<u8>, RenderError> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(bitmap.clone())
            .write_to(&mut buf, ImageOutputFormat::Png)
            .map_err(|e| RenderError::Encode(format!("PNG: {}", e)))?;
        Ok(buf.into_inner())
    }

    /// Single landscape A4 page with the bitmap as a full-page JPEG.
    pub fn pdf_bytes(bitmap: &RgbaImage, title: &str) -> Result<Vec<u8>, RenderError> {
        let (width, height) = bitmap.dimensions();
        let rgb: RgbImage = DynamicImage::ImageRgba8(bitmap.clone()).into_rgb8();

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, 100)
            .encode_image(&rgb)
            .map_err(|e| RenderError::Encode(format!("JPEG: {}", e)))?;

        // printpdf takes its own copy of the image crate; hand it the raw pixels
        // and then swap in the JPEG stream.
        let raw = printpdf::image_crate::RgbImage::from_raw(width, height, rgb.into_raw())
            .ok_or_else(|| RenderError::Encode("PDF: bitmap size mismatch".to_string()))?;
        let mut image = printpdf::Image::from_dynamic_image(
            &printpdf::image_crate::DynamicImage::ImageRgb8(raw),
        );
        image.image.image_data = jpeg;
        image.image.image_filter = Some(ImageFilter::DCT);

        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);

        // At this DPI the bitmap is exactly one page wide.
        let dpi = MM_PER_INCH * width as f32 / PAGE_WIDTH_MM;
        let natural_height_mm = height as f32 / dpi * MM_PER_INCH;
        image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(0.0)),
                translate_y: Some(Mm(0.0)),
                dpi: Some(dpi),
                scale_y: Some(PAGE_HEIGHT_MM / natural_height_mm),
                ..Default::default()
            },
        );

        doc.save_to_bytes()
            .map_err(|e| RenderError::Encode(format!("PDF: {}", e)))
    }
}
