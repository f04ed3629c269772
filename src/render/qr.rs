use image::{GrayImage, Luma};
use qrcode::{Color, EcLevel, QrCode};

use super::RenderError;

/// Modules of white border kept around the symbol.
pub const QUIET_ZONE: u32 = 4;

/// Payload encoded in every QR code. The id is appended verbatim so codes on
/// certificates already in circulation keep resolving.
pub fn validation_url(base: &str, id: &str) -> String {
    format!("{}/profile?id={}", base.trim_end_matches('/'), id)
}

fn encode(payload: &str) -> Result<QrCode, RenderError> {
    QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
        .map_err(|e| RenderError::Encode(format!("QR code: {}", e)))
}

/// Number of modules per side including the quiet zone.
pub fn module_count(payload: &str) -> Result<u32, RenderError> {
    Ok(encode(payload)?.width() as u32 + 2 * QUIET_ZONE)
}

/// Renders `payload` into a `size` x `size` bitmap, sampling modules nearest-neighbour.
pub fn render_qr(payload: &str, size: u32) -> Result<GrayImage, RenderError> {
    let code = encode(payload)?;
    let width = code.width() as u32;
    let colors = code.to_colors();
    let modules = width + 2 * QUIET_ZONE;

    if size < modules {
        return Err(RenderError::Encode(format!(
            "QR code needs at least {} px, got {}",
            modules, size
        )));
    }

    let dark_at = |mx: u32, my: u32| -> bool {
        if mx < QUIET_ZONE || my < QUIET_ZONE {
            return false;
        }
        let (x, y) = (mx - QUIET_ZONE, my - QUIET_ZONE);
        if x >= width || y >= width {
            return false;
        }
        colors[(y * width + x) as usize] == Color::Dark
    };

    Ok(GrayImage::from_fn(size, size, |px, py| {
        let mx = (px as u64 * modules as u64 / size as u64) as u32;
        let my = (py as u64 * modules as u64 / size as u64) as u32;
        if dark_at(mx, my) {
            Luma([0])
        } else {
            Luma([255])
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_url_appends_raw_id() {
        assert_eq!(
            validation_url("https://validation.example", "abc123"),
            "https://validation.example/profile?id=abc123"
        );
        assert_eq!(
            validation_url("https://validation.example/", "a b&c"),
            "https://validation.example/profile?id=a b&c"
        );
    }

    #[test]
    fn qr_has_requested_size_and_white_border() {
        let img = render_qr("https://validation.example/profile?id=abc123", 240).unwrap();
        assert_eq!(img.dimensions(), (240, 240));
        assert_eq!(img.get_pixel(0, 0), &Luma([255]));
        assert_eq!(img.get_pixel(239, 239), &Luma([255]));
        assert!(img.pixels().any(|p| p.0[0] == 0));
    }

    #[test]
    fn finder_pattern_sits_inside_quiet_zone() {
        let payload = "https://validation.example/profile?id=abc123";
        let modules = module_count(payload).unwrap();
        let scale = 4;
        let img = render_qr(payload, modules * scale).unwrap();
        // top-left module of the finder pattern is always dark
        let corner = QUIET_ZONE * scale + 1;
        assert_eq!(img.get_pixel(corner, corner), &Luma([0]));
    }

    #[test]
    fn too_small_target_is_an_encode_error() {
        let err = render_qr("abc", 10).unwrap_err();
        assert!(matches!(err, RenderError::Encode(_)));
    }
}
