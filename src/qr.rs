//! QR code for the download link shown after upload.

use std::path::Path;

use image::{GrayImage, Luma};
use qrcode::{Color, QrCode};

use crate::error::Result;

/// Rasterize `data` as a square QR image at most `target_width` pixels wide.
///
/// Each module is scaled to a whole number of pixels, never less than one, so
/// very small targets come out larger than asked.
pub fn make_qr(data: &str, target_width: u32) -> Result<GrayImage> {
    let code = QrCode::new(data.as_bytes())?;
    let modules = code.to_colors();
    let module_count = code.width() as u32;

    let scale = (target_width / module_count).max(1);
    let size = module_count * scale;
    let mut img = GrayImage::from_pixel(size, size, Luma([255u8]));

    for (i, color) in modules.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let x = (i as u32 % module_count) * scale;
        let y = (i as u32 / module_count) * scale;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(x + dx, y + dy, Luma([0u8]));
            }
        }
    }
    Ok(img)
}

/// Rasterize and write the code to `path`, handing back the image for display.
pub fn save_qr(data: &str, target_width: u32, path: &Path) -> Result<GrayImage> {
    let img = make_qr(data, target_width)?;
    img.save(path)?;
    Ok(img)
}
