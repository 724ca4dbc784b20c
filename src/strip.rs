//! Booth strip composition: photos stacked down a tall canvas, the fitted
//! caption under them and a fixed footer line at the bottom.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{BoothError, Result};
use crate::fit::{fit_caption, FitBox, FitParams, FitResult};
use crate::graphics::{Align, FontBook, FontSpec};

pub const STRIP_FILE: &str = "booth_image.jpg";
pub const DOUBLE_FILE: &str = "booth_image_double.jpg";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripLayout {
    pub width: u32,
    pub height: u32,
    pub photo_count: usize,
    pub photo_size: (u32, u32),
    pub photo_origin: (u32, u32),
    pub photo_step: u32,
    pub caption_box: FitBox,
    pub fit: FitParams,
    pub caption_font: String,
    pub caption_rgb: [u8; 3],
    pub footer_anchor: (i32, i32),
    pub footer_font: String,
    pub footer_px: u32,
    pub footer_rgb: [u8; 3],
}

impl Default for StripLayout {
    fn default() -> Self {
        Self {
            width: STRIP_W,
            height: STRIP_H,
            photo_count: PHOTO_COUNT,
            photo_size: (PHOTO_W, PHOTO_H),
            photo_origin: (PHOTO_X, PHOTO_Y),
            photo_step: PHOTO_STEP,
            caption_box: FitBox::default(),
            fit: FitParams::default(),
            caption_font: "sans".into(),
            caption_rgb: CAPTION_RGB,
            footer_anchor: FOOTER_ANCHOR,
            footer_font: "sans".into(),
            footer_px: FOOTER_PX,
            footer_rgb: FOOTER_RGB,
        }
    }
}

/// Compose the strip. Photos of the wrong size are resized to `photo_size`.
pub fn make_booth_image(
    photos: &[RgbImage],
    caption: &str,
    footer: &str,
    layout: &StripLayout,
    fonts: &FontBook,
) -> Result<(RgbImage, FitResult)> {
    if photos.len() != layout.photo_count {
        return Err(BoothError::PhotoCount {
            expected: layout.photo_count,
            got: photos.len(),
        });
    }

    let mut strip = RgbImage::from_pixel(layout.width, layout.height, Rgb(STRIP_BG));
    let (pw, ph) = layout.photo_size;
    let (x, mut y) = layout.photo_origin;
    for photo in photos {
        if photo.dimensions() == (pw, ph) {
            imageops::overlay(&mut strip, photo, x as i64, y as i64);
        } else {
            let resized = imageops::resize(photo, pw, ph, FilterType::Triangle);
            imageops::overlay(&mut strip, &resized, x as i64, y as i64);
        }
        y += layout.photo_step;
    }

    let base = FontSpec::new(layout.caption_font.as_str(), layout.fit.initial_size);
    let fitted = fit_caption(caption, &layout.caption_box, &base, &layout.fit, fonts)?;
    if !fitted.is_fitted() {
        log::warn!("Caption {:?} drawn unfitted ({:?})", caption, fitted.outcome);
    }
    fonts.draw_multiline(
        &mut strip,
        &fitted.text,
        &fitted.font,
        layout.caption_box.anchor,
        Rgb(layout.caption_rgb),
        Align::Center,
    )?;

    if !footer.is_empty() {
        let footer_font = FontSpec::new(layout.footer_font.as_str(), layout.footer_px);
        fonts.draw_multiline(
            &mut strip,
            footer,
            &footer_font,
            layout.footer_anchor,
            Rgb(layout.footer_rgb),
            Align::Center,
        )?;
    }

    Ok((strip, fitted))
}

/// Two copies side by side, for printers that cut a 2-up sheet into strips.
pub fn printable_double(strip: &RgbImage) -> RgbImage {
    let (w, h) = strip.dimensions();
    let mut sheet = RgbImage::from_pixel(2 * w, h, Rgb(DOUBLE_BG));
    imageops::overlay(&mut sheet, strip, 0, 0);
    imageops::overlay(&mut sheet, strip, w as i64, 0);
    sheet
}

/// Load session photos from disk in order.
pub fn load_photos<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<RgbImage>> {
    paths
        .iter()
        .map(|p| -> Result<RgbImage> { Ok(image::open(p.as_ref())?.to_rgb8()) })
        .collect()
}

/// Write the strip and its printable double into `dir`. Returns `(strip, double)` paths.
pub fn save_session_images(dir: &Path, strip: &RgbImage) -> Result<(PathBuf, PathBuf)> {
    let strip_path = dir.join(STRIP_FILE);
    let double_path = dir.join(DOUBLE_FILE);
    strip.save(&strip_path)?;
    printable_double(strip).save(&double_path)?;
    log::info!("Saved {} and {}", strip_path.display(), double_path.display());
    Ok((strip_path, double_path))
}
