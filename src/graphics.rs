use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ar_reshaper::{ArabicReshaper, ReshaperConfig};
use image::{Rgb, RgbImage};
use rusttype::{point, Font, Scale};
use unicode_bidi::BidiInfo;

use crate::error::{BoothError, Result};

/// A font family plus a pixel size. Resizing produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub family: String,
    pub size_px: u32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size_px: u32) -> Self {
        Self { family: family.into(), size_px }
    }

    pub fn with_size(&self, size_px: u32) -> Self {
        Self { family: self.family.clone(), size_px }
    }
}

/// Text measurement service used by the caption fit search.
///
/// Implementations must be deterministic for a given font backend.
pub trait TextMeasure {
    /// Pixel width of `text` rendered as a single line.
    fn line_width(&self, text: &str, font: &FontSpec) -> Result<u32>;

    /// `(width, height)` of a multi-line block whose top-left sits at `anchor`.
    fn block_bbox(&self, text: &str, font: &FontSpec, anchor: (i32, i32)) -> Result<(u32, u32)>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

/// Loaded TrueType fonts keyed by family name.
pub struct FontBook {
    fonts: HashMap<String, Font<'static>>,
    reshaper: ArabicReshaper,
    line_spacing: u32,
}

impl FontBook {
    pub fn new(line_spacing: u32) -> Self {
        Self {
            fonts: HashMap::new(),
            reshaper: ArabicReshaper::new(ReshaperConfig::default()),
            line_spacing,
        }
    }

    /// Register a font from a `.ttf`/`.otf` file under `family`.
    pub fn load_file(&mut self, family: &str, path: &Path) -> Result<()> {
        let bytes = fs::read(path).map_err(|e| BoothError::FontLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let font = Font::try_from_vec(bytes).ok_or_else(|| BoothError::FontLoad {
            path: path.to_path_buf(),
            reason: "not a TrueType/OpenType font".into(),
        })?;
        log::debug!("Loaded font {} from {}", family, path.display());
        self.fonts.insert(family.to_string(), font);
        Ok(())
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.fonts.contains_key(family)
    }

    fn font(&self, family: &str) -> Result<&Font<'static>> {
        self.fonts
            .get(family)
            .ok_or_else(|| BoothError::UnknownFont(family.to_string()))
    }

    fn line_height(font: &Font<'static>, scale: Scale) -> u32 {
        let vm = font.v_metrics(scale);
        (vm.ascent.ceil() - vm.descent.floor()).ceil().max(1.0) as u32
    }

    /// Advance width of an already shaped line.
    fn advance(font: &Font<'static>, visual: &str, scale: Scale) -> u32 {
        font.layout(visual, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
            .max(0.0)
            .ceil() as u32
    }

    /// Draw `text` line by line into `canvas`, each line aligned within the block width.
    pub fn draw_multiline(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        spec: &FontSpec,
        anchor: (i32, i32),
        fill: Rgb<u8>,
        align: Align,
    ) -> Result<()> {
        let font = self.font(&spec.family)?;
        let scale = Scale::uniform(spec.size_px as f32);
        let ascent = font.v_metrics(scale).ascent.ceil();
        let line_h = Self::line_height(font, scale);

        let lines: Vec<String> = text
            .split('\n')
            .map(|line| bidi_then_shape(line, &self.reshaper))
            .collect();
        let widths: Vec<u32> = lines.iter().map(|l| Self::advance(font, l, scale)).collect();
        let block_w = widths.iter().copied().max().unwrap_or(0);

        let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
        for (i, (line, w)) in lines.iter().zip(&widths).enumerate() {
            let offset = match align {
                Align::Left => 0,
                Align::Center => (block_w - w) / 2,
                Align::Right => block_w - w,
            };
            let x = anchor.0 as f32 + offset as f32;
            let y = anchor.1 as f32 + (i as u32 * (line_h + self.line_spacing)) as f32 + ascent;
            for g in font.layout(line, scale, point(x, y)) {
                if let Some(bb) = g.pixel_bounding_box() {
                    g.draw(|gx, gy, v| {
                        let px = gx as i32 + bb.min.x;
                        let py = gy as i32 + bb.min.y;
                        if px >= 0 && py >= 0 && px < cw && py < ch {
                            let dst = canvas.get_pixel_mut(px as u32, py as u32);
                            blend(dst, fill, v);
                        }
                    });
                }
            }
        }
        Ok(())
    }
}

impl TextMeasure for FontBook {
    fn line_width(&self, text: &str, spec: &FontSpec) -> Result<u32> {
        let font = self.font(&spec.family)?;
        let visual = bidi_then_shape(text, &self.reshaper);
        Ok(Self::advance(font, &visual, Scale::uniform(spec.size_px as f32)))
    }

    /// Ink box of the block: widest line advance by the span from the first
    /// glyph top to the last glyph bottom. Text with no visible glyphs falls
    /// back to the line-box height.
    fn block_bbox(&self, text: &str, spec: &FontSpec, _anchor: (i32, i32)) -> Result<(u32, u32)> {
        let font = self.font(&spec.family)?;
        let scale = Scale::uniform(spec.size_px as f32);
        let ascent = font.v_metrics(scale).ascent.ceil();
        let line_h = Self::line_height(font, scale);

        let mut width = 0;
        let mut count = 0u32;
        let mut ink: Option<(i32, i32)> = None;
        for (i, line) in text.split('\n').enumerate() {
            let visual = bidi_then_shape(line, &self.reshaper);
            width = width.max(Self::advance(font, &visual, scale));
            count += 1;

            let baseline = (i as u32 * (line_h + self.line_spacing)) as f32 + ascent;
            for g in font.layout(&visual, scale, point(0.0, baseline)) {
                if let Some(bb) = g.pixel_bounding_box() {
                    ink = Some(match ink {
                        Some((top, bottom)) => (top.min(bb.min.y), bottom.max(bb.max.y)),
                        None => (bb.min.y, bb.max.y),
                    });
                }
            }
        }
        let height = match ink {
            Some((top, bottom)) => (bottom - top).max(0) as u32,
            None => count * line_h + count.saturating_sub(1) * self.line_spacing,
        };
        Ok((width, height))
    }
}

fn blend(dst: &mut Rgb<u8>, fill: Rgb<u8>, coverage: f32) {
    let a = coverage.clamp(0.0, 1.0);
    for c in 0..3 {
        let mixed = dst.0[c] as f32 * (1.0 - a) + fill.0[c] as f32 * a;
        dst.0[c] = mixed.round() as u8;
    }
}

/// Visual-order string: RTL runs are reversed, Arabic ones reshaped first.
fn bidi_then_shape(text: &str, reshaper: &ArabicReshaper) -> String {
    if text.is_empty() {
        return String::new();
    }
    let info = BidiInfo::new(text, None);
    let Some(para) = info.paragraphs.first() else {
        return text.to_string();
    };
    let (levels, ranges) = info.visual_runs(para, para.range.clone());

    // `levels` is per byte, not per run
    let mut out = String::new();
    for range in ranges {
        let rtl = levels.get(range.start).is_some_and(|l| l.is_rtl());
        let slice = &text[range];
        if !rtl {
            out.push_str(slice);
        } else if slice.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c)) {
            out.extend(reshaper.reshape(slice).chars().rev());
        } else {
            out.extend(slice.chars().rev());
        }
    }
    out
}
