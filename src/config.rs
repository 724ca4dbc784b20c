//! Booth configuration, read from a JSON file. Every field is optional and
//! falls back to the values of the deployed booth.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{LINE_SPACING, NO_PRINT, QR_PX};
use crate::error::Result;
use crate::graphics::FontBook;
use crate::net::{self, ConnectivityStatus};
use crate::strip::StripLayout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontEntry {
    pub family: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothConfig {
    /// Each session gets a timestamped folder under here.
    pub image_dir: PathBuf,
    pub fonts: Vec<FontEntry>,
    pub line_spacing: u32,
    /// One is picked at random per session.
    pub captions: Vec<String>,
    pub footer: String,
    /// CUPS queue name; `"NO PRINT"` disables printing.
    pub printer: String,
    /// Fetched to decide whether uploads are possible.
    pub connectivity_url: String,
    pub connectivity_timeout_ms: u64,
    pub layout: StripLayout,
    pub qr_px: u32,
    pub ready_pause_ms: u64,
    pub countdown_step_ms: u64,
    pub qr_display_ms: u64,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("/home/pi/Pictures/booth_pics"),
            fonts: vec![FontEntry {
                family: "sans".into(),
                path: PathBuf::from("/usr/share/fonts/truetype/freefont/FreeSans.ttf"),
            }],
            line_spacing: LINE_SPACING,
            captions: vec!["Make it a GREAT day!".into(), "Seize the day!".into()],
            footer: "Scholars' Lab TinkerTank".into(),
            printer: NO_PRINT.into(),
            connectivity_url: "https://google.com".into(),
            connectivity_timeout_ms: 3000,
            layout: StripLayout::default(),
            qr_px: QR_PX,
            ready_pause_ms: 6000,
            countdown_step_ms: 1000,
            qr_display_ms: 20_000,
        }
    }
}

impl BoothConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load every configured font. A missing file is fatal.
    pub fn font_book(&self) -> Result<FontBook> {
        let mut book = FontBook::new(self.line_spacing);
        for entry in &self.fonts {
            book.load_file(&entry.family, &entry.path)?;
        }
        Ok(book)
    }

    pub fn check_connectivity(&self) -> ConnectivityStatus {
        let status = net::check_connectivity(
            &self.connectivity_url,
            Duration::from_millis(self.connectivity_timeout_ms),
        );
        log::info!("Connectivity to {}: {:?}", self.connectivity_url, status);
        status
    }
}
