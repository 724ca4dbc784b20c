//! Photobooth strip builder and kiosk workflow.
//! - Fits a caption into a height band by stepping the font size and re-wrapping
//! - Measures and draws text with rusttype (bidi + Arabic shaping for RTL captions)
//! - Composes three photos, caption and footer into a 1200x3600 strip, plus a 2-up print sheet
//! - Prints through CUPS and shows a QR code for the uploaded strip when online
//! - Hardware (camera, button, LED, screen) and cloud upload are traits supplied by the deployment

pub mod caption;
pub mod config;
pub mod consts;
pub mod error;
pub mod fit;
pub mod graphics;
pub mod hardware;
pub mod kiosk;
pub mod net;
pub mod printer;
pub mod qr;
pub mod strip;
pub mod wrap;

pub use caption::select_caption;
pub use config::BoothConfig;
pub use error::{BoothError, Result};
pub use fit::{fit_caption, FitBox, FitOutcome, FitParams, FitResult};
pub use graphics::{Align, FontBook, FontSpec, TextMeasure};
pub use kiosk::{Kiosk, SessionReport};
pub use net::ConnectivityStatus;
pub use printer::{CupsPrinter, Printer};
pub use wrap::{find_wrap_width, word_wrap};
