//! Handles for the booth's physical and remote collaborators.
//!
//! The kiosk never talks to GPIO, the camera module, the screen or a cloud
//! drive directly. A deployment constructs one implementation of each at
//! startup and hands them to [`crate::kiosk::Kiosk`].

use std::path::Path;

use image::GrayImage;

use crate::error::Result;

pub trait Camera {
    fn start_preview(&mut self) -> Result<()>;
    fn stop_preview(&mut self) -> Result<()>;
    /// Capture one still to `path`, resized to `size`.
    fn capture(&mut self, path: &Path, size: (u32, u32)) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
    /// The operator asked the booth to quit (Escape key, signal).
    Shutdown,
}

pub trait Button {
    /// Block until the next press or shutdown request.
    fn wait_for_press(&mut self) -> ButtonEvent;
}

pub trait Led {
    fn blink(&mut self);
    fn off(&mut self);
}

/// Full-screen kiosk display.
pub trait Display {
    fn show_logo(&mut self);
    fn show_message(&mut self, text: &str);
    fn show_countdown(&mut self, remaining: u32);
    fn show_qr(&mut self, qr: &GrayImage, text: &str);
    fn clear(&mut self);
}

/// Cloud storage for finished strips.
pub trait Uploader {
    /// Upload `path` and return a link guests can download it from.
    fn upload(&mut self, path: &Path) -> Result<String>;
}

/// The fixed set of handles a kiosk drives.
pub struct Devices {
    pub camera: Box<dyn Camera>,
    pub button: Box<dyn Button>,
    pub led: Box<dyn Led>,
    pub display: Box<dyn Display>,
}
