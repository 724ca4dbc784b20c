// Strip layout and booth tuning constants (pixels unless noted)
pub const STRIP_W: u32 = 1200;
pub const STRIP_H: u32 = 3600;

pub const PHOTO_W: u32 = 1120;
pub const PHOTO_H: u32 = 840;
pub const PHOTO_X: u32 = 40;
pub const PHOTO_Y: u32 = 40;
pub const PHOTO_STEP: u32 = 880;     // top of one photo to the top of the next
pub const PHOTO_COUNT: usize = 3;

pub const CAPTION_ANCHOR: (i32, i32) = (40, 2680);
pub const CAPTION_MIN_H: u32 = 630;
pub const CAPTION_MAX_H: u32 = 680;
pub const CAPTION_LINE_PX: u32 = 1100; // wrap budget per line
pub const CAPTION_MAX_W: u32 = 1050;   // escape ceiling, stricter than the wrap budget
pub const CAPTION_RGB: [u8; 3] = [35, 45, 75];

pub const FIT_INITIAL_PX: u32 = 180;
pub const FIT_STEP_PX: u32 = 10;
pub const FIT_MAX_ITERATIONS: u32 = 50;

pub const FOOTER_ANCHOR: (i32, i32) = (40, 3420);
pub const FOOTER_PX: u32 = 90;
pub const FOOTER_RGB: [u8; 3] = [248, 76, 30];

pub const LINE_SPACING: u32 = 20;

pub const STRIP_BG: [u8; 3] = [255, 255, 255];
pub const DOUBLE_BG: [u8; 3] = [250, 250, 250];

pub const QR_PX: u32 = 512;

pub const COUNTDOWN_FROM: u32 = 3;

/// Printer name that disables printing entirely.
pub const NO_PRINT: &str = "NO PRINT";
