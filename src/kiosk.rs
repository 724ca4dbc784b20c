//! The photo session workflow: idle screen, countdown and capture, strip
//! composition, then print and upload.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::Local;

use crate::caption::select_caption;
use crate::config::BoothConfig;
use crate::consts::COUNTDOWN_FROM;
use crate::error::{BoothError, Result};
use crate::fit::FitResult;
use crate::graphics::FontBook;
use crate::hardware::{ButtonEvent, Devices, Uploader};
use crate::net::ConnectivityStatus;
use crate::printer::Printer;
use crate::qr;
use crate::strip::{load_photos, make_booth_image, save_session_images};

const IDLE_TEXT: &str = "Press the button to take pictures!";
const READY_TEXT: &str = "Get ready to take 3 pictures.";
const READY_QR_TEXT: &str =
    "Get ready to take 3 pictures. Then scan the QR code to download the image.";
const WAIT_TEXT: &str = "Please wait while pictures are created.";
const QR_TEXT: &str = "While your photo is printing, scan this code to download your image!";
const QR_FILE: &str = "qrimage.png";

/// What one session produced.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub folder: PathBuf,
    pub photos: Vec<PathBuf>,
    pub caption: String,
    pub fit: FitResult,
    pub strip: PathBuf,
    pub double: PathBuf,
    pub printed: bool,
    pub download_url: Option<String>,
}

pub struct Kiosk {
    config: BoothConfig,
    fonts: FontBook,
    devices: Devices,
    printer: Option<Box<dyn Printer>>,
    uploader: Option<Box<dyn Uploader>>,
    connectivity: ConnectivityStatus,
}

impl Kiosk {
    pub fn new(
        config: BoothConfig,
        fonts: FontBook,
        devices: Devices,
        connectivity: ConnectivityStatus,
    ) -> Self {
        Self {
            config,
            fonts,
            devices,
            printer: None,
            uploader: None,
            connectivity,
        }
    }

    pub fn with_printer(mut self, printer: Box<dyn Printer>) -> Self {
        self.printer = Some(printer);
        self
    }

    pub fn with_uploader(mut self, uploader: Box<dyn Uploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn connectivity(&self) -> ConnectivityStatus {
        self.connectivity
    }

    pub fn refresh_connectivity(&mut self) -> ConnectivityStatus {
        self.connectivity = self.config.check_connectivity();
        self.connectivity
    }

    fn can_upload(&self) -> bool {
        self.connectivity.is_reachable() && self.uploader.is_some()
    }

    fn pause(ms: u64) {
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms));
        }
    }

    pub fn show_idle(&mut self) {
        self.devices.led.blink();
        self.devices.display.show_logo();
        self.devices.display.show_message(IDLE_TEXT);
    }

    /// Idle until pressed, run a session, repeat. Returns on shutdown.
    pub fn run(&mut self) -> Result<()> {
        fs::create_dir_all(&self.config.image_dir)?;
        loop {
            self.show_idle();
            if self.devices.button.wait_for_press() == ButtonEvent::Shutdown {
                log::info!("Shutdown requested");
                self.devices.led.off();
                return Ok(());
            }
            match self.run_session() {
                Ok(report) => log::info!("Session done in {}", report.folder.display()),
                Err(e) => log::error!("Session failed: {}", e),
            }
        }
    }

    pub fn run_session(&mut self) -> Result<SessionReport> {
        self.devices.led.off();
        let online = self.can_upload();
        self.devices
            .display
            .show_message(if online { READY_QR_TEXT } else { READY_TEXT });
        Self::pause(self.config.ready_pause_ms);
        self.devices.display.clear();

        let stamp = Local::now().format("%Y-%m-%d-%H-%M-%S").to_string();
        let (folder, stamp) = session_folder(&self.config.image_dir, &stamp)?;
        log::info!("Starting session {}", stamp);

        self.devices.camera.start_preview()?;
        let captured = self.capture_all(&folder, &stamp);
        let stopped = self.devices.camera.stop_preview();
        let photos = captured?;
        stopped?;

        self.devices.display.show_logo();
        self.devices.display.show_message(WAIT_TEXT);

        let caption = select_caption(&self.config.captions[..])
            .ok_or(BoothError::NoCaption)?
            .to_string();
        let images = load_photos(&photos[..])?;
        let (strip, fit) = make_booth_image(
            &images,
            &caption,
            &self.config.footer,
            &self.config.layout,
            &self.fonts,
        )?;
        let (strip_path, double_path) = save_session_images(&folder, &strip)?;

        let printed = self.print(&double_path);
        let download_url = if online { self.share(&strip_path, &folder) } else { None };

        Ok(SessionReport {
            folder,
            photos,
            caption,
            fit,
            strip: strip_path,
            double: double_path,
            printed,
            download_url,
        })
    }

    fn capture_all(&mut self, folder: &Path, stamp: &str) -> Result<Vec<PathBuf>> {
        let size = self.config.layout.photo_size;
        let mut photos = Vec::with_capacity(self.config.layout.photo_count);
        for i in 1..=self.config.layout.photo_count {
            for n in (1..=COUNTDOWN_FROM).rev() {
                self.devices.display.show_countdown(n);
                Self::pause(self.config.countdown_step_ms);
            }
            self.devices.display.clear();
            let path = folder.join(format!("{stamp}_{i}.jpg"));
            self.devices.camera.capture(&path, size)?;
            log::debug!("Captured {}", path.display());
            photos.push(path);
        }
        Ok(photos)
    }

    fn print(&self, image: &Path) -> bool {
        let Some(printer) = &self.printer else {
            return false;
        };
        match printer.is_available() {
            Ok(true) => {}
            Ok(false) => {
                log::info!("Printer not attached, skipping print");
                return false;
            }
            Err(e) => {
                log::warn!("Printer check failed: {}", e);
                return false;
            }
        }
        match printer.print(image) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Print failed: {}", e);
                false
            }
        }
    }

    /// Upload the strip and show its QR code. `None` if anything fails.
    fn share(&mut self, strip: &Path, folder: &Path) -> Option<String> {
        let uploader = self.uploader.as_mut()?;
        let url = match uploader.upload(strip) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Upload failed: {}", e);
                return None;
            }
        };
        log::info!("Uploaded {} to {}", strip.display(), url);

        match qr::save_qr(&url, self.config.qr_px, &folder.join(QR_FILE)) {
            Ok(code) => {
                self.devices.display.show_qr(&code, QR_TEXT);
                Self::pause(self.config.qr_display_ms);
                self.devices.display.clear();
            }
            Err(e) => log::warn!("QR image failed: {}", e),
        }
        Some(url)
    }
}

/// Create a fresh folder for a session under `base`. A second session in the
/// same second gets `-2`, `-3`, ... appended rather than sharing the folder.
fn session_folder(base: &Path, stamp: &str) -> Result<(PathBuf, String)> {
    fs::create_dir_all(base)?;
    let mut n = 1;
    loop {
        let name = if n == 1 { stamp.to_string() } else { format!("{stamp}-{n}") };
        let folder = base.join(&name);
        match fs::create_dir(&folder) {
            Ok(()) => return Ok((folder, name)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use image::{GrayImage, Rgb, RgbImage};

    use crate::config::FontEntry;
    use crate::hardware::{Button, Camera, Display, Led};
    use crate::net::test_support::serve_once;

    const DEJAVU: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

    type Log = Rc<RefCell<Vec<String>>>;

    struct FakeCamera {
        log: Log,
        fail_on: Option<usize>,
        shots: usize,
    }

    impl Camera for FakeCamera {
        fn start_preview(&mut self) -> Result<()> {
            self.log.borrow_mut().push("preview on".into());
            Ok(())
        }
        fn stop_preview(&mut self) -> Result<()> {
            self.log.borrow_mut().push("preview off".into());
            Ok(())
        }
        fn capture(&mut self, path: &Path, size: (u32, u32)) -> Result<()> {
            self.shots += 1;
            if self.fail_on == Some(self.shots) {
                return Err(BoothError::Camera("sensor timeout".into()));
            }
            RgbImage::from_pixel(size.0, size.1, Rgb([40, 90, 160])).save(path)?;
            self.log.borrow_mut().push(format!("capture {}", self.shots));
            Ok(())
        }
    }

    struct FakeButton(VecDeque<ButtonEvent>);

    impl Button for FakeButton {
        fn wait_for_press(&mut self) -> ButtonEvent {
            self.0.pop_front().unwrap_or(ButtonEvent::Shutdown)
        }
    }

    struct FakeLed(Log);

    impl Led for FakeLed {
        fn blink(&mut self) {
            self.0.borrow_mut().push("led blink".into());
        }
        fn off(&mut self) {
            self.0.borrow_mut().push("led off".into());
        }
    }

    struct FakeDisplay(Log);

    impl Display for FakeDisplay {
        fn show_logo(&mut self) {}
        fn show_message(&mut self, text: &str) {
            self.0.borrow_mut().push(format!("say {text}"));
        }
        fn show_countdown(&mut self, remaining: u32) {
            self.0.borrow_mut().push(format!("count {remaining}"));
        }
        fn show_qr(&mut self, qr: &GrayImage, _text: &str) {
            self.0.borrow_mut().push(format!("qr {}", qr.width()));
        }
        fn clear(&mut self) {}
    }

    struct FakePrinter {
        attached: bool,
        jobs: Rc<RefCell<Vec<PathBuf>>>,
    }

    impl Printer for FakePrinter {
        fn is_available(&self) -> Result<bool> {
            Ok(self.attached)
        }
        fn print(&self, image: &Path) -> Result<()> {
            self.jobs.borrow_mut().push(image.to_path_buf());
            Ok(())
        }
    }

    struct FakeUploader {
        fail: bool,
    }

    impl Uploader for FakeUploader {
        fn upload(&mut self, path: &Path) -> Result<String> {
            if self.fail {
                return Err(BoothError::Upload("quota exceeded".into()));
            }
            let name = path.file_name().unwrap().to_string_lossy();
            Ok(format!("https://drive.example.com/{name}"))
        }
    }

    struct Rig {
        kiosk: Kiosk,
        log: Log,
        jobs: Rc<RefCell<Vec<PathBuf>>>,
        _dir: tempfile::TempDir,
    }

    fn rig(
        status: ConnectivityStatus,
        presses: &[ButtonEvent],
        fail_on: Option<usize>,
    ) -> Option<Rig> {
        if !Path::new(DEJAVU).exists() {
            return None;
        }
        let dir = tempfile::tempdir().unwrap();
        let config = BoothConfig {
            image_dir: dir.path().join("booth_pics"),
            fonts: vec![FontEntry { family: "sans".into(), path: DEJAVU.into() }],
            captions: vec!["Seize the day!".into()],
            ready_pause_ms: 0,
            countdown_step_ms: 0,
            qr_display_ms: 0,
            ..BoothConfig::default()
        };
        let fonts = config.font_book().unwrap();
        let log: Log = Rc::default();
        let jobs = Rc::new(RefCell::new(Vec::new()));
        let devices = Devices {
            camera: Box::new(FakeCamera { log: log.clone(), fail_on, shots: 0 }),
            button: Box::new(FakeButton(presses.iter().copied().collect())),
            led: Box::new(FakeLed(log.clone())),
            display: Box::new(FakeDisplay(log.clone())),
        };
        let kiosk = Kiosk::new(config, fonts, devices, status)
            .with_printer(Box::new(FakePrinter { attached: true, jobs: jobs.clone() }));
        Some(Rig { kiosk, log, jobs, _dir: dir })
    }

    #[test]
    fn offline_session_prints_without_qr() {
        let Some(mut rig) = rig(ConnectivityStatus::Unreachable, &[], None) else { return };
        rig.kiosk = rig.kiosk.with_uploader(Box::new(FakeUploader { fail: false }));
        let report = rig.kiosk.run_session().unwrap();

        assert_eq!(report.photos.len(), 3);
        assert!(report.photos.iter().all(|p| p.exists()));
        assert!(report.strip.exists() && report.double.exists());
        assert_eq!(report.caption, "Seize the day!");
        assert!(report.printed);
        assert_eq!(rig.jobs.borrow().as_slice(), &[report.double.clone()]);
        assert_eq!(report.download_url, None);

        let log = rig.log.borrow();
        assert!(log.contains(&format!("say {READY_TEXT}")));
        assert!(!log.iter().any(|l| l.starts_with("qr ")));
        assert_eq!(log.iter().filter(|l| l.as_str() == "count 1").count(), 3);
    }

    #[test]
    fn online_session_uploads_and_shows_qr() {
        let Some(mut rig) = rig(ConnectivityStatus::Reachable, &[], None) else { return };
        rig.kiosk = rig.kiosk.with_uploader(Box::new(FakeUploader { fail: false }));
        let report = rig.kiosk.run_session().unwrap();

        assert_eq!(
            report.download_url.as_deref(),
            Some("https://drive.example.com/booth_image.jpg")
        );
        assert!(report.folder.join(QR_FILE).exists());
        let log = rig.log.borrow();
        assert!(log.contains(&format!("say {READY_QR_TEXT}")));
        assert!(log.iter().any(|l| l.starts_with("qr ")));
    }

    #[test]
    fn failed_upload_still_completes_session() {
        let Some(mut rig) = rig(ConnectivityStatus::Reachable, &[], None) else { return };
        rig.kiosk = rig.kiosk.with_uploader(Box::new(FakeUploader { fail: true }));
        let report = rig.kiosk.run_session().unwrap();
        assert!(report.printed);
        assert_eq!(report.download_url, None);
    }

    #[test]
    fn reachable_without_uploader_skips_qr_prompt() {
        let Some(mut rig) = rig(ConnectivityStatus::Reachable, &[], None) else { return };
        let report = rig.kiosk.run_session().unwrap();
        assert_eq!(report.download_url, None);
        assert!(rig.log.borrow().contains(&format!("say {READY_TEXT}")));
    }

    #[test]
    fn regained_connectivity_turns_on_qr_prompt() {
        let Some(mut rig) = rig(ConnectivityStatus::Unreachable, &[], None) else { return };
        rig.kiosk = rig.kiosk.with_uploader(Box::new(FakeUploader { fail: false }));
        rig.kiosk.config.connectivity_url = serve_once("200 OK");
        rig.kiosk.config.connectivity_timeout_ms = 2000;

        assert_eq!(rig.kiosk.refresh_connectivity(), ConnectivityStatus::Reachable);
        assert!(rig.kiosk.connectivity().is_reachable());
        let report = rig.kiosk.run_session().unwrap();
        assert!(report.download_url.is_some());
        assert!(rig.log.borrow().contains(&format!("say {READY_QR_TEXT}")));
    }

    #[test]
    fn lost_connectivity_falls_back_to_plain_prompt() {
        let Some(mut rig) = rig(ConnectivityStatus::Reachable, &[], None) else { return };
        rig.kiosk = rig.kiosk.with_uploader(Box::new(FakeUploader { fail: false }));
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        rig.kiosk.config.connectivity_url = format!("http://127.0.0.1:{port}/");

        assert_eq!(rig.kiosk.refresh_connectivity(), ConnectivityStatus::Unreachable);
        let report = rig.kiosk.run_session().unwrap();
        assert_eq!(report.download_url, None);
        let log = rig.log.borrow();
        assert!(log.contains(&format!("say {READY_TEXT}")));
        assert!(!log.contains(&format!("say {READY_QR_TEXT}")));
    }

    #[test]
    fn back_to_back_sessions_get_separate_folders() {
        let Some(mut rig) = rig(ConnectivityStatus::Unreachable, &[], None) else { return };
        let first = rig.kiosk.run_session().unwrap();
        let second = rig.kiosk.run_session().unwrap();
        assert_ne!(first.folder, second.folder);
        assert!(first.photos.iter().chain(&second.photos).all(|p| p.exists()));
        assert!(first.strip.exists() && second.strip.exists());
    }

    #[test]
    fn taken_folder_gets_a_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let stamp = "2024-05-01-10-00-00";
        fs::create_dir(dir.path().join(stamp)).unwrap();
        fs::write(dir.path().join(stamp).join("keep.jpg"), b"x").unwrap();

        let (folder, name) = session_folder(dir.path(), stamp).unwrap();
        assert_eq!(name, format!("{stamp}-2"));
        assert_eq!(folder, dir.path().join(&name));
        assert!(fs::read_dir(&folder).unwrap().next().is_none());

        let (_, third) = session_folder(dir.path(), stamp).unwrap();
        assert_eq!(third, format!("{stamp}-3"));
    }

    #[test]
    fn camera_failure_aborts_and_stops_preview() {
        let Some(mut rig) = rig(ConnectivityStatus::Unreachable, &[], Some(2)) else { return };
        let err = rig.kiosk.run_session().unwrap_err();
        assert!(matches!(err, BoothError::Camera(_)));
        assert_eq!(rig.log.borrow().last().map(String::as_str), Some("preview off"));
        assert!(rig.jobs.borrow().is_empty());
    }

    #[test]
    fn run_loops_until_shutdown() {
        let presses = [ButtonEvent::Pressed, ButtonEvent::Pressed, ButtonEvent::Shutdown];
        let Some(mut rig) = rig(ConnectivityStatus::Unreachable, &presses, Some(2)) else { return };
        // first session fails on the second shot, the second one succeeds
        rig.kiosk.run().unwrap();
        assert_eq!(rig.jobs.borrow().len(), 1);
        let log = rig.log.borrow();
        assert_eq!(log.iter().filter(|l| l.as_str() == "led blink").count(), 3);
        assert_eq!(log.last().map(String::as_str), Some("led off"));
    }
}
