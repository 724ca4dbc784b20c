//! Offline strip builder: compose (and optionally print) a booth strip from
//! photos already on disk.
//!
//! Usage: booth-strip [--config FILE] [--caption TEXT] [--print] PHOTO...

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use simplebooth::strip::{load_photos, make_booth_image, save_session_images};
use simplebooth::{select_caption, BoothConfig, BoothError, CupsPrinter, Printer, Result};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    caption: Option<String>,
    print: bool,
    photos: Vec<PathBuf>,
}

fn parse_args() -> std::result::Result<Args, String> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = Some(it.next().ok_or("--config needs a file")?.into()),
            "--caption" => args.caption = Some(it.next().ok_or("--caption needs text")?),
            "--print" => args.print = true,
            "-h" | "--help" => return Err(String::new()),
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
            _ => args.photos.push(arg.into()),
        }
    }
    if args.photos.is_empty() {
        return Err("no photos given".into());
    }
    Ok(args)
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => BoothConfig::load(path)?,
        None => BoothConfig::default(),
    };
    let fonts = config.font_book()?;

    let caption = match &args.caption {
        Some(text) => text.clone(),
        None => select_caption(&config.captions[..]).ok_or(BoothError::NoCaption)?.to_string(),
    };

    let photos = load_photos(&args.photos[..])?;
    let (strip, fit) = make_booth_image(&photos, &caption, &config.footer, &config.layout, &fonts)?;
    log::info!(
        "Caption {:?} at {} px ({:?}, {}x{})",
        caption, fit.font.size_px, fit.outcome, fit.width, fit.height
    );

    let dir = args.photos[0].parent().unwrap_or(Path::new("."));
    let (strip_path, double_path) = save_session_images(dir, &strip)?;
    println!("{}", strip_path.display());
    println!("{}", double_path.display());

    if args.print {
        let printer = CupsPrinter::new(config.printer.as_str());
        if printer.is_available()? {
            printer.ensure_default()?;
            printer.print(&double_path)?;
        } else {
            log::warn!("Printer {} not available", printer.name());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {msg}");
            }
            eprintln!("usage: booth-strip [--config FILE] [--caption TEXT] [--print] PHOTO...");
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
