use std::path::Path;
use std::process::{Command, Output};

use crate::consts::NO_PRINT;
use crate::error::{BoothError, Result};

/// Something that can put a finished strip on paper.
pub trait Printer {
    fn is_available(&self) -> Result<bool>;
    fn print(&self, image: &Path) -> Result<()>;
}

/// CUPS queue driven through `lpstat`, `lpoptions` and `lp`.
#[derive(Debug, Clone)]
pub struct CupsPrinter {
    name: String,
}

impl CupsPrinter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn disabled(&self) -> bool {
        self.name.is_empty() || self.name == NO_PRINT
    }

    /// Make this queue the CUPS default if it is not already.
    pub fn ensure_default(&self) -> Result<()> {
        if self.disabled() {
            return Ok(());
        }
        let current = run("lpstat", &["-d"])?;
        if !String::from_utf8_lossy(&current.stdout).contains(&self.name) {
            log::info!("Setting default printer to {}", self.name);
            check(run("lpoptions", &["-d", self.name.as_str()])?, "lpoptions")?;
        }
        Ok(())
    }
}

impl Printer for CupsPrinter {
    fn is_available(&self) -> Result<bool> {
        if self.disabled() {
            return Ok(false);
        }
        let attached = run("lpstat", &["-p"])?;
        Ok(String::from_utf8_lossy(&attached.stdout).contains(&self.name))
    }

    fn print(&self, image: &Path) -> Result<()> {
        let path = image.to_string_lossy();
        let out = run("lp", &["-d", self.name.as_str(), &*path])?;
        check(out, "lp")?;
        log::info!("Sent {} to {}", image.display(), self.name);
        Ok(())
    }
}

fn run(program: &str, args: &[&str]) -> Result<Output> {
    Command::new(program)
        .args(args)
        .output()
        .map_err(|e| BoothError::Printer(format!("{program} failed to start: {e}")))
}

fn check(out: Output, program: &str) -> Result<()> {
    if out.status.success() {
        Ok(())
    } else {
        Err(BoothError::Printer(format!(
            "{program} exited with {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )))
    }
}
