//! File utilities: generated output paths and viewer hand-off.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{MergeError, Result};

/// Filesystem collaborators the merge orchestrator delegates to.
pub trait FileUtilities {
    /// Produce a uniquely named output path for the merged document.
    ///
    /// Called once, at orchestrator construction, when the caller did not
    /// supply an explicit output path.
    fn temp_output_path(&self, base_name: &str) -> Result<PathBuf>;

    /// Open the merged document in the platform viewer. Best-effort: the
    /// caller logs a failure instead of propagating it.
    fn present_document(&self, path: &Path) -> Result<()>;
}

/// [`FileUtilities`] backed by the system temp directory and the platform
/// document opener.
#[derive(Debug, Clone)]
pub struct SystemFileUtilities {
    open_viewer: bool,
}

impl SystemFileUtilities {
    pub fn new() -> Self {
        Self { open_viewer: true }
    }

    /// Variant that treats `present_document` as a no-op, for headless or
    /// scripted use.
    pub fn headless() -> Self {
        Self { open_viewer: false }
    }
}

impl Default for SystemFileUtilities {
    fn default() -> Self {
        Self::new()
    }
}

impl FileUtilities for SystemFileUtilities {
    fn temp_output_path(&self, base_name: &str) -> Result<PathBuf> {
        let temp = tempfile::Builder::new()
            .prefix(&format!("{base_name}-"))
            .suffix(".pdf")
            .tempfile()
            .map_err(|source| MergeError::FailedToCreateOutput {
                path: std::env::temp_dir().join(format!("{base_name}.pdf")),
                source,
            })?;

        // Take only the name; dropping the handle deletes the probe file,
        // so a merge that never saves leaves nothing at the output path.
        let path = temp.path().to_path_buf();
        drop(temp);

        Ok(path)
    }

    fn present_document(&self, path: &Path) -> Result<()> {
        if !self.open_viewer {
            return Ok(());
        }

        let mut command = viewer_command(path);
        command
            .spawn()
            .map_err(|err| MergeError::DisplayFailed {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
            .map(|_| ())
    }
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(target_os = "windows")]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}
