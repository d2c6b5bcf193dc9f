pub mod linux;
pub mod macos;
pub mod windows;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{fs_err, Error, Result};
use crate::Options;

/// The capability set every platform implements.
///
/// The registration artifact (a file or a service entry) is the only state;
/// every call re-reads it from disk or from the service manager.
pub trait Backend {
    /// Whether the artifact exists. Linux additionally requires the unit to
    /// report a healthy status. Never mutates anything.
    fn is_enabled(&self) -> Result<bool>;

    /// Create or overwrite the artifact so the program runs at next login or boot.
    fn enable(&self) -> Result<()>;

    /// Remove the artifact. Succeeds when nothing is registered.
    fn disable(&self) -> Result<()>;

    /// Where the artifact lives.
    fn artifact(&self) -> Artifact;
}

/// Location of a registration artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    File(PathBuf),
    Service(String),
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::File(path) => write!(f, "{}", path.display()),
            Artifact::Service(name) => write!(f, "service {name}"),
        }
    }
}

/// The backend for the platform this crate was compiled for.
#[cfg(target_os = "macos")]
pub(crate) fn native(options: &Options) -> Result<Box<dyn Backend>> {
    Ok(Box::new(macos::LaunchAgentBackend::new(options)?))
}

#[cfg(windows)]
pub(crate) fn native(options: &Options) -> Result<Box<dyn Backend>> {
    match options.scope {
        crate::Scope::User => Ok(Box::new(windows::StartupShortcutBackend::new(options)?)),
        crate::Scope::System => Ok(Box::new(windows::WindowsServiceBackend::new(options))),
    }
}

#[cfg(not(any(target_os = "macos", windows)))]
pub(crate) fn native(options: &Options) -> Result<Box<dyn Backend>> {
    Ok(Box::new(linux::SystemdBackend::new(options)?))
}

pub(crate) fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(Error::MissingDirectory("home"))
}

pub(crate) fn resolve_executable(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => std::env::current_exe().map_err(Error::Executable),
    }
}

pub(crate) fn artifact_exists(path: &Path) -> Result<bool> {
    path.try_exists()
        .map_err(|e| fs_err("check for", path, e))
}

/// Create the parent directory if needed and replace the file's contents.
pub(crate) fn write_artifact(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| fs_err("create directory", parent, e))?;
    }
    fs::write(path, content).map_err(|e| fs_err("write", path, e))?;
    tracing::info!(path = %path.display(), "wrote registration artifact");
    Ok(())
}

/// Remove the file if it exists. Returns whether anything was removed.
pub(crate) fn remove_artifact(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "removed registration artifact");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(fs_err("remove", path, e)),
    }
}
