//! Windows registration: a Startup-folder shortcut for the user scope, a
//! service-manager entry for the system scope.
//!
//! Every native call goes through [`ShortcutApi`] or [`ServiceApi`]. They
//! report failures as `io::Error` carrying the raw Win32 status code.

#[cfg(windows)]
mod native;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{artifact_exists, remove_artifact, resolve_executable};
use super::{Artifact, Backend};
use crate::cmdline::join_args;
use crate::error::{fs_err, Error, Result};
use crate::Options;

#[cfg(windows)]
pub use native::{NativeServices, ShellLinks};

pub const ERROR_ACCESS_DENIED: i32 = 5;
pub const ERROR_SERVICE_DOES_NOT_EXIST: i32 = 1060;
/// Generic COM failure, reported when a call gives no status code of its own.
pub const E_FAIL: i32 = 0x8000_4005_u32 as i32;

/// Delay before the service manager restarts a crashed service.
pub const RESTART_DELAY: Duration = Duration::from_secs(60);

pub trait ShortcutApi {
    fn create_shortcut(&self, link: &Path, target: &Path, arguments: &str) -> io::Result<()>;
}

pub trait ServiceApi {
    /// Whether a service with this name is installed. A missing service is `Ok(false)`.
    fn service_exists(&self, name: &str) -> io::Result<bool>;
    fn create_service(&self, spec: &ServiceSpec) -> io::Result<()>;
    fn update_service(&self, spec: &ServiceSpec) -> io::Result<()>;
    fn set_restart_on_failure(&self, name: &str, delay: Duration) -> io::Result<()>;
    /// Delete the service. Returns `Ok(false)` when it was not installed.
    fn delete_service(&self, name: &str) -> io::Result<bool>;
}

/// An auto-start service entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub executable: PathBuf,
    pub arguments: Vec<String>,
}

fn native_err(operation: &'static str, err: io::Error) -> Error {
    match err.raw_os_error() {
        Some(ERROR_ACCESS_DENIED) => Error::Privilege {
            operation: operation.to_string(),
        },
        code => Error::NativeCall {
            operation,
            code: code.unwrap_or(E_FAIL) as u32,
        },
    }
}

/// Fold the service manager's "does not exist" status into `false`.
fn absent_as_false(result: io::Result<bool>) -> io::Result<bool> {
    match result {
        Err(e) if e.raw_os_error() == Some(ERROR_SERVICE_DOES_NOT_EXIST) => Ok(false),
        other => other,
    }
}

/// `%UserProfile%\AppData\Roaming\Microsoft\Windows\Start Menu\Programs\Startup`
pub fn startup_dir(profile: &Path) -> PathBuf {
    profile
        .join("AppData")
        .join("Roaming")
        .join("Microsoft")
        .join("Windows")
        .join("Start Menu")
        .join("Programs")
        .join("Startup")
}

/// Drop the `\\?\` prefix `canonicalize` adds, unless the path needs it.
pub fn simplify_verbatim(path: PathBuf) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path;
    };
    match text.strip_prefix(r"\\?\") {
        Some(rest) if !rest.starts_with(r"UNC\") && rest.len() < 260 => PathBuf::from(rest),
        _ => path,
    }
}

/// Registers the program through `<name>.lnk` in the user's Startup folder.
pub struct StartupShortcutBackend<A> {
    name: String,
    arguments: Vec<String>,
    dir: PathBuf,
    executable: Option<PathBuf>,
    api: A,
}

#[cfg(windows)]
impl StartupShortcutBackend<ShellLinks> {
    pub fn new(options: &Options) -> Result<Self> {
        Ok(Self::with_api(options, startup_dir(&super::home_dir()?), ShellLinks))
    }
}

impl<A: ShortcutApi> StartupShortcutBackend<A> {
    pub fn with_api(options: &Options, dir: PathBuf, api: A) -> Self {
        StartupShortcutBackend {
            name: options.name.clone(),
            arguments: options.arguments.clone(),
            dir,
            executable: options.program_override().map(Path::to_path_buf),
            api,
        }
    }

    /// Point the shortcut at `path` instead of the running executable.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    pub fn shortcut_path(&self) -> PathBuf {
        self.dir.join(format!("{}.lnk", self.name))
    }

    /// The real program behind the running executable, with symlinks
    /// followed so the shortcut never targets another link.
    fn target(&self) -> Result<PathBuf> {
        let executable = resolve_executable(self.executable.as_deref())?;
        let real = executable
            .canonicalize()
            .map_err(|e| fs_err("resolve", &executable, e))?;
        Ok(simplify_verbatim(real))
    }
}

impl<A: ShortcutApi> Backend for StartupShortcutBackend<A> {
    fn is_enabled(&self) -> Result<bool> {
        artifact_exists(&self.shortcut_path())
    }

    fn enable(&self) -> Result<()> {
        let target = self.target()?;
        std::fs::create_dir_all(&self.dir).map_err(|e| fs_err("create directory", &self.dir, e))?;

        let link = self.shortcut_path();
        if target == link {
            return Err(Error::SelfReferentialShortcut(target));
        }

        let arguments = join_args(&self.arguments);
        tracing::debug!(link = %link.display(), target = %target.display(), %arguments, "creating shortcut");
        self.api
            .create_shortcut(&link, &target, &arguments)
            .map_err(|e| native_err("creating startup shortcut", e))?;
        tracing::info!(path = %link.display(), "wrote registration artifact");
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        remove_artifact(&self.shortcut_path())?;
        Ok(())
    }

    fn artifact(&self) -> Artifact {
        Artifact::File(self.shortcut_path())
    }
}

/// Registers the program as an auto-start service named after the label.
pub struct WindowsServiceBackend<A> {
    spec: ServiceSpec,
    executable: Option<PathBuf>,
    api: A,
}

#[cfg(windows)]
impl WindowsServiceBackend<NativeServices> {
    pub fn new(options: &Options) -> Self {
        Self::with_api(options, NativeServices)
    }
}

impl<A: ServiceApi> WindowsServiceBackend<A> {
    pub fn with_api(options: &Options, api: A) -> Self {
        WindowsServiceBackend {
            spec: ServiceSpec {
                name: options.label.clone(),
                display_name: options.name.clone(),
                description: options.display_description().to_string(),
                executable: PathBuf::new(),
                arguments: options.arguments.clone(),
            },
            executable: options.program_override().map(Path::to_path_buf),
            api,
        }
    }

    /// Register `path` instead of the running executable.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }
}

impl<A: ServiceApi> Backend for WindowsServiceBackend<A> {
    fn is_enabled(&self) -> Result<bool> {
        absent_as_false(self.api.service_exists(&self.spec.name))
            .map_err(|e| native_err("opening service", e))
    }

    fn enable(&self) -> Result<()> {
        let spec = ServiceSpec {
            executable: resolve_executable(self.executable.as_deref())?,
            ..self.spec.clone()
        };

        let exists = absent_as_false(self.api.service_exists(&spec.name))
            .map_err(|e| native_err("opening service", e))?;
        if exists {
            tracing::debug!(service = %spec.name, "updating existing service");
            self.api
                .update_service(&spec)
                .map_err(|e| native_err("updating service", e))?;
        } else {
            tracing::debug!(service = %spec.name, "creating service");
            self.api
                .create_service(&spec)
                .map_err(|e| native_err("creating service", e))?;
        }

        self.api
            .set_restart_on_failure(&spec.name, RESTART_DELAY)
            .map_err(|e| native_err("setting recovery actions", e))?;
        tracing::info!(service = %spec.name, "registered service");
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        let deleted = absent_as_false(self.api.delete_service(&self.spec.name))
            .map_err(|e| native_err("deleting service", e))?;
        if deleted {
            tracing::info!(service = %self.spec.name, "deleted service");
        }
        Ok(())
    }

    fn artifact(&self) -> Artifact {
        Artifact::Service(self.spec.name.clone())
    }
}
