//! Register the running program to start at login or boot.
//!
//! One [`Autostart`] per program: launchd agents on macOS, systemd units on
//! Linux, Startup-folder shortcuts or services on Windows.
//!
//! ```no_run
//! use autostart::{Autostart, Options, Scope};
//!
//! let options = Options::new("com.acme.sync", "Acme", "Sync")
//!     .with_scope(Scope::User)
//!     .with_arguments(["--quiet"]);
//! let autostart = Autostart::new(options)?;
//! if !autostart.is_enabled()? {
//!     autostart.enable()?;
//! }
//! # Ok::<(), autostart::Error>(())
//! ```

pub mod appdata;
pub mod cmdline;
pub mod error;
pub mod options;
pub mod platform;
pub mod plist;
pub mod stdio;
pub mod systemd;

use std::path::PathBuf;

use crate::appdata::Layout;

pub use crate::error::{Error, Result};
pub use crate::options::{Options, Scope};
pub use crate::platform::{Artifact, Backend};
pub use crate::stdio::TeeWriter;

const STDOUT_LOG: &str = "stdout.log";
const STDERR_LOG: &str = "stderr.err";

pub struct Autostart {
    options: Options,
    backend: Box<dyn Backend>,
}

impl Autostart {
    /// Validate `options` and pick the backend for this platform and scope.
    pub fn new(options: Options) -> Result<Self> {
        options.validate()?;
        let backend = platform::native(&options)?;
        Ok(Autostart { options, backend })
    }

    /// Use `backend` instead of the platform's own.
    pub fn with_backend(options: Options, backend: Box<dyn Backend>) -> Result<Self> {
        options.validate()?;
        Ok(Autostart { options, backend })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn is_enabled(&self) -> Result<bool> {
        self.backend.is_enabled()
    }

    pub fn enable(&self) -> Result<()> {
        tracing::debug!(label = %self.options.label, scope = %self.options.scope, "enabling autostart");
        self.backend.enable()
    }

    pub fn disable(&self) -> Result<()> {
        tracing::debug!(label = %self.options.label, scope = %self.options.scope, "disabling autostart");
        self.backend.disable()
    }

    pub fn artifact(&self) -> Artifact {
        self.backend.artifact()
    }

    pub fn data_dir(&self) -> Option<PathBuf> {
        appdata::data_dir(self.options.scope, &self.options.vendor, &self.options.name)
    }

    pub fn stdout_path(&self) -> Option<PathBuf> {
        appdata::log_path(
            Layout::current(),
            self.options.stdout_override(),
            self.data_dir().as_deref(),
            STDOUT_LOG,
        )
    }

    pub fn stderr_path(&self) -> Option<PathBuf> {
        appdata::log_path(
            Layout::current(),
            self.options.stderr_override(),
            self.data_dir().as_deref(),
            STDERR_LOG,
        )
    }

    /// Send the process's stdout and stderr to the log files.
    ///
    /// This changes process-global state and works once per process; later
    /// calls return [`Error::AlreadyRedirected`]. Write through the returned
    /// [`TeeWriter`] to also reach the original console.
    pub fn redirect_stdio(&self) -> Result<TeeWriter> {
        stdio::redirect(self.stdout_path().as_deref(), self.stderr_path().as_deref())
    }
}
