//! Platform-conventional data directories.
//!
//! Nothing here touches the filesystem; callers create directories lazily
//! when they first write into them.

use std::path::{Path, PathBuf};

use crate::Scope;

/// Directory conventions of one operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    MacOs,
    Linux,
    Windows,
}

/// Base directories the layouts are resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseDirs {
    pub home: Option<PathBuf>,
    /// Roaming `%AppData%` on Windows.
    pub app_data: Option<PathBuf>,
    /// `%ProgramData%` on Windows.
    pub program_data: Option<PathBuf>,
}

impl BaseDirs {
    pub fn from_env() -> Self {
        BaseDirs {
            home: dirs::home_dir(),
            app_data: if cfg!(windows) { dirs::data_dir() } else { None },
            program_data: std::env::var_os("ProgramData")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

impl Layout {
    /// The layout of the platform this crate was compiled for.
    pub const fn current() -> Layout {
        if cfg!(target_os = "macos") {
            Layout::MacOs
        } else if cfg!(windows) {
            Layout::Windows
        } else {
            Layout::Linux
        }
    }

    /// Name of the log subdirectory inside a data directory.
    pub const fn logs_dir_name(self) -> &'static str {
        match self {
            Layout::Linux => "logs",
            Layout::MacOs | Layout::Windows => "Logs",
        }
    }

    pub fn data_dir(
        self,
        scope: Scope,
        vendor: &str,
        product: &str,
        base: &BaseDirs,
    ) -> Option<PathBuf> {
        let root = match (self, scope) {
            (Layout::MacOs, Scope::System) => PathBuf::from("/Library/Application Support"),
            (Layout::MacOs, Scope::User) => base
                .home
                .as_deref()?
                .join("Library")
                .join("Application Support"),
            (Layout::Linux, Scope::System) => PathBuf::from("/etc"),
            (Layout::Linux, Scope::User) => base.home.as_deref()?.join(".local").join("share"),
            (Layout::Windows, Scope::System) => base.program_data.clone()?,
            (Layout::Windows, Scope::User) => base.app_data.clone()?,
        };
        Some(root.join(vendor).join(product))
    }
}

/// Data directory for `vendor`/`product` on the current platform.
pub fn data_dir(scope: Scope, vendor: &str, product: &str) -> Option<PathBuf> {
    Layout::current().data_dir(scope, vendor, product, &BaseDirs::from_env())
}

/// Log file location: the override when set, else `<data dir>/<logs>/<file_name>`.
pub fn log_path(
    layout: Layout,
    explicit: Option<&Path>,
    data_dir: Option<&Path>,
    file_name: &str,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    data_dir.map(|dir| dir.join(layout.logs_dir_name()).join(file_name))
}
