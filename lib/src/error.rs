use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Error surface shared by every autostart backend.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid scope '{0}', expected 'user' or 'system'")]
    InvalidScope(String),

    #[error("invalid label '{label}': {reason}")]
    InvalidLabel { label: String, reason: &'static str },

    #[error("invalid {field} '{value}': {reason}")]
    InvalidName {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("failed to {action} {path}: {source}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to resolve the current executable: {0}")]
    Executable(#[source] io::Error),

    #[error("cannot determine the {0} directory")]
    MissingDirectory(&'static str),

    #[error("failed to render {artifact}: {reason}")]
    Template {
        artifact: &'static str,
        reason: String,
    },

    #[error("failed to execute `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` failed ({status}): {stderr}")]
    Subprocess {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{operation} failed with error code 0x{code:08x}")]
    NativeCall { operation: &'static str, code: u32 },

    #[error("{operation} requires administrator privileges")]
    Privilege { operation: String },

    #[error("standard streams have already been redirected")]
    AlreadyRedirected,

    #[error("executable {0} is the startup shortcut itself")]
    SelfReferentialShortcut(PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) fn fs_err(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Error {
    Error::Filesystem {
        action,
        path: path.into(),
        source,
    }
}
