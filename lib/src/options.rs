use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Whether registration applies to the logged-in user or to the whole machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Starts when the current user logs in. No elevation needed.
    #[default]
    User,
    /// Starts when the machine boots. Requires administrator privileges.
    System,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::System => "system",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Scope::User),
            "system" => Ok(Scope::System),
            _ => Err(Error::InvalidScope(s.to_string())),
        }
    }
}

/// Describes the program being registered.
///
/// Built once at startup and handed to [`crate::Autostart`]. The keys use the
/// same casing as launchd so an options file reads like a property list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Options {
    /// Reverse-DNS identifier, e.g. `com.acme.sync`. Names the plist, the unit
    /// file and the Windows service.
    pub label: String,
    pub vendor: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub scope: Scope,
    /// Program to register. Defaults to the running executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<PathBuf>,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr_path: Option<PathBuf>,
}

impl Options {
    pub fn new(label: impl Into<String>, vendor: impl Into<String>, name: impl Into<String>) -> Self {
        Options {
            label: label.into(),
            vendor: vendor.into(),
            name: name.into(),
            description: String::new(),
            scope: Scope::User,
            program: None,
            arguments: Vec::new(),
            stdout_path: None,
            stderr_path: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    /// Register `path` instead of the running executable, e.g. when a
    /// separate installer or CLI does the registering.
    pub fn with_program(mut self, path: impl Into<PathBuf>) -> Self {
        self.program = Some(path.into());
        self
    }

    pub fn with_stdout_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_path = Some(path.into());
        self
    }

    pub fn with_stderr_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stderr_path = Some(path.into());
        self
    }

    /// Explicit program to register. An empty path counts as unset.
    pub fn program_override(&self) -> Option<&Path> {
        non_empty(self.program.as_deref())
    }

    /// Explicit stdout log override. An empty path counts as unset.
    pub fn stdout_override(&self) -> Option<&Path> {
        non_empty(self.stdout_path.as_deref())
    }

    /// Explicit stderr log override. An empty path counts as unset.
    pub fn stderr_override(&self) -> Option<&Path> {
        non_empty(self.stderr_path.as_deref())
    }

    /// Description for mechanisms that accept one, falling back to the name.
    pub fn display_description(&self) -> &str {
        if self.description.trim().is_empty() {
            &self.name
        } else {
            &self.description
        }
    }

    /// The label, vendor and name all end up as file or directory names.
    pub fn validate(&self) -> Result<()> {
        validate_label(&self.label)?;
        validate_component("vendor", &self.vendor)?;
        validate_component("name", &self.name)
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

fn file_name_problem(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        return Some("must not be empty");
    }
    if value == "." || value == ".." {
        return Some("must not be a relative path component");
    }
    if value.contains(['/', '\\']) {
        return Some("must not contain path separators");
    }
    if value.contains(['<', '>', ':', '"', '|', '?', '*']) {
        return Some("must not contain reserved file name characters");
    }
    if value.chars().any(char::is_control) {
        return Some("must not contain control characters");
    }
    None
}

/// The label becomes a file name on every platform, so it has to be usable as one.
pub fn validate_label(label: &str) -> Result<()> {
    match file_name_problem(label) {
        Some(reason) => Err(Error::InvalidLabel {
            label: label.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Same rules as [`validate_label`] for the vendor and name, which become
/// data directory components and the Windows shortcut file name.
pub fn validate_component(field: &'static str, value: &str) -> Result<()> {
    match file_name_problem(value) {
        Some(reason) => Err(Error::InvalidName {
            field,
            value: value.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
