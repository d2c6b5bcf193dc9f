mod disable;
mod enable;
mod generate;
mod paths;
mod status;

pub use disable::Disable;
pub use enable::Enable;
pub use generate::Generate;
pub use paths::Paths;
pub use status::Status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use autostart::{Autostart, Options, Scope};

/// Identifies the program every subcommand acts on.
#[derive(Debug, Args)]
pub struct Target {
    /// Read the program description from a property-list file
    #[arg(long, global = true, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Reverse-DNS label, e.g. com.acme.sync
    #[arg(long, global = true, env = "AUTOSTART_LABEL")]
    pub label: Option<String>,

    #[arg(long, global = true, env = "AUTOSTART_VENDOR")]
    pub vendor: Option<String>,

    #[arg(long, global = true, env = "AUTOSTART_NAME")]
    pub name: Option<String>,

    #[arg(long, global = true, env = "AUTOSTART_DESCRIPTION")]
    pub description: Option<String>,

    /// Program to register instead of this executable
    #[arg(long, global = true, value_name = "PATH")]
    pub program: Option<PathBuf>,

    /// user or system
    #[arg(long, global = true, env = "AUTOSTART_SCOPE")]
    pub scope: Option<Scope>,

    /// Write stdout here instead of the data directory's log folder
    #[arg(long, global = true, value_name = "FILE")]
    pub stdout_log: Option<PathBuf>,

    /// Write stderr here instead of the data directory's log folder
    #[arg(long, global = true, value_name = "FILE")]
    pub stderr_log: Option<PathBuf>,
}

impl Target {
    /// Flags win over the options file. Non-empty `arguments` replace the file's.
    pub fn options(&self, arguments: &[String]) -> Result<Options> {
        let mut options = match &self.options {
            Some(path) => plist::from_file::<_, Options>(path)
                .with_context(|| format!("Failed to read options from {}", path.display()))?,
            None => Options::new(
                self.label.clone().context("--label is required (or set AUTOSTART_LABEL)")?,
                self.vendor.clone().context("--vendor is required (or set AUTOSTART_VENDOR)")?,
                self.name.clone().context("--name is required (or set AUTOSTART_NAME)")?,
            ),
        };

        if self.options.is_some() {
            if let Some(label) = &self.label {
                options.label = label.clone();
            }
            if let Some(vendor) = &self.vendor {
                options.vendor = vendor.clone();
            }
            if let Some(name) = &self.name {
                options.name = name.clone();
            }
        }
        if let Some(description) = &self.description {
            options.description = description.clone();
        }
        if let Some(scope) = self.scope {
            options.scope = scope;
        }
        if let Some(program) = &self.program {
            let program = std::path::absolute(program)
                .with_context(|| format!("Failed to resolve {}", program.display()))?;
            options.program = Some(program);
        }
        if let Some(path) = &self.stdout_log {
            options.stdout_path = Some(path.clone());
        }
        if let Some(path) = &self.stderr_log {
            options.stderr_path = Some(path.clone());
        }
        if !arguments.is_empty() {
            options.arguments = arguments.to_vec();
        }
        tracing::debug!(label = %options.label, scope = %options.scope, "resolved options");
        Ok(options)
    }

    pub fn autostart(&self, arguments: &[String]) -> Result<Autostart> {
        let options = self.options(arguments)?;
        Ok(Autostart::new(options)?)
    }
}
