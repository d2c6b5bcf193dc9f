use anyhow::{bail, Result};
use clap::{Args, ValueEnum};

use autostart::platform::linux::SystemdBackend;
use autostart::platform::macos::LaunchAgentBackend;

use super::Target;

#[derive(Debug, Clone, ValueEnum)]
pub enum Format {
    /// Generate native format for current platform
    Native,
    /// Generate a launchd property list
    Launchd,
    /// Generate a systemd service file
    Systemd,
}

impl Format {
    fn resolve(&self) -> Result<Format> {
        match self {
            Format::Native if cfg!(target_os = "macos") => Ok(Format::Launchd),
            Format::Native if cfg!(windows) => {
                bail!("Windows registrations are shortcuts or services, not text files")
            }
            Format::Native => Ok(Format::Systemd),
            other => Ok(other.clone()),
        }
    }
}

#[derive(Debug, Args)]
pub struct Generate {
    #[arg(long, default_value = "native", help = "Output format")]
    format: Format,

    /// Arguments passed to the program when it starts
    #[arg(last = true)]
    arguments: Vec<String>,
}

impl Generate {
    pub fn run(&self, target: &Target) -> Result<()> {
        let options = target.options(&self.arguments)?;
        options.validate()?;

        let (content, path) = match self.format.resolve()? {
            Format::Launchd => {
                let backend = LaunchAgentBackend::new(&options)?;
                (backend.render()?, backend.plist_path())
            }
            _ => {
                let backend = SystemdBackend::new(&options)?;
                (backend.render()?, backend.unit_path())
            }
        };

        print!("{content}");
        eprintln!("{} is the suggested file path.", path.display());
        Ok(())
    }
}
