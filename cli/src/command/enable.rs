use anyhow::{bail, Result};
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

use autostart::{Autostart, Scope};

use super::Target;

#[derive(Debug, Args)]
pub struct Enable {
    /// Do not ask before registering machine-wide
    #[arg(short, long)]
    pub yes: bool,

    /// Arguments passed to the program when it starts
    #[arg(last = true)]
    pub arguments: Vec<String>,
}

impl Enable {
    pub fn run(&self, target: &Target) -> Result<()> {
        let options = target.options(&self.arguments)?;
        // Without a program the registration would start this CLI itself.
        if options.program_override().is_none() {
            bail!("--program is required (or set Program in the options file)");
        }
        let autostart = Autostart::new(options)?;
        let label = &autostart.options().label;

        if autostart.options().scope == Scope::System && !self.yes && atty::is(atty::Stream::Stdin) {
            let proceed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(format!("Register '{label}' for every user on this machine?"))
                .default(true)
                .interact()?;
            if !proceed {
                eprintln!("Aborted.");
                return Ok(());
            }
        }

        print!("Enabling '{label}'...");
        autostart.enable()?;
        println!(" done.");
        eprintln!("{} is the registration.", autostart.artifact());
        Ok(())
    }
}
