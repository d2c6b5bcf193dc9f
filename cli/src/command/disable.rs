use anyhow::Result;
use clap::Args;

use super::Target;

#[derive(Debug, Args)]
pub struct Disable {}

impl Disable {
    pub fn run(&self, target: &Target) -> Result<()> {
        let autostart = target.autostart(&[])?;
        let label = &autostart.options().label;

        print!("Disabling '{label}'...");
        autostart.disable()?;
        println!(" done.");
        Ok(())
    }
}
