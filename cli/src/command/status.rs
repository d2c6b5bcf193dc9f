use anyhow::Result;
use clap::Args;

use super::Target;

#[derive(Debug, Args)]
pub struct Status {}

impl Status {
    pub fn run(&self, target: &Target) -> Result<()> {
        let autostart = target.autostart(&[])?;
        let state = if autostart.is_enabled()? {
            "enabled"
        } else {
            "disabled"
        };
        println!("{}: {state} ({})", autostart.options().label, autostart.artifact());
        Ok(())
    }
}
