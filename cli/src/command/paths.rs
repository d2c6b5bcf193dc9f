use std::path::Path;

use anyhow::Result;
use clap::Args;
use tabled::{
    settings::{Padding, Style},
    Table, Tabled,
};

use super::Target;

#[derive(Debug, Args)]
pub struct Paths {}

#[derive(Tabled)]
struct PathRow {
    #[tabled(rename = "What")]
    what: &'static str,
    #[tabled(rename = "Path")]
    path: String,
}

fn display(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string())
}

impl Paths {
    pub fn run(&self, target: &Target) -> Result<()> {
        let autostart = target.autostart(&[])?;

        let rows = vec![
            PathRow {
                what: "data",
                path: display(autostart.data_dir().as_deref()),
            },
            PathRow {
                what: "stdout",
                path: display(autostart.stdout_path().as_deref()),
            },
            PathRow {
                what: "stderr",
                path: display(autostart.stderr_path().as_deref()),
            },
            PathRow {
                what: "artifact",
                path: autostart.artifact().to_string(),
            },
        ];

        if atty::isnt(atty::Stream::Stdout) {
            for row in &rows {
                println!("{}\t{}", row.what, row.path);
            }
        } else {
            let mut table = Table::new(rows);
            table.with(Style::blank()).with(Padding::new(0, 2, 0, 0));
            println!("{table}");
        }
        Ok(())
    }
}
