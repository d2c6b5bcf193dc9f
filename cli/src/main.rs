use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod command;

#[derive(Parser)]
#[command(name = "autostart")]
#[command(about = "Register a program to start at login or boot")]
#[command(version)]
struct Cli {
    /// Log every native call and executed command to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(flatten)]
    target: command::Target,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show whether the program is registered")]
    Status(command::Status),
    #[command(about = "Register the program to start automatically")]
    #[command(alias = "add")]
    Enable(command::Enable),
    #[command(about = "Remove the registration")]
    #[command(alias = "rm")]
    Disable(command::Disable),
    #[command(about = "Show the data directory, log files and registration artifact")]
    Paths(command::Paths),
    #[command(about = "Print the registration file to stdout")]
    Generate(command::Generate),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Status(status_cmd) => status_cmd.run(&cli.target)?,
        Commands::Enable(enable_cmd) => enable_cmd.run(&cli.target)?,
        Commands::Disable(disable_cmd) => disable_cmd.run(&cli.target)?,
        Commands::Paths(paths_cmd) => paths_cmd.run(&cli.target)?,
        Commands::Generate(generate_cmd) => generate_cmd.run(&cli.target)?,
    }
    Ok(())
}
