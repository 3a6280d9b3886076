//! CLI entry point for the nanorevert runner.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use nanorevert_runner::config::Config;
use nanorevert_runner::panel::PanelFile;
use nanorevert_runner::replay;

#[derive(Parser)]
#[command(name = "nanorevert")]
#[command(about = "Online mean-reversion portfolio replay")]
#[command(version)]
struct Cli {
    /// Path to config.toml (engine defaults when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a price panel and print the resulting weights and summary
    Run {
        /// Path to panel.json
        panel: PathBuf,
    },

    /// Validate the config and print the resolved strategy
    Check,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {e}");
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    let result = match cli.command {
        Command::Run { panel } => {
            let file = match PanelFile::load(&panel) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Error loading panel: {e}");
                    process::exit(1);
                }
            };
            replay::run(&config, &file)
        }
        Command::Check => replay::check(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
