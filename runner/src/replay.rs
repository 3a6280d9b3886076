//! Replay orchestrator: config + panel → backtest → printed summary.

use log::{info, warn};
use nanorevert::{BacktestReport, run_backtest};

use crate::config::Config;
use crate::error::Result;
use crate::panel::PanelFile;

/// Replay a panel file with the configured strategy.
pub fn run_replay(config: &Config, file: &PanelFile) -> Result<BacktestReport> {
    let panel = file.to_panel()?;
    if let Some((first, last)) = file.span() {
        info!(
            "Replaying {} bars x {} symbols ({first} .. {last})",
            panel.num_bars(),
            panel.num_symbols()
        );
    }

    let capacity = config.predictor.window_capacity();
    if panel.num_bars() <= capacity {
        warn!(
            "Panel has {} bars but the predictor needs {capacity} closes; no rebalance will run",
            panel.num_bars()
        );
    }

    let report = run_backtest(config.strategy, config.predictor, &panel, &config.backtest)?;
    info!(
        "Replay done: wealth {:.4}, {} of {} bars skipped",
        report.final_wealth,
        report.skipped,
        report.returns.len()
    );
    Ok(report)
}

/// Run a replay and print the summary to stdout.
pub fn run(config: &Config, file: &PanelFile) -> Result<()> {
    let report = run_replay(config, file)?;
    display_report(&report, file);
    Ok(())
}

/// Validate the config and print the resolved strategy.
pub fn check(config: &Config) -> Result<()> {
    config.validate()?;
    println!("Config OK");
    println!("{}", config.describe());
    Ok(())
}

fn display_report(report: &BacktestReport, file: &PanelFile) {
    if let Some((first, last)) = file.span() {
        println!("Panel: {} .. {}", first.format("%Y-%m-%d %H:%M"), last.format("%Y-%m-%d %H:%M"));
    }
    print!("{report}");
    if report.weights.is_empty() {
        println!("\nNo rebalance ran: not enough history for the predictor window.");
    }
}
