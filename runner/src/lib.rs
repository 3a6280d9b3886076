//! nanorevert-runner: command-line replay driver for nanorevert.
//!
//! Reads a strategy config from TOML and a timestamped price panel from JSON,
//! replays the panel through a portfolio controller, and prints the final
//! weights with a performance summary.

pub mod config;
pub mod error;
pub mod panel;
pub mod replay;
