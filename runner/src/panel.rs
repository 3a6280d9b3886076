//! Price panel file (panel.json) loading and validation.

use std::path::Path;

use chrono::{DateTime, Utc};
use nanorevert::{PricePanel, Symbol};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Timestamped closes for a fixed list of symbols.
#[derive(Debug, Clone, Deserialize)]
pub struct PanelFile {
    pub symbols: Vec<String>,
    pub bars: Vec<Bar>,
}

/// One bar: a close per symbol, in `symbols` order.
#[derive(Debug, Clone, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub closes: Vec<f64>,
}

impl PanelFile {
    /// Load and validate a panel.json file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::PanelRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self> {
        let file: PanelFile = serde_json::from_str(json)?;
        file.validate()?;
        Ok(file)
    }

    /// Validate symbols and bar timestamps. Prices and shape are checked by
    /// [`PricePanel::validate`] on conversion.
    fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(Error::Panel("symbols list is empty".into()));
        }
        for s in &self.symbols {
            if Symbol::try_new(s).is_none() {
                return Err(Error::Panel(format!(
                    "symbol '{s}' must be 1..={} bytes",
                    Symbol::MAX_LEN
                )));
            }
        }
        if self.bars.is_empty() {
            return Err(Error::Panel("bars list is empty".into()));
        }
        for pair in self.bars.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(Error::Panel(format!(
                    "timestamps must be strictly increasing ({} then {})",
                    pair[0].timestamp, pair[1].timestamp
                )));
            }
        }
        Ok(())
    }

    /// Symbols as engine `Symbol` values.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.symbols.iter().map(|s| Symbol::new(s)).collect()
    }

    /// First and last bar timestamps.
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.bars.first()?.timestamp, self.bars.last()?.timestamp))
    }

    /// Convert into a validated engine panel.
    pub fn to_panel(&self) -> Result<PricePanel> {
        let closes = self.bars.iter().map(|b| b.closes.clone()).collect();
        Ok(PricePanel::new(self.symbols(), closes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_json() -> &'static str {
        r#"{
            "symbols": ["AAPL", "MSFT"],
            "bars": [
                { "timestamp": "2026-02-02T21:00:00Z", "closes": [230.1, 410.5] },
                { "timestamp": "2026-02-03T21:00:00Z", "closes": [232.4, 408.0] },
                { "timestamp": "2026-02-04T21:00:00Z", "closes": [229.9, 411.2] }
            ]
        }"#
    }

    #[test]
    fn parse_valid_panel() {
        let file = PanelFile::from_json(valid_json()).unwrap();
        assert_eq!(file.symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(file.bars.len(), 3);
        assert_eq!(file.bars[1].closes, vec![232.4, 408.0]);
    }

    #[test]
    fn converts_to_engine_panel() {
        let panel = PanelFile::from_json(valid_json()).unwrap().to_panel().unwrap();
        assert_eq!(panel.num_bars(), 3);
        assert_eq!(panel.symbols[0].as_str(), "AAPL");
    }

    #[test]
    fn span_covers_all_bars() {
        let file = PanelFile::from_json(valid_json()).unwrap();
        let (first, last) = file.span().unwrap();
        assert_eq!(first.to_rfc3339(), "2026-02-02T21:00:00+00:00");
        assert_eq!((last - first).num_days(), 2);
    }

    #[test]
    fn reject_empty_symbols() {
        let json = r#"{"symbols":[],"bars":[]}"#;
        assert!(matches!(PanelFile::from_json(json), Err(Error::Panel(_))));
    }

    #[test]
    fn reject_long_symbol() {
        let json = r#"{
            "symbols": ["TOOLONGNAME"],
            "bars": [{ "timestamp": "2026-01-01T00:00:00Z", "closes": [1.0] }]
        }"#;
        assert!(PanelFile::from_json(json).is_err());
    }

    #[test]
    fn reject_unordered_timestamps() {
        let json = r#"{
            "symbols": ["AAPL"],
            "bars": [
                { "timestamp": "2026-01-02T00:00:00Z", "closes": [1.0] },
                { "timestamp": "2026-01-02T00:00:00Z", "closes": [1.1] }
            ]
        }"#;
        assert!(matches!(PanelFile::from_json(json), Err(Error::Panel(_))));
    }

    #[test]
    fn reject_bad_timestamp() {
        let json = r#"{
            "symbols": ["AAPL"],
            "bars": [{ "timestamp": "yesterday", "closes": [1.0] }]
        }"#;
        assert!(matches!(PanelFile::from_json(json), Err(Error::PanelParse(_))));
    }

    #[test]
    fn ragged_bar_fails_on_conversion() {
        let json = r#"{
            "symbols": ["AAPL", "MSFT"],
            "bars": [{ "timestamp": "2026-01-01T00:00:00Z", "closes": [1.0] }]
        }"#;
        let file = PanelFile::from_json(json).unwrap();
        assert!(matches!(file.to_panel(), Err(Error::Engine(_))));
    }

    #[test]
    fn non_positive_close_fails_on_conversion() {
        let json = r#"{
            "symbols": ["AAPL"],
            "bars": [{ "timestamp": "2026-01-01T00:00:00Z", "closes": [0.0] }]
        }"#;
        let err = PanelFile::from_json(json).unwrap().to_panel().unwrap_err();
        assert!(matches!(err, Error::Engine(nanorevert::Error::InvalidPrice { .. })));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.json");
        std::fs::write(&path, valid_json()).unwrap();
        assert_eq!(PanelFile::load(&path).unwrap().bars.len(), 3);
    }

    #[test]
    fn load_missing_file() {
        let err = PanelFile::load(Path::new("/nonexistent/panel.json")).unwrap_err();
        assert!(matches!(err, Error::PanelRead { .. }));
    }
}
