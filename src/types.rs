//! Core types: Symbol, Insight

use std::fmt;

/// Instrument identifier, stored inline as up to 8 ASCII/UTF-8 bytes.
///
/// `Copy` and hashable, so it can key per-instrument state without allocation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Symbol {
    bytes: [u8; Symbol::MAX_LEN],
    len: u8,
}

impl Symbol {
    /// Maximum symbol length in bytes.
    pub const MAX_LEN: usize = 8;

    /// Create a symbol from a string.
    ///
    /// # Panics
    ///
    /// Panics if `s` is empty or longer than [`Symbol::MAX_LEN`] bytes.
    /// Use [`Symbol::try_new`] for untrusted input.
    #[track_caller]
    pub fn new(s: &str) -> Self {
        match Self::try_new(s) {
            Some(sym) => sym,
            None => panic!("symbol must be 1..={} bytes, got {s:?}", Self::MAX_LEN),
        }
    }

    /// Create a symbol, returning `None` if `s` is empty or too long.
    pub fn try_new(s: &str) -> Option<Self> {
        let raw = s.as_bytes();
        if raw.is_empty() || raw.len() > Self::MAX_LEN {
            return None;
        }
        let mut bytes = [0u8; Self::MAX_LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Some(Self {
            bytes,
            len: raw.len() as u8,
        })
    }

    /// The symbol as a string slice.
    pub fn as_str(&self) -> &str {
        // Constructed only from &str, so the prefix is valid UTF-8.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Symbol::try_new(&s)
            .ok_or_else(|| format!("symbol must be 1..={} bytes, got {s:?}", Symbol::MAX_LEN))
    }
}

impl From<Symbol> for String {
    fn from(sym: Symbol) -> Self {
        sym.as_str().to_owned()
    }
}

/// A rebalance signal for one instrument.
///
/// `magnitude` is an optional externally predicted price-change fraction
/// (e.g. `0.02` = +2%). When present, the predictor uses `1 + magnitude` as
/// the instrument's price relative instead of its own estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Insight {
    pub symbol: Symbol,
    pub magnitude: Option<f64>,
}

impl Insight {
    /// An insight with no external magnitude.
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            magnitude: None,
        }
    }

    /// An insight carrying an external price-change prediction.
    pub fn with_magnitude(symbol: Symbol, magnitude: f64) -> Self {
        Self {
            symbol,
            magnitude: Some(magnitude),
        }
    }
}
