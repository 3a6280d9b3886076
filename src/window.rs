//! Per-instrument rolling window of closing prices.

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::types::Symbol;

/// Fixed-capacity FIFO of the most recent closes for one instrument.
///
/// The window is ready once it holds exactly `capacity` prices. Values are
/// kept oldest-first, so `closes().last()` is the newest close.
#[derive(Clone, Debug)]
pub struct TrackedInstrument {
    symbol: Symbol,
    capacity: usize,
    closes: VecDeque<f64>,
}

impl TrackedInstrument {
    /// Create an empty window. Capacity is clamped to at least one close.
    pub fn new(symbol: Symbol, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            symbol,
            capacity,
            closes: VecDeque::with_capacity(capacity),
        }
    }

    /// Create a window and backfill it with historical closes (oldest first).
    ///
    /// Only the last `capacity` values are kept.
    pub fn with_history(symbol: Symbol, capacity: usize, history: &[f64]) -> Result<Self> {
        let mut tracker = Self::new(symbol, capacity);
        let skip = history.len().saturating_sub(tracker.capacity);
        for &price in &history[skip..] {
            tracker.push(price)?;
        }
        Ok(tracker)
    }

    #[inline]
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// True iff the window holds exactly `capacity` closes.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.closes.len() == self.capacity
    }

    /// Append a close, evicting the oldest once full.
    ///
    /// Rejects zero, negative, and non-finite prices without touching the window.
    pub fn push(&mut self, price: f64) -> Result<()> {
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::InvalidPrice {
                symbol: self.symbol,
                price,
            });
        }
        if self.closes.len() == self.capacity {
            self.closes.pop_front();
        }
        self.closes.push_back(price);
        Ok(())
    }

    /// Drop all buffered closes.
    pub fn reset(&mut self) {
        self.closes.clear();
    }

    /// Buffered closes, oldest first.
    pub fn closes(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.closes.iter().copied()
    }

    /// Newest close, if any.
    pub fn latest(&self) -> Option<f64> {
        self.closes.back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aapl() -> Symbol {
        Symbol::new("AAPL")
    }

    #[test]
    fn ready_only_when_full() {
        let mut w = TrackedInstrument::new(aapl(), 2);
        assert!(!w.is_ready());
        w.push(100.0).unwrap();
        assert!(!w.is_ready());
        w.push(110.0).unwrap();
        assert!(w.is_ready());
    }

    #[test]
    fn zero_capacity_holds_one_close() {
        let mut w = TrackedInstrument::new(aapl(), 0);
        assert_eq!(w.capacity(), 1);
        for p in [1.0, 2.0, 3.0] {
            w.push(p).unwrap();
        }
        assert_eq!(w.len(), 1);
        assert!(w.is_ready());
        assert_eq!(w.latest(), Some(3.0));
    }

    #[test]
    fn evicts_oldest_first() {
        let mut w = TrackedInstrument::new(aapl(), 3);
        for p in [1.0, 2.0, 3.0, 4.0, 5.0] {
            w.push(p).unwrap();
        }
        assert_eq!(w.len(), 3);
        assert_eq!(w.closes().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
        assert_eq!(w.latest(), Some(5.0));
    }

    #[test]
    fn rejects_invalid_prices() {
        let mut w = TrackedInstrument::new(aapl(), 2);
        w.push(10.0).unwrap();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(w.push(bad), Err(Error::InvalidPrice { .. })));
        }
        assert_eq!(w.closes().collect::<Vec<_>>(), vec![10.0]);
    }

    #[test]
    fn backfill_keeps_most_recent() {
        let w = TrackedInstrument::with_history(aapl(), 2, &[1.0, 2.0, 3.0]).unwrap();
        assert!(w.is_ready());
        assert_eq!(w.closes().collect::<Vec<_>>(), vec![2.0, 3.0]);
    }

    #[test]
    fn short_backfill_stays_not_ready() {
        let w = TrackedInstrument::with_history(aapl(), 20, &[1.0, 2.0, 3.0]).unwrap();
        assert!(!w.is_ready());
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn backfill_propagates_bad_price() {
        let err = TrackedInstrument::with_history(aapl(), 2, &[1.0, -2.0]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidPrice {
                symbol: aapl(),
                price: -2.0
            }
        );
    }

    #[test]
    fn reset_clears() {
        let mut w = TrackedInstrument::with_history(aapl(), 2, &[1.0, 2.0]).unwrap();
        w.reset();
        assert!(w.is_empty());
        assert!(!w.is_ready());
        assert_eq!(w.latest(), None);
    }
}
