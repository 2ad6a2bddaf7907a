//! Ticker symbols with a market suffix.
//!
//! B3 listings are quoted on Yahoo Finance with a `.SA` suffix
//! (`PETR4` → `PETR4.SA`). A `Ticker` keeps the full symbol and remembers
//! where the base symbol ends, so both forms are available without
//! re-parsing.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickerError {
    #[error("ticker symbol is empty")]
    Empty,

    #[error("ticker symbol '{0}' contains whitespace")]
    Whitespace(String),
}

/// An immutable ticker: base symbol plus market suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticker {
    symbol: String,
    base_len: usize,
}

impl Ticker {
    /// Build a ticker from a bare symbol and a suffix (e.g. `"PETR4"`, `".SA"`).
    ///
    /// Surrounding whitespace on the base symbol is trimmed.
    pub fn new(base: &str, suffix: &str) -> Result<Self, TickerError> {
        let base = base.trim();
        if base.is_empty() {
            return Err(TickerError::Empty);
        }
        if base.chars().any(char::is_whitespace) {
            return Err(TickerError::Whitespace(base.to_string()));
        }
        Ok(Self {
            symbol: format!("{base}{suffix}"),
            base_len: base.len(),
        })
    }

    /// Build a ticker from a symbol that may or may not already carry the suffix.
    ///
    /// `"VALE3.SA"` and `"VALE3"` both become `VALE3.SA` for suffix `".SA"`.
    pub fn from_symbol(symbol: &str, suffix: &str) -> Result<Self, TickerError> {
        let symbol = symbol.trim();
        match symbol.strip_suffix(suffix) {
            Some(base) if !suffix.is_empty() => Self::new(base, suffix),
            _ => Self::new(symbol, suffix),
        }
    }

    /// Full symbol including the suffix, as sent to the price provider.
    pub fn as_str(&self) -> &str {
        &self.symbol
    }

    /// Bare symbol as listed by the index composition.
    pub fn base(&self) -> &str {
        &self.symbol[..self.base_len]
    }

    /// The market suffix (may be empty).
    pub fn suffix(&self) -> &str {
        &self.symbol[self.base_len..]
    }

    /// Normalized key used for duplicate detection: upper-cased full symbol.
    pub fn normalized(&self) -> String {
        self.symbol.to_uppercase()
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.symbol
    }
}
