//! Index composition: which tickers belong to the index right now.

pub mod brapi;

pub use brapi::{
    BrapiResolver, CompositionSettings, INDEX_SYMBOL, MARKET_SUFFIX, TOKEN_ENV_VAR,
};

use crate::domain::{Ticker, TickerError};
use crate::http::TransportError;
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("access token missing: set {var} to a valid brapi.dev token")]
    MissingToken { var: String },

    #[error("composition API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected composition response: {0}")]
    MalformedResponse(String),

    #[error("invalid ticker in composition: {0}")]
    InvalidTicker(#[from] TickerError),

    #[error("composition request failed: {0}")]
    Transport(#[from] TransportError),
}

impl ResolveError {
    /// Whether the failure is a local configuration problem rather than an upstream one.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ResolveError::MissingToken { .. })
    }
}

/// Produces the ordered ticker list the rest of the run works on.
pub trait IndexResolver {
    /// Short description for logs (never includes credentials).
    fn describe(&self) -> String;

    fn resolve(&self) -> Result<Vec<Ticker>, ResolveError>;
}

/// A resolver over a fixed ticker list, bypassing the composition API.
///
/// Repeated tickers are dropped on resolve unless deduplication is turned
/// off with `with_dedupe(false)`.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    tickers: Vec<Ticker>,
    dedupe: bool,
}

impl StaticResolver {
    pub fn new(tickers: Vec<Ticker>) -> Self {
        Self {
            tickers,
            dedupe: true,
        }
    }

    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    /// Parse symbols, appending `suffix` to those that lack it.
    pub fn from_symbols<S: AsRef<str>>(symbols: &[S], suffix: &str) -> Result<Self, ResolveError> {
        let tickers = symbols
            .iter()
            .map(|s| Ticker::from_symbol(s.as_ref(), suffix))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(tickers))
    }
}

impl IndexResolver for StaticResolver {
    fn describe(&self) -> String {
        format!("static list of {} tickers", self.tickers.len())
    }

    fn resolve(&self) -> Result<Vec<Ticker>, ResolveError> {
        if !self.dedupe {
            return Ok(self.tickers.clone());
        }
        let (kept, dropped) = dedupe_tickers(self.tickers.clone());
        for ticker in &dropped {
            warn!(%ticker, "duplicate ticker dropped");
        }
        Ok(kept)
    }
}

/// Drop repeated tickers by normalized symbol, keeping the first occurrence.
///
/// Returns `(kept, dropped)`; `kept` preserves the input order.
pub fn dedupe_tickers(tickers: Vec<Ticker>) -> (Vec<Ticker>, Vec<Ticker>) {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(tickers.len());
    let mut dropped = Vec::new();
    for ticker in tickers {
        if seen.insert(ticker.normalized()) {
            kept.push(ticker);
        } else {
            dropped.push(ticker);
        }
    }
    (kept, dropped)
}
