//! brapi.dev index composition resolver.
//!
//! One GET to `/api/quote/<index>?modules=composition&token=<token>`. The
//! member list lives at `results[0].composition[*].stock` as bare B3
//! symbols; the market suffix is appended here.

use super::{dedupe_tickers, IndexResolver, ResolveError};
use crate::domain::Ticker;
use crate::http::HttpClient;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Environment variable holding the brapi.dev access token.
pub const TOKEN_ENV_VAR: &str = "BRAPI_TOKEN";

/// The index whose members are resolved.
pub const INDEX_SYMBOL: &str = "^BVSP";

/// Yahoo Finance suffix for B3 listings.
pub const MARKET_SUFFIX: &str = ".SA";

/// Where and how to fetch the composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionSettings {
    /// Quote endpoint base, without the index path segment.
    pub endpoint: String,
    /// Index identifier, e.g. `^BVSP`.
    pub index: String,
    /// Suffix appended to every member symbol.
    pub suffix: String,
    /// Drop repeated members by normalized symbol.
    pub dedupe: bool,
}

impl Default for CompositionSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://brapi.dev/api/quote".into(),
            index: INDEX_SYMBOL.into(),
            suffix: MARKET_SUFFIX.into(),
            dedupe: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    results: Option<Vec<QuoteResult>>,
}

#[derive(Debug, Deserialize)]
struct QuoteResult {
    composition: Option<Vec<CompositionMember>>,
}

#[derive(Debug, Deserialize)]
struct CompositionMember {
    stock: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Resolves index members through brapi.dev.
pub struct BrapiResolver {
    http: Arc<dyn HttpClient>,
    token: String,
    settings: CompositionSettings,
}

impl std::fmt::Debug for BrapiResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrapiResolver")
            .field("token", &"<redacted>")
            .field("settings", &self.settings)
            .finish()
    }
}

impl BrapiResolver {
    /// Build a resolver with the token from `BRAPI_TOKEN`.
    ///
    /// Fails with `MissingToken` before any request is made when the
    /// variable is unset or blank.
    pub fn from_env(
        http: Arc<dyn HttpClient>,
        settings: CompositionSettings,
    ) -> Result<Self, ResolveError> {
        Self::from_lookup(|key| std::env::var(key).ok(), http, settings)
    }

    /// Same as `from_env`, with an injectable environment lookup.
    pub fn from_lookup<F>(
        lookup: F,
        http: Arc<dyn HttpClient>,
        settings: CompositionSettings,
    ) -> Result<Self, ResolveError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_ENV_VAR)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ResolveError::MissingToken {
                var: TOKEN_ENV_VAR.to_string(),
            })?;
        Ok(Self {
            http,
            token,
            settings,
        })
    }

    /// Full quote URL for the configured index, with the index percent-encoded.
    pub fn quote_url(&self) -> String {
        format!(
            "{}/{}",
            self.settings.endpoint.trim_end_matches('/'),
            encode_index(&self.settings.index)
        )
    }

    /// Parse a composition payload into suffixed tickers, order preserved.
    pub fn parse_composition(body: &str, suffix: &str) -> Result<Vec<Ticker>, ResolveError> {
        let resp: QuoteResponse = serde_json::from_str(body)
            .map_err(|e| ResolveError::MalformedResponse(format!("invalid JSON: {e}")))?;

        let result = resp
            .results
            .ok_or_else(|| ResolveError::MalformedResponse("missing 'results'".into()))?
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::MalformedResponse("'results' is empty".into()))?;

        let members = result.composition.ok_or_else(|| {
            ResolveError::MalformedResponse("missing 'results[0].composition'".into())
        })?;

        members
            .into_iter()
            .enumerate()
            .map(|(i, member)| -> Result<Ticker, ResolveError> {
                let stock = member.stock.ok_or_else(|| {
                    ResolveError::MalformedResponse(format!("composition[{i}] has no 'stock'"))
                })?;
                Ok(Ticker::new(&stock, suffix)?)
            })
            .collect()
    }
}

impl IndexResolver for BrapiResolver {
    fn describe(&self) -> String {
        format!("brapi.dev composition of {}", self.settings.index)
    }

    fn resolve(&self) -> Result<Vec<Ticker>, ResolveError> {
        let url = self.quote_url();
        info!(index = %self.settings.index, "requesting index composition");

        let resp = self.http.get(
            &url,
            &[("modules", "composition"), ("token", self.token.as_str())],
        )?;

        if !resp.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&resp.body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| truncate(&resp.body, 200));
            return Err(ResolveError::Api {
                status: resp.status,
                message,
            });
        }

        let tickers = Self::parse_composition(&resp.body, &self.settings.suffix)?;
        debug!(count = tickers.len(), "composition parsed");

        if !self.settings.dedupe {
            return Ok(tickers);
        }

        let (kept, dropped) = dedupe_tickers(tickers);
        for ticker in &dropped {
            warn!(%ticker, "duplicate composition member dropped");
        }
        info!(count = kept.len(), "index composition resolved");
        Ok(kept)
    }
}

fn encode_index(index: &str) -> String {
    index.replace('^', "%5E")
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
