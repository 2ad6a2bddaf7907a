//! IbovLab Core: domain types, index composition, price providers, indicators, charts.
//!
//! This crate contains the building blocks of the batch job:
//! - Domain types (tickers, the multi-ticker price table, close series)
//! - Index composition resolution against the brapi.dev API
//! - Price providers (Yahoo Finance, CSV import, in-memory)
//! - Simple moving averages
//! - PNG chart rendering
//!
//! Every external collaborator sits behind a narrow trait (`HttpClient`,
//! `IndexResolver`, `PriceProvider`, `ChartRenderer`, `Clock`) so the
//! runner can be exercised without network access.

pub mod chart;
pub mod clock;
pub mod composition;
pub mod data;
pub mod domain;
pub mod http;
pub mod indicators;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
