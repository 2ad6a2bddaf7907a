//! Domain types for IbovLab

pub mod price_table;
pub mod series;
pub mod ticker;

pub use price_table::{PriceField, PriceTable, TickerColumns};
pub use series::{ClosePoint, CloseSeries};
pub use ticker::{Ticker, TickerError};
