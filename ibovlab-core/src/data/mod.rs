//! Price retrieval: providers, auto-adjustment, and multi-ticker alignment.

pub mod adjust;
pub mod align;
pub mod csv_import;
pub mod memory;
pub mod provider;
pub mod yahoo;

pub use align::align_tickers;
pub use csv_import::CsvPriceProvider;
pub use memory::StaticPriceProvider;
pub use provider::{DataError, DataSource, PriceProvider, RawBar};
pub use yahoo::YahooProvider;
