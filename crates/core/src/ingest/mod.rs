pub mod provider;
pub mod types;

pub use provider::{Lookback, PriceHistoryProvider, ScreenerProvider, YahooClient};
