use crate::domain::signal::{Signal, SignalMap};
use crate::fallback::{FallbackReason, Sourced};
use crate::ingest::{Lookback, PriceHistoryProvider};
use std::sync::Arc;

pub const DEFAULT_FALLBACK_RETURN: f64 = 0.02;
pub const DEFAULT_SENTIMENT: f64 = 0.5;

const FALLBACK_RETURNS: &[(&str, f64)] = &[
    ("AAPL", 0.03),
    ("TSLA", 0.05),
    ("GOOG", 0.02),
    ("SPY", 0.01),
    ("VOO", 0.015),
];

const STATIC_SENTIMENTS: &[(&str, f64)] = &[
    ("AAPL", 0.6),
    ("TSLA", 0.8),
    ("GOOG", 0.5),
    ("SPY", 0.9),
    ("VOO", 0.85),
];

pub fn fallback_return(ticker: &str) -> f64 {
    lookup(FALLBACK_RETURNS, ticker).unwrap_or(DEFAULT_FALLBACK_RETURN)
}

pub fn sentiment(ticker: &str) -> f64 {
    lookup(STATIC_SENTIMENTS, ticker).unwrap_or(DEFAULT_SENTIMENT)
}

fn lookup(table: &[(&str, f64)], ticker: &str) -> Option<f64> {
    table.iter().find(|(t, _)| *t == ticker).map(|(_, v)| *v)
}

/// `(last / first) - 1` over a price series, oldest first.
pub fn trailing_return(prices: &[f64]) -> Result<f64, FallbackReason> {
    match prices {
        [] => Err(FallbackReason::EmptyPayload),
        [_] => Err(FallbackReason::InsufficientPrices { found: 1 }),
        [first, .., last] if *first > 0.0 => Ok((last / first) - 1.0),
        [first, ..] => Err(FallbackReason::InvalidPrice { first: *first }),
    }
}

#[derive(Clone)]
pub struct SignalFetcher {
    prices: Arc<dyn PriceHistoryProvider>,
    window: Lookback,
}

impl SignalFetcher {
    pub fn new(prices: Arc<dyn PriceHistoryProvider>) -> Self {
        Self {
            prices,
            window: Lookback::ONE_MONTH,
        }
    }

    pub async fn get_returns(&self, ticker: &str) -> Sourced<f64> {
        let computed = match self.prices.fetch_adjusted_closes(ticker, self.window).await {
            Ok(series) => trailing_return(&series),
            Err(err) => Err(FallbackReason::transport(&err)),
        };

        match computed {
            Ok(r) => Sourced::Live(r),
            Err(reason) => {
                let value = fallback_return(ticker);
                tracing::warn!(%ticker, %reason, fallback = value, "using fallback return");
                Sourced::fallback(value, reason)
            }
        }
    }

    /// One signal per ticker, in input order. Duplicate tickers collapse to one entry.
    pub async fn get_signals(&self, tickers: &[String]) -> SignalMap {
        let mut out = SignalMap::new();
        for ticker in tickers {
            let ret = self.get_returns(ticker).await.into_value();
            out.insert(
                ticker.clone(),
                Signal {
                    ret,
                    sentiment: sentiment(ticker),
                },
            );
        }
        out
    }
}
