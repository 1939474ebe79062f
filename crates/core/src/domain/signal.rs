use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Signal {
    /// Fractional trailing return (0.03 = 3%).
    #[serde(rename = "return")]
    pub ret: f64,
    /// In [0, 1].
    pub sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerSignal {
    pub symbol: String,
    pub signal: Signal,
}

/// Signals keyed by ticker, in ticker-pool order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SignalMap {
    entries: Vec<TickerSignal>,
}

impl SignalMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the signal for `symbol`, keeping its first position.
    pub fn insert(&mut self, symbol: impl Into<String>, signal: Signal) {
        let symbol = symbol.into();
        match self.entries.iter_mut().find(|e| e.symbol == symbol) {
            Some(existing) => existing.signal = signal,
            None => self.entries.push(TickerSignal { symbol, signal }),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&Signal> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| &e.signal)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.symbol.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TickerSignal> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_position() {
        let mut map = SignalMap::new();
        map.insert("AAPL", Signal { ret: 0.01, sentiment: 0.6 });
        map.insert("TSLA", Signal { ret: 0.05, sentiment: 0.8 });
        map.insert("AAPL", Signal { ret: 0.02, sentiment: 0.6 });

        assert_eq!(map.len(), 2);
        assert_eq!(map.symbols().collect::<Vec<_>>(), vec!["AAPL", "TSLA"]);
        assert_eq!(map.get("AAPL").unwrap().ret, 0.02);
        assert!(map.get("GOOG").is_none());
    }

    #[test]
    fn serializes_return_field_name() {
        let mut map = SignalMap::new();
        map.insert("SPY", Signal { ret: 0.01, sentiment: 0.9 });
        let v = serde_json::to_value(&map).unwrap();
        assert_eq!(v[0]["symbol"], "SPY");
        assert_eq!(v[0]["signal"]["return"], 0.01);
    }
}
