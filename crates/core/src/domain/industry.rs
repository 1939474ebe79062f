#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Industry {
    pub label: &'static str,
    /// Predefined screener collection for this industry.
    pub screener_key: &'static str,
    /// Curated tickers used when the live screener is unavailable.
    pub fallback: &'static [&'static str],
}

pub const INDUSTRIES: [Industry; 9] = [
    Industry {
        label: "Technology",
        screener_key: "all_technology",
        fallback: &["AAPL", "MSFT", "NVDA", "ADBE", "GOOG", "AMZN", "AVGO", "CRM", "AMD", "INTC"],
    },
    Industry {
        label: "Healthcare",
        screener_key: "all_healthcare",
        fallback: &["JNJ", "PFE", "UNH", "MRK", "LLY", "ABBV", "TMO", "DHR", "BMY", "AMGN"],
    },
    Industry {
        label: "Finance",
        screener_key: "all_financial",
        fallback: &["JPM", "BAC", "WFC", "C", "GS", "MS", "BLK", "SCHW", "AXP", "USB"],
    },
    Industry {
        label: "Energy",
        screener_key: "all_energy",
        fallback: &["XOM", "CVX", "COP", "SLB", "EOG", "PSX", "MPC", "PXD", "VLO", "BKR"],
    },
    Industry {
        label: "Consumer Goods",
        screener_key: "all_consumer_goods",
        fallback: &["PG", "KO", "PEP", "COST", "WMT", "PM", "MDLZ", "CL", "KMB", "MO"],
    },
    Industry {
        label: "Utilities",
        screener_key: "all_utilities",
        fallback: &["NEE", "DUK", "SO", "AEP", "D", "EXC", "SRE", "XEL", "PEG", "ED"],
    },
    Industry {
        label: "Real Estate",
        screener_key: "all_real_estate",
        fallback: &["PLD", "AMT", "EQIX", "SPG", "PSA", "CCI", "O", "WELL", "VICI", "DLR"],
    },
    Industry {
        label: "Industrial",
        screener_key: "all_industrials",
        fallback: &["CAT", "GE", "HON", "UPS", "DE", "RTX", "LMT", "BA", "EMR", "ETN"],
    },
    Industry {
        label: "Telecommunications",
        screener_key: "all_telecom",
        fallback: &["VZ", "T", "TMUS", "CHTR", "VOD", "TEF", "NTTYY", "CMCSA", "ORAN", "BTI"],
    },
];

pub fn find_industry(label: &str) -> Option<&'static Industry> {
    INDUSTRIES.iter().find(|i| i.label == label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_industry_has_a_curated_fallback() {
        for industry in &INDUSTRIES {
            assert_eq!(industry.fallback.len(), 10, "{}", industry.label);
            assert!(industry.screener_key.starts_with("all_"));
        }
    }

    #[test]
    fn lookup_is_exact_match() {
        assert_eq!(find_industry("Energy").unwrap().screener_key, "all_energy");
        assert!(find_industry("energy").is_none());
        assert!(find_industry("Crypto").is_none());
    }
}
