use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pair records (normalized source output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
}

/// One DEX pair as reported by any source, reduced to the fields the
/// ranker and the signal table need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairRecord {
    pub chain_id: String,
    pub pair_address: String,
    pub base_token: BaseToken,
    pub price_usd: f64,
    /// `None` when the source did not report a 24h change at all.
    pub price_change_24h_pct: Option<f64>,
    pub liquidity_usd: f64,
    pub volume_24h_usd: f64,
    pub market_cap_usd: f64,
    pub source_url: String,
}

// ---------------------------------------------------------------------------
// Candidates (ranker output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub pair: PairRecord,
    /// Sort key.
    pub price_change_24h: f64,
    pub liquidity_usd: f64,
    pub volume_24h: f64,
}

impl Candidate {
    pub fn token_address(&self) -> &str {
        &self.pair.base_token.address
    }

    pub fn token_name(&self) -> &str {
        non_empty_or(&self.pair.base_token.name, "Unknown")
    }

    pub fn token_symbol(&self) -> &str {
        non_empty_or(&self.pair.base_token.symbol, "???")
    }

    /// `"<name> (<symbol>)"`, as shown in the feed.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.token_name(), self.token_symbol())
    }
}

fn non_empty_or<'a>(s: &'a str, fallback: &'a str) -> &'a str {
    if s.is_empty() {
        fallback
    } else {
        s
    }
}

// ---------------------------------------------------------------------------
// Persisted signal
// ---------------------------------------------------------------------------

/// A row of the `signals` table, keyed by `token_address`.
///
/// Serializes with the table's column names, so it doubles as the REST
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub token_address: String,
    pub pair_address: String,
    /// Pool liquidity in USD. The column is historically named `liquidity_eth`.
    #[serde(rename = "liquidity_eth")]
    pub liquidity_usd: f64,
    pub initial_price: f64,
    pub swap_link: String,
    pub token_name: String,
    pub token_summary: String,
    pub price_change_pct: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    pub dex_url: String,
    pub updated_at: DateTime<Utc>,
}

impl SignalRow {
    pub fn from_candidate(
        candidate: &Candidate,
        swap_link: String,
        token_summary: String,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token_address: candidate.token_address().to_string(),
            pair_address: candidate.pair.pair_address.clone(),
            liquidity_usd: candidate.liquidity_usd,
            initial_price: candidate.pair.price_usd,
            swap_link,
            token_name: candidate.display_name(),
            token_summary,
            price_change_pct: candidate.price_change_24h,
            volume_24h: candidate.volume_24h,
            market_cap: candidate.pair.market_cap_usd,
            dex_url: candidate.pair.source_url.clone(),
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, symbol: &str) -> Candidate {
        Candidate {
            pair: PairRecord {
                chain_id: "base".into(),
                pair_address: "0xpair".into(),
                base_token: BaseToken {
                    address: "0xtoken".into(),
                    name: name.into(),
                    symbol: symbol.into(),
                },
                price_usd: 0.42,
                price_change_24h_pct: Some(12.5),
                liquidity_usd: 9_000.0,
                volume_24h_usd: 4_000.0,
                market_cap_usd: 1_000_000.0,
                source_url: "https://dexscreener.com/base/0xpair".into(),
            },
            price_change_24h: 12.5,
            liquidity_usd: 9_000.0,
            volume_24h: 4_000.0,
        }
    }

    #[test]
    fn display_name_falls_back_when_metadata_missing() {
        assert_eq!(candidate("Brett", "BRETT").display_name(), "Brett (BRETT)");
        assert_eq!(candidate("", "").display_name(), "Unknown (???)");
    }

    #[test]
    fn signal_row_copies_candidate_metrics() {
        let now = Utc::now();
        let row = SignalRow::from_candidate(
            &candidate("Brett", "BRETT"),
            "https://swap".into(),
            "summary".into(),
            now,
        );
        assert_eq!(row.token_address, "0xtoken");
        assert_eq!(row.pair_address, "0xpair");
        assert_eq!(row.token_name, "Brett (BRETT)");
        assert_eq!(row.initial_price, 0.42);
        assert_eq!(row.price_change_pct, 12.5);
        assert_eq!(row.market_cap, 1_000_000.0);
        assert_eq!(row.dex_url, "https://dexscreener.com/base/0xpair");
        assert_eq!(row.updated_at, now);
    }

    #[test]
    fn signal_row_serializes_with_table_column_names() {
        let row = SignalRow::from_candidate(&candidate("Brett", "BRETT"), String::new(), String::new(), Utc::now());
        let v = serde_json::to_value(&row).unwrap();
        let mut keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "dex_url",
                "initial_price",
                "liquidity_eth",
                "market_cap",
                "pair_address",
                "price_change_pct",
                "swap_link",
                "token_address",
                "token_name",
                "token_summary",
                "updated_at",
                "volume_24h",
            ]
        );
        assert_eq!(v["liquidity_eth"], 9_000.0);
    }
}
