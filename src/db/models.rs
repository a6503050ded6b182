use chrono::DateTime;

use crate::types::SignalRow;

/// `signals` row as stored in SQLite (see `migrations/`).
#[derive(Debug, sqlx::FromRow)]
pub struct StoredSignal {
    pub token_address: String,
    pub pair_address: String,
    /// USD, despite the column name.
    pub liquidity_eth: f64,
    pub initial_price: f64,
    pub swap_link: String,
    pub token_name: String,
    pub token_summary: String,
    pub price_change_pct: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    pub dex_url: String,
    /// UTC epoch milliseconds.
    pub updated_at: i64,
}

impl From<StoredSignal> for SignalRow {
    fn from(s: StoredSignal) -> Self {
        Self {
            token_address: s.token_address,
            pair_address: s.pair_address,
            liquidity_usd: s.liquidity_eth,
            initial_price: s.initial_price,
            swap_link: s.swap_link,
            token_name: s.token_name,
            token_summary: s.token_summary,
            price_change_pct: s.price_change_pct,
            volume_24h: s.volume_24h,
            market_cap: s.market_cap,
            dex_url: s.dex_url,
            updated_at: DateTime::from_timestamp_millis(s.updated_at).unwrap_or_default(),
        }
    }
}
