//! GeckoTerminal trending pools, mapped onto the DexScreener-shaped
//! `PairRecord`.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::CHAIN_ID;
use crate::error::Result;
use crate::fetcher::{get_json, num_at, str_at, PairSource};
use crate::types::{BaseToken, PairRecord};

pub struct TrendingSource {
    client: reqwest::Client,
    api_url: String,
}

impl TrendingSource {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self { client, api_url: api_url.into() }
    }

    async fn trending_pools(&self) -> Result<Vec<PairRecord>> {
        let url = format!("{}/api/v2/networks/{}/trending_pools", self.api_url, CHAIN_ID);
        let resp = get_json(&self.client, &url, &[]).await?;
        Ok(parse_trending_pools(&resp))
    }
}

#[async_trait]
impl PairSource for TrendingSource {
    fn name(&self) -> &'static str {
        "geckoterminal-trending"
    }

    async fn fetch(&self) -> Vec<PairRecord> {
        match self.trending_pools().await {
            Ok(pairs) => {
                info!("[TRENDING] fetched {} trending {CHAIN_ID} pools", pairs.len());
                pairs
            }
            Err(e) => {
                warn!("[TRENDING] GeckoTerminal fetch failed: {e}");
                Vec::new()
            }
        }
    }
}

/// Map `{data: [{attributes, relationships}]}` to pair records.
pub fn parse_trending_pools(v: &Value) -> Vec<PairRecord> {
    v.get("data")
        .and_then(|d| d.as_array())
        .map(|pools| pools.iter().map(parse_pool).collect())
        .unwrap_or_default()
}

fn parse_pool(pool: &Value) -> PairRecord {
    let null = Value::Null;
    let attr = pool.get("attributes").unwrap_or(&null);

    let base_token_id = str_at(pool, &["relationships", "base_token", "data", "id"]).unwrap_or("");
    let address = token_address_from_id(base_token_id).to_string();
    let token_name = base_name(str_at(attr, &["name"]).unwrap_or("")).to_string();

    let market_cap_usd = num_at(attr, &["market_cap_usd"])
        .filter(|m| *m != 0.0)
        .or_else(|| num_at(attr, &["fdv_usd"]))
        .unwrap_or(0.0);

    PairRecord {
        chain_id: CHAIN_ID.to_string(),
        pair_address: str_at(attr, &["address"]).unwrap_or("").to_string(),
        source_url: format!("https://dexscreener.com/{CHAIN_ID}/{address}"),
        base_token: BaseToken {
            address,
            name: token_name.clone(),
            symbol: token_name,
        },
        price_usd: num_at(attr, &["base_token_price_usd"]).unwrap_or(0.0),
        // GeckoTerminal always reports a change; treat a missing one as flat.
        price_change_24h_pct: Some(num_at(attr, &["price_change_percentage", "h24"]).unwrap_or(0.0)),
        liquidity_usd: num_at(attr, &["reserve_in_usd"]).unwrap_or(0.0),
        volume_24h_usd: num_at(attr, &["volume_usd", "h24"]).unwrap_or(0.0),
        market_cap_usd,
    }
}

/// Relationship ids look like `"base_0xabc…"`; anything else has no usable address.
pub fn token_address_from_id(id: &str) -> &str {
    id.strip_prefix(&format!("{CHAIN_ID}_")).unwrap_or("")
}

/// Pool names look like `"BNKR / WETH 1%"`; the base token is the left side.
pub fn base_name(pool_name: &str) -> &str {
    match pool_name.split_once(" / ") {
        Some((base, _)) => base.trim(),
        None => pool_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pool(id: &str, name: &str) -> Value {
        json!({
            "id": "base_0xpool",
            "type": "pool",
            "attributes": {
                "address": "0xpool",
                "name": name,
                "base_token_price_usd": "0.00123",
                "fdv_usd": "900000",
                "market_cap_usd": null,
                "price_change_percentage": {"h1": "2.1", "h24": "-7.25"},
                "reserve_in_usd": "45000.5",
                "volume_usd": {"h1": "10", "h24": "23000"}
            },
            "relationships": {
                "base_token": {"data": {"id": id, "type": "token"}},
                "quote_token": {"data": {"id": "base_0x4200000000000000000000000000000000000006", "type": "token"}}
            }
        })
    }

    #[test]
    fn relationship_id_prefix_is_stripped() {
        let pairs = parse_trending_pools(&json!({"data": [pool("base_0xDEF", "DEF / WETH 1%")]}));
        assert_eq!(pairs[0].base_token.address, "0xDEF");
        assert_eq!(token_address_from_id("eth_0xDEF"), "");
        assert_eq!(token_address_from_id(""), "");
    }

    #[test]
    fn pool_attributes_map_onto_pair_record() {
        let pairs = parse_trending_pools(&json!({"data": [pool("base_0xabc", "BNKR / WETH 1%")]}));
        let p = &pairs[0];
        assert_eq!(p.chain_id, "base");
        assert_eq!(p.pair_address, "0xpool");
        assert_eq!(p.base_token.name, "BNKR");
        assert_eq!(p.base_token.symbol, "BNKR");
        assert_eq!(p.price_usd, 0.00123);
        assert_eq!(p.price_change_24h_pct, Some(-7.25));
        assert_eq!(p.liquidity_usd, 45000.5);
        assert_eq!(p.volume_24h_usd, 23000.0);
        assert_eq!(p.market_cap_usd, 900000.0, "null market cap falls back to fdv");
        assert_eq!(p.source_url, "https://dexscreener.com/base/0xabc");
    }

    #[test]
    fn sparse_pool_still_normalizes() {
        let pairs = parse_trending_pools(&json!({"data": [{"attributes": {"name": "LONELY"}}]}));
        let p = &pairs[0];
        assert_eq!(p.base_token.address, "");
        assert_eq!(p.base_token.name, "LONELY");
        assert_eq!(p.price_change_24h_pct, Some(0.0));
        assert_eq!(p.liquidity_usd, 0.0);
    }

    #[test]
    fn unexpected_payload_yields_nothing() {
        assert!(parse_trending_pools(&json!({"errors": [{"status": "429"}]})).is_empty());
        assert!(parse_trending_pools(&json!([])).is_empty());
    }
}
