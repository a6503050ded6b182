//! DexScreener sources: paid-boost discovery resolved through the token
//! endpoint, and keyword search.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::{CHAIN_ID, SEARCH_QUERIES, TOKEN_BATCH_LIMIT};
use crate::error::Result;
use crate::fetcher::{as_f64, get_json, num_at, str_at, PairSource};
use crate::types::{BaseToken, PairRecord};

/// Top boosted tokens on the target chain, expanded into their pairs.
pub struct BoostedSource {
    client: reqwest::Client,
    api_url: String,
}

impl BoostedSource {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self { client, api_url: api_url.into() }
    }

    async fn boosted_addresses(&self) -> Result<Vec<String>> {
        let url = format!("{}/token-boosts/top/v1", self.api_url);
        let resp = get_json(&self.client, &url, &[]).await?;
        Ok(parse_boosted_addresses(&resp))
    }

    async fn token_pairs(&self, addresses: &[String]) -> Result<Vec<PairRecord>> {
        let batch = &addresses[..addresses.len().min(TOKEN_BATCH_LIMIT)];
        let url = format!("{}/tokens/v1/{}/{}", self.api_url, CHAIN_ID, batch.join(","));
        let resp = get_json(&self.client, &url, &[]).await?;
        let pairs = parse_pair_list(&resp);
        info!("[BOOSTED] fetched {} pairs for {} boosted tokens", pairs.len(), batch.len());
        Ok(pairs)
    }
}

#[async_trait]
impl PairSource for BoostedSource {
    fn name(&self) -> &'static str {
        "dexscreener-boosted"
    }

    async fn fetch(&self) -> Vec<PairRecord> {
        let addresses = match self.boosted_addresses().await {
            Ok(a) => a,
            Err(e) => {
                error!("[BOOSTED] failed to fetch boosted tokens: {e}");
                return Vec::new();
            }
        };
        info!("[BOOSTED] found {} boosted {CHAIN_ID} tokens", addresses.len());
        if addresses.is_empty() {
            return Vec::new();
        }

        match self.token_pairs(&addresses).await {
            Ok(pairs) => pairs,
            Err(e) => {
                error!("[BOOSTED] failed to fetch token pairs: {e}");
                Vec::new()
            }
        }
    }
}

/// Free-text search across a fixed set of discovery terms.
pub struct SearchSource {
    client: reqwest::Client,
    api_url: String,
    queries: Vec<String>,
}

impl SearchSource {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            queries: SEARCH_QUERIES.iter().map(|q| q.to_string()).collect(),
        }
    }
}

#[async_trait]
impl PairSource for SearchSource {
    fn name(&self) -> &'static str {
        "dexscreener-search"
    }

    async fn fetch(&self) -> Vec<PairRecord> {
        let url = format!("{}/latest/dex/search", self.api_url);
        let mut seen_pairs: HashSet<String> = HashSet::new();
        let mut all_pairs = Vec::new();

        for q in &self.queries {
            let resp = match get_json(&self.client, &url, &[("q", q.as_str())]).await {
                Ok(r) => r,
                Err(e) => {
                    warn!("[SEARCH] query '{q}' failed: {e}");
                    continue;
                }
            };
            let pairs = resp.get("pairs").map(parse_pair_list).unwrap_or_default();
            all_pairs.extend(unique_chain_pairs(pairs, &mut seen_pairs));
        }

        info!("[SEARCH] fetched {} unique {CHAIN_ID} pairs from {} queries", all_pairs.len(), self.queries.len());
        all_pairs
    }
}

/// Keep target-chain pairs whose pair address has not been seen yet.
fn unique_chain_pairs(pairs: Vec<PairRecord>, seen: &mut HashSet<String>) -> Vec<PairRecord> {
    pairs
        .into_iter()
        .filter(|p| p.chain_id == CHAIN_ID)
        .filter(|p| seen.insert(p.pair_address.clone()))
        .collect()
}

/// `token-boosts` returns `[{chainId, tokenAddress, ...}]` across all chains.
pub fn parse_boosted_addresses(v: &Value) -> Vec<String> {
    v.as_array()
        .map(|items| {
            items
                .iter()
                .filter(|item| item.get("chainId").and_then(|c| c.as_str()) == Some(CHAIN_ID))
                .filter_map(|item| item.get("tokenAddress").and_then(|a| a.as_str()))
                .map(|a| a.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Accepts either a bare array of pairs or an object wrapping them in `pairs`.
pub fn parse_pair_list(v: &Value) -> Vec<PairRecord> {
    let items = match v {
        Value::Array(items) => items,
        Value::Object(_) => match v.get("pairs").and_then(|p| p.as_array()) {
            Some(items) => items,
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    items.iter().filter_map(parse_pair).collect()
}

/// Normalize one DexScreener pair object. Returns `None` for non-objects.
pub fn parse_pair(v: &Value) -> Option<PairRecord> {
    if !v.is_object() {
        return None;
    }
    let text = |path: &[&str]| str_at(v, path).unwrap_or("").to_string();

    let market_cap_usd = v
        .get("marketCap")
        .and_then(as_f64)
        .filter(|m| *m != 0.0)
        .or_else(|| v.get("fdv").and_then(as_f64))
        .unwrap_or(0.0);

    Some(PairRecord {
        chain_id: text(&["chainId"]),
        pair_address: text(&["pairAddress"]),
        base_token: BaseToken {
            address: text(&["baseToken", "address"]),
            name: text(&["baseToken", "name"]),
            symbol: text(&["baseToken", "symbol"]),
        },
        price_usd: num_at(v, &["priceUsd"]).unwrap_or(0.0),
        price_change_24h_pct: num_at(v, &["priceChange", "h24"]),
        liquidity_usd: num_at(v, &["liquidity", "usd"]).unwrap_or(0.0),
        volume_24h_usd: num_at(v, &["volume", "h24"]).unwrap_or(0.0),
        market_cap_usd,
        source_url: text(&["url"]),
    })
}
