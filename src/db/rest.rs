//! Supabase (PostgREST) table API for the hosted `signals` table.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::RequestBuilder;

use crate::db::store::SignalStore;
use crate::error::{AppError, Result};
use crate::types::SignalRow;

const TABLE: &str = "signals";

pub struct RestSignalStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestSignalStore {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{TABLE}", self.base_url)
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.header("apikey", &self.api_key).bearer_auth(&self.api_key)
    }

    async fn send(&self, rb: RequestBuilder, what: &str) -> Result<reqwest::Response> {
        let resp = self.authed(rb).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("{what} on {TABLE} returned {status}: {detail}")));
        }
        Ok(resp)
    }
}

#[async_trait]
impl SignalStore for RestSignalStore {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn upsert(&self, row: &SignalRow) -> Result<()> {
        let rb = self
            .client
            .post(self.table_url())
            .query(&[("on_conflict", "token_address")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row);
        self.send(rb, "upsert").await?;
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let rb = self
            .client
            .delete(self.table_url())
            .query(&[("updated_at", older_than_filter(cutoff))])
            .header("Prefer", "return=representation");
        let deleted: Vec<serde_json::Value> = self.send(rb, "delete").await?.json().await?;
        Ok(deleted.len() as u64)
    }

    async fn count(&self) -> Result<u64> {
        let rb = self
            .client
            .get(self.table_url())
            .query(&[("select", "token_address"), ("limit", "1")])
            .header("Prefer", "count=exact");
        let resp = self.send(rb, "count").await?;
        resp.headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| AppError::Upstream("count response had no Content-Range total".to_string()))
    }

    async fn list(&self) -> Result<Vec<SignalRow>> {
        let rb = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("order", "price_change_pct.desc,token_address.asc")]);
        Ok(self.send(rb, "list").await?.json().await?)
    }
}

/// PostgREST filter selecting rows updated strictly before `cutoff`.
fn older_than_filter(cutoff: DateTime<Utc>) -> String {
    format!("lt.{}", cutoff.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// `"0-0/42"` or `"*/0"` → total after the slash.
fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn content_range_total() {
        assert_eq!(parse_content_range_total("0-0/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-0/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn cutoff_filter_uses_utc_rfc3339() {
        let cutoff = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(older_than_filter(cutoff), "lt.2026-03-01T12:30:00.000Z");
    }

    #[test]
    fn table_url_is_under_rest_v1() {
        let store = RestSignalStore::new(reqwest::Client::new(), "https://proj.supabase.co", "k");
        assert_eq!(store.table_url(), "https://proj.supabase.co/rest/v1/signals");
    }
}
