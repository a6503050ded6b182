pub mod dexscreener;
pub mod geckoterminal;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::{AppError, Result};
use crate::types::PairRecord;

pub use dexscreener::{BoostedSource, SearchSource};
pub use geckoterminal::TrendingSource;

/// A market-data source that yields normalized pairs for the target chain.
///
/// Implementations swallow their own failures: a source that cannot be
/// reached returns an empty list so the remaining sources still count.
#[async_trait]
pub trait PairSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Vec<PairRecord>;
}

/// Shared client for every outbound call; carries the per-request timeout.
pub fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?)
}

/// GET a URL and decode the body as JSON, treating non-2xx as an error.
pub(crate) async fn get_json(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<serde_json::Value> {
    let resp = client
        .get(url)
        .query(query)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(AppError::Upstream(format!("GET {url} returned {status}")));
    }
    Ok(resp.json().await?)
}

/// Read a number that may be encoded as a JSON number or a numeric string.
/// `"NaN"` and `"inf"` parse as floats but are treated as missing.
pub(crate) fn as_f64(v: &serde_json::Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .filter(|n| n.is_finite())
}

/// Follow `path` through nested objects and read the leaf as a number.
pub(crate) fn num_at(v: &serde_json::Value, path: &[&str]) -> Option<f64> {
    path.iter()
        .try_fold(v, |node, key| node.get(*key))
        .and_then(as_f64)
}

/// Follow `path` through nested objects and read the leaf as a string.
pub(crate) fn str_at<'a>(v: &'a serde_json::Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(v, |node, key| node.get(*key))
        .and_then(|s| s.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_may_be_strings() {
        let v = json!({"a": {"b": "12.5"}, "c": 3, "d": null, "e": "n/a"});
        assert_eq!(num_at(&v, &["a", "b"]), Some(12.5));
        assert_eq!(num_at(&v, &["c"]), Some(3.0));
        assert_eq!(num_at(&v, &["d"]), None);
        assert_eq!(num_at(&v, &["e"]), None);
        assert_eq!(num_at(&v, &["missing", "b"]), None);
    }

    #[test]
    fn non_finite_strings_are_missing() {
        for raw in ["NaN", "nan", "inf", "-Infinity", " infinity "] {
            assert_eq!(as_f64(&json!(raw)), None, "{raw}");
        }
        assert_eq!(as_f64(&json!("-3.5")), Some(-3.5));
    }

    #[test]
    fn str_at_walks_nested_objects() {
        let v = json!({"relationships": {"base_token": {"data": {"id": "base_0x1"}}}});
        assert_eq!(
            str_at(&v, &["relationships", "base_token", "data", "id"]),
            Some("base_0x1")
        );
        assert_eq!(str_at(&v, &["relationships", "quote_token"]), None);
    }
}
