use crate::error::{AppError, Result};

pub const DEXSCREENER_API_URL: &str = "https://api.dexscreener.com";
pub const GECKOTERMINAL_API_URL: &str = "https://api.geckoterminal.com";
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_MODEL: &str = "gpt-4o-mini";
pub const BASE_RPC_URL: &str = "https://mainnet.base.org";

/// DexScreener / GeckoTerminal chain identifier of the only network we scan.
pub const CHAIN_ID: &str = "base";

/// Default eligibility floors and result size.
pub const MIN_LIQUIDITY_USD: f64 = 2_500.0;
pub const MIN_VOLUME_24H: f64 = 1_000.0;
pub const TOP_N: usize = 10;

/// Scan period (seconds).
pub const SCAN_INTERVAL_SECS: u64 = 300;

/// Every outbound HTTP call is bounded by this timeout and never retried.
pub const HTTP_TIMEOUT_SECS: u64 = 15;

/// Signals not refreshed for this long are purged.
pub const SIGNAL_TTL_HOURS: i64 = 48;

/// DexScreener accepts at most this many comma-joined addresses per token lookup.
pub const TOKEN_BATCH_LIMIT: usize = 30;

/// Referral fee embedded in swap links, in basis points (10 = 0.1%).
pub const SWAP_FEE_BPS: u32 = 10;

/// Completion budget for the one-sentence token summary.
pub const SUMMARY_MAX_TOKENS: u32 = 120;

/// Search terms used to widen discovery beyond boosted tokens.
pub const SEARCH_QUERIES: &[&str] = &[
    // core quote assets
    "WETH", "USDC",
    // generic discovery
    "trending", "base",
    // ecosystem tokens
    "DEGEN", "BRETT", "TOSHI", "HIGHER",
    // categories
    "meme", "social", "AI",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub dexscreener_api_url: String,
    pub geckoterminal_api_url: String,
    /// Supabase project URL (SUPABASE_URL). Used together with `supabase_key`.
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    /// Local SQLite file (DB_PATH), used when Supabase is not configured.
    pub db_path: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub openai_model: String,
    /// Fee recipient for swap links (REFERRAL_WALLET).
    pub referral_wallet: String,
    /// Carried for operators; the scanner never talks to a node.
    pub base_rpc_url: String,
    pub scan_interval_secs: u64,
    /// Minimum pool liquidity in USD (SCANNER_MIN_LIQUIDITY)
    pub min_liquidity_usd: f64,
    /// Minimum 24h volume in USD (SCANNER_MIN_VOLUME_24H)
    pub min_volume_24h: f64,
    /// Number of ranked signals kept per scan (SCANNER_TOP_N)
    pub top_n: usize,
    /// Reject pairs whose 24h change is not strictly positive (SCANNER_REQUIRE_GAIN)
    pub require_gain: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            dexscreener_api_url: DEXSCREENER_API_URL.to_string(),
            geckoterminal_api_url: GECKOTERMINAL_API_URL.to_string(),
            supabase_url: None,
            supabase_key: None,
            db_path: None,
            openai_api_key: None,
            openai_api_url: OPENAI_API_URL.to_string(),
            openai_model: OPENAI_MODEL.to_string(),
            referral_wallet: String::new(),
            base_rpc_url: BASE_RPC_URL.to_string(),
            scan_interval_secs: SCAN_INTERVAL_SECS,
            min_liquidity_usd: MIN_LIQUIDITY_USD,
            min_volume_24h: MIN_VOLUME_24H,
            top_n: TOP_N,
            require_gain: false,
        }
    }
}

impl Config {
    /// Build the configuration from the process environment, after loading
    /// a `.env` file if one is present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let scan_interval_secs = parse_or(get("SCAN_INTERVAL_SECS"), "SCAN_INTERVAL_SECS", defaults.scan_interval_secs)?;
        if scan_interval_secs == 0 {
            return Err(AppError::Config("SCAN_INTERVAL_SECS must be > 0".to_string()));
        }
        let top_n = parse_or(get("SCANNER_TOP_N"), "SCANNER_TOP_N", defaults.top_n)?;
        if top_n == 0 {
            return Err(AppError::Config("SCANNER_TOP_N must be > 0".to_string()));
        }

        Ok(Self {
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            dexscreener_api_url: get("DEXSCREENER_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.dexscreener_api_url),
            geckoterminal_api_url: get("GECKOTERMINAL_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.geckoterminal_api_url),
            supabase_url: get("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string()),
            supabase_key: get("SUPABASE_KEY"),
            db_path: get("DB_PATH"),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_api_url: get("OPENAI_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_api_url),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            referral_wallet: get("REFERRAL_WALLET").unwrap_or_default(),
            base_rpc_url: get("BASE_RPC_URL").unwrap_or(defaults.base_rpc_url),
            scan_interval_secs,
            min_liquidity_usd: parse_or(get("SCANNER_MIN_LIQUIDITY"), "SCANNER_MIN_LIQUIDITY", defaults.min_liquidity_usd)?,
            min_volume_24h: parse_or(get("SCANNER_MIN_VOLUME_24H"), "SCANNER_MIN_VOLUME_24H", defaults.min_volume_24h)?,
            top_n,
            require_gain: parse_or(get("SCANNER_REQUIRE_GAIN"), "SCANNER_REQUIRE_GAIN", defaults.require_gain)?,
        })
    }

    /// Supabase credentials, only when both halves are present.
    pub fn supabase(&self) -> Option<(&str, &str)> {
        match (&self.supabase_url, &self.supabase_key) {
            (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
            _ => None,
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{key} has an invalid value: {v:?}"))),
    }
}
