use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::{Config, SIGNAL_TTL_HOURS};
use crate::db::{open_store, stale_cutoff, SignalStore};
use crate::enricher::{OpenAiSummarizer, SummaryRequest, Summarizer};
use crate::error::Result;
use crate::fetcher::{http_client, BoostedSource, PairSource, SearchSource, TrendingSource};
use crate::scorer::{merge_pairs, select_top_gainers, RankStats};
use crate::swap_link::build_swap_link;
use crate::types::{Candidate, SignalRow};

/// Counters for one pass of the pipeline.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Pairs returned by all sources, before dedup.
    pub fetched: usize,
    /// Pairs left after token-level dedup.
    pub unique: usize,
    pub eligible: usize,
    pub selected: usize,
    pub summarized: usize,
    pub saved: usize,
    pub save_failures: usize,
    /// Rows purged by cleanup; `None` when cleanup did not run or failed.
    pub cleaned: Option<u64>,
}

/// Runs the fetch → merge → rank → enrich → persist pipeline.
///
/// Holds no state between scans besides its collaborators. A scan that
/// starts while another is in flight is skipped.
pub struct Scanner {
    cfg: Config,
    sources: Vec<Box<dyn PairSource>>,
    store: Option<Arc<dyn SignalStore>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    tick_guard: Mutex<()>,
}

impl Scanner {
    /// `sources` are fetched in the given order; earlier sources win dedup.
    pub fn new(
        cfg: Config,
        sources: Vec<Box<dyn PairSource>>,
        store: Option<Arc<dyn SignalStore>>,
        summarizer: Option<Arc<dyn Summarizer>>,
    ) -> Self {
        Self {
            cfg,
            sources,
            store,
            summarizer,
            tick_guard: Mutex::new(()),
        }
    }

    /// Wire the production collaborators described by `cfg`.
    pub async fn from_config(cfg: Config) -> Result<Self> {
        let client = http_client()?;

        let sources: Vec<Box<dyn PairSource>> = vec![
            Box::new(BoostedSource::new(client.clone(), cfg.dexscreener_api_url.as_str())),
            Box::new(SearchSource::new(client.clone(), cfg.dexscreener_api_url.as_str())),
            Box::new(TrendingSource::new(client.clone(), cfg.geckoterminal_api_url.as_str())),
        ];

        let store = open_store(&cfg, &client).await?;

        let summarizer: Option<Arc<dyn Summarizer>> = match &cfg.openai_api_key {
            Some(key) => Some(Arc::new(OpenAiSummarizer::new(
                client.clone(),
                cfg.openai_api_url.as_str(),
                key.as_str(),
                cfg.openai_model.as_str(),
            ))),
            None => {
                warn!("OPENAI_API_KEY not set: token summaries disabled.");
                None
            }
        };

        if cfg.referral_wallet.is_empty() {
            warn!("REFERRAL_WALLET not set: swap links will carry no fee recipient.");
        }

        Ok(Self::new(cfg, sources, store, summarizer))
    }

    pub fn store(&self) -> Option<&Arc<dyn SignalStore>> {
        self.store.as_ref()
    }

    /// Scan now, then every `scan_interval_secs`, until `shutdown` resolves.
    ///
    /// `shutdown` is only raced against the ticker: a scan that has started
    /// always runs to completion, cleanup included, before the loop exits.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(Duration::from_secs(self.cfg.scan_interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested; scheduler stopped.");
                    return;
                }
                // first tick completes immediately
                _ = ticker.tick() => {}
            }
            self.scan_once().await;
        }
    }

    /// One full pipeline pass. Returns `None` if another scan holds the guard.
    pub async fn scan_once(&self) -> Option<ScanReport> {
        let Ok(_guard) = self.tick_guard.try_lock() else {
            warn!("Previous scan still running: skipping this tick");
            return None;
        };
        let started = Instant::now();
        let mut report = ScanReport::default();

        let mut batches = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let pairs = source.fetch().await;
            debug!(source = source.name(), pairs = pairs.len(), "source fetched");
            report.fetched += pairs.len();
            batches.push(pairs);
        }

        let merged = merge_pairs(batches);
        report.unique = merged.len();
        info!("Total unique pairs to evaluate: {} (of {} fetched)", report.unique, report.fetched);

        let (gainers, stats) = select_top_gainers(&merged, &self.cfg);
        log_rank_stats(&stats, gainers.len());
        report.eligible = stats.eligible;
        report.selected = gainers.len();

        if gainers.is_empty() {
            info!("No gainers passed filters this scan.");
        }
        for candidate in &gainers {
            self.process_candidate(candidate, &mut report).await;
        }

        report.cleaned = self.cleanup().await;

        info!(
            selected = report.selected,
            saved = report.saved,
            save_failures = report.save_failures,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scan complete. Saved {} of {} top gainer(s).",
            report.saved,
            report.selected,
        );
        Some(report)
    }

    async fn process_candidate(&self, candidate: &Candidate, report: &mut ScanReport) {
        let display_name = candidate.display_name();
        info!(
            token = %candidate.token_address(),
            change_24h = candidate.price_change_24h,
            volume_24h = candidate.volume_24h,
            liquidity = candidate.liquidity_usd,
            "[SIGNAL] {display_name} | 24h: {:+.1}% | Vol: ${:.0} | Liq: ${:.0}",
            candidate.price_change_24h,
            candidate.volume_24h,
            candidate.liquidity_usd,
        );

        let summary = match &self.summarizer {
            Some(summarizer) => self.summarize(summarizer.as_ref(), candidate, report).await,
            None => String::new(),
        };

        let swap_link = build_swap_link(candidate.token_address(), &self.cfg.referral_wallet);
        let row = SignalRow::from_candidate(candidate, swap_link, summary, Utc::now());

        let Some(store) = &self.store else {
            info!(token = %row.token_address, "Signal (not saved): {row:?}");
            return;
        };
        match store.upsert(&row).await {
            Ok(()) => {
                report.saved += 1;
                info!(store = store.name(), "Saved signal: {}", row.token_name);
            }
            Err(e) => {
                report.save_failures += 1;
                error!(store = store.name(), token = %row.token_address, "Signal save failed: {e}");
            }
        }
    }

    async fn summarize(&self, summarizer: &dyn Summarizer, candidate: &Candidate, report: &mut ScanReport) -> String {
        let req = SummaryRequest {
            name: candidate.token_name(),
            symbol: candidate.token_symbol(),
            price_change_24h: candidate.price_change_24h,
            volume_24h: candidate.volume_24h,
        };
        match summarizer.summarize(&req).await {
            Ok(summary) => {
                report.summarized += 1;
                info!("  summary: {summary}");
                summary
            }
            Err(e) => {
                error!(token = %candidate.token_address(), "Summary call failed: {e}");
                String::new()
            }
        }
    }

    async fn cleanup(&self) -> Option<u64> {
        let store = self.store.as_ref()?;
        match store.delete_older_than(stale_cutoff(Utc::now())).await {
            Ok(removed) => {
                if removed > 0 {
                    info!("[CLEANUP] removed {removed} signal(s) older than {SIGNAL_TTL_HOURS}h");
                }
                Some(removed)
            }
            Err(e) => {
                error!("[CLEANUP] failed: {e}");
                None
            }
        }
    }
}

fn log_rank_stats(stats: &RankStats, selected: usize) {
    info!(
        "[FILTER] selected {} top gainers from {} eligible (of {} pairs)",
        selected, stats.eligible, stats.evaluated,
    );
    info!(
        "[FILTER] rejected: chain={} low_liquidity={} low_volume={} no_change={} no_gain={}",
        stats.rejected_chain,
        stats.rejected_low_liquidity,
        stats.rejected_low_volume,
        stats.rejected_no_change,
        stats.rejected_no_gain,
    );
}
