use std::collections::HashSet;

use crate::config::{Config, CHAIN_ID};
use crate::types::{Candidate, PairRecord};

/// Concatenate source outputs in the order given and keep the first pair
/// seen for each base token. Pairs without a base token address are dropped.
pub fn merge_pairs<I>(sources: I) -> Vec<PairRecord>
where
    I: IntoIterator<Item = Vec<PairRecord>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    sources
        .into_iter()
        .flatten()
        .filter(|p| !p.base_token.address.is_empty())
        .filter(|p| seen.insert(p.base_token.address.clone()))
        .collect()
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RankStats {
    pub evaluated: usize,
    pub rejected_chain: usize,
    pub rejected_low_liquidity: usize,
    pub rejected_low_volume: usize,
    pub rejected_no_change: usize,
    pub rejected_no_gain: usize,
    /// Passed every filter, before truncation to top N.
    pub eligible: usize,
}

enum Rejection {
    Chain,
    LowLiquidity,
    LowVolume,
    NoChange,
    NoGain,
}

fn check_pair(pair: &PairRecord, cfg: &Config) -> std::result::Result<f64, Rejection> {
    if pair.chain_id != CHAIN_ID {
        return Err(Rejection::Chain);
    }
    if pair.liquidity_usd < cfg.min_liquidity_usd {
        return Err(Rejection::LowLiquidity);
    }
    if pair.volume_24h_usd < cfg.min_volume_24h {
        return Err(Rejection::LowVolume);
    }
    let change = pair.price_change_24h_pct.ok_or(Rejection::NoChange)?;
    if cfg.require_gain && change <= 0.0 {
        return Err(Rejection::NoGain);
    }
    Ok(change)
}

/// Apply the liquidity / volume / momentum filters and keep the top N by
/// 24h change, highest first. Equal changes keep their input order.
pub fn select_top_gainers(pairs: &[PairRecord], cfg: &Config) -> (Vec<Candidate>, RankStats) {
    let mut stats = RankStats {
        evaluated: pairs.len(),
        ..RankStats::default()
    };
    let mut candidates = Vec::new();

    for pair in pairs {
        match check_pair(pair, cfg) {
            Ok(change) => candidates.push(Candidate {
                pair: pair.clone(),
                price_change_24h: change,
                liquidity_usd: pair.liquidity_usd,
                volume_24h: pair.volume_24h_usd,
            }),
            Err(Rejection::Chain) => stats.rejected_chain += 1,
            Err(Rejection::LowLiquidity) => stats.rejected_low_liquidity += 1,
            Err(Rejection::LowVolume) => stats.rejected_low_volume += 1,
            Err(Rejection::NoChange) => stats.rejected_no_change += 1,
            Err(Rejection::NoGain) => stats.rejected_no_gain += 1,
        }
    }
    stats.eligible = candidates.len();

    // sort_by is stable
    candidates.sort_by(|a, b| b.price_change_24h.total_cmp(&a.price_change_24h));
    candidates.truncate(cfg.top_n);

    (candidates, stats)
}
