pub mod ranker;

pub use ranker::{merge_pairs, select_top_gainers, RankStats};
