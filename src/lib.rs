pub mod config;
pub mod db;
pub mod enricher;
pub mod error;
pub mod fetcher;
pub mod scanner;
pub mod scorer;
pub mod swap_link;
pub mod types;
