pub mod models;
pub mod rest;
pub mod sqlite;
pub mod store;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;

pub use rest::RestSignalStore;
pub use sqlite::SqliteSignalStore;
pub use store::{stale_cutoff, SignalStore};

/// Pick the configured sink: Supabase when its credentials are set, else a
/// local SQLite file, else none (signals are logged but not saved).
pub async fn open_store(cfg: &Config, client: &reqwest::Client) -> Result<Option<Arc<dyn SignalStore>>> {
    if let Some((url, key)) = cfg.supabase() {
        info!("Signals will be saved to Supabase at {url}");
        return Ok(Some(Arc::new(RestSignalStore::new(client.clone(), url, key))));
    }
    if let Some(path) = &cfg.db_path {
        let store = SqliteSignalStore::connect(path).await?;
        info!("Database ready at {path}");
        return Ok(Some(Arc::new(store)));
    }
    warn!("No store configured (SUPABASE_URL/SUPABASE_KEY or DB_PATH): signals will NOT be saved.");
    Ok(None)
}
