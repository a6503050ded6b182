use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::db::models::StoredSignal;
use crate::db::store::SignalStore;
use crate::error::Result;
use crate::types::SignalRow;

const SELECT_SIGNALS: &str = r#"
    SELECT token_address, pair_address, liquidity_eth, initial_price, swap_link,
           token_name, token_summary, price_change_pct, volume_24h, market_cap,
           dex_url, updated_at
    FROM signals
"#;

/// Local `signals` table backed by a SQLite file.
#[derive(Clone)]
pub struct SqliteSignalStore {
    pool: SqlitePool,
}

impl SqliteSignalStore {
    /// Open (creating if needed) the database file and apply migrations.
    pub async fn connect(db_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// Single-connection in-memory database; every connection would otherwise
    /// see its own empty database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SignalStore for SqliteSignalStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn upsert(&self, row: &SignalRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO signals (
                token_address, pair_address, liquidity_eth, initial_price, swap_link,
                token_name, token_summary, price_change_pct, volume_24h, market_cap,
                dex_url, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(token_address) DO UPDATE SET
                pair_address = excluded.pair_address,
                liquidity_eth = excluded.liquidity_eth,
                initial_price = excluded.initial_price,
                swap_link = excluded.swap_link,
                token_name = excluded.token_name,
                token_summary = excluded.token_summary,
                price_change_pct = excluded.price_change_pct,
                volume_24h = excluded.volume_24h,
                market_cap = excluded.market_cap,
                dex_url = excluded.dex_url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&row.token_address)
        .bind(&row.pair_address)
        .bind(row.liquidity_usd)
        .bind(row.initial_price)
        .bind(&row.swap_link)
        .bind(&row.token_name)
        .bind(&row.token_summary)
        .bind(row.price_change_pct)
        .bind(row.volume_24h)
        .bind(row.market_cap)
        .bind(&row.dex_url)
        .bind(row.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM signals WHERE updated_at < ?")
            .bind(cutoff.timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM signals")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    async fn list(&self) -> Result<Vec<SignalRow>> {
        let rows = sqlx::query_as::<_, StoredSignal>(&format!(
            "{SELECT_SIGNALS} ORDER BY price_change_pct DESC, token_address"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SignalRow::from).collect())
    }
}
