//! [`CacheStore`] backends: a PostgreSQL table with an expiry column and an
//! in-process map.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use sqlx::PgPool;
use tokio::time::Instant;

use geopoi_core::traits::CacheStore;
use geopoi_core::{Error, Result};

pub const CACHE_TABLE: &str = "geopoi_cache";

fn cache_err(e: sqlx::Error) -> Error { Error::Cache(e.to_string()) }

pub struct PgCacheStore {
    pool: PgPool,
}

impl PgCacheStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {CACHE_TABLE} (\
             cache_key TEXT PRIMARY KEY, \
             payload BYTEA NOT NULL, \
             expires_at TIMESTAMPTZ NOT NULL)"
        ))
        .execute(&self.pool)
        .await
        .map_err(cache_err)?;
        Ok(())
    }

    /// Delete expired rows; returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let done = sqlx::query(&format!("DELETE FROM {CACHE_TABLE} WHERE expires_at <= $1"))
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(cache_err)?;
        Ok(done.rows_affected())
    }
}

#[async_trait]
impl CacheStore for PgCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        sqlx::query_scalar::<_, Vec<u8>>(&format!(
            "SELECT payload FROM {CACHE_TABLE} WHERE cache_key = $1 AND expires_at > $2"
        ))
        .bind(key)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(cache_err)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| Error::Cache(e.to_string()))?;
        sqlx::query(&format!(
            "INSERT INTO {CACHE_TABLE} (cache_key, payload, expires_at) VALUES ($1, $2, $3) \
             ON CONFLICT (cache_key) DO UPDATE SET payload = EXCLUDED.payload, expires_at = EXCLUDED.expires_at"
        ))
        .bind(key)
        .bind(value)
        .bind(Utc::now() + ttl)
        .execute(&self.pool)
        .await
        .map_err(cache_err)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query(&format!("DELETE FROM {CACHE_TABLE} WHERE cache_key = $1"))
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(cache_err)?;
        Ok(())
    }
}

/// Expired entries are invisible to `get` and removed lazily.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, (Vec<u8>, Instant)>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self { Self::default() }

    /// Live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().values().filter(|(_, exp)| *exp > now).count()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().get(key).is_some_and(|(_, exp)| *exp > Instant::now())
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        if let Some((value, expires)) = self.entries.read().get(key) {
            if *expires > now {
                return Ok(Some(value.clone()));
            }
        } else {
            return Ok(None);
        }
        self.entries.write().retain(|_, (_, exp)| *exp > now);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.entries.write().insert(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
