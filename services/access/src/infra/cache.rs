use anyhow::Context as _;
use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use rahala_domain::profile::Identity;

use crate::domain::repository::SessionCache;
use crate::domain::types::{SESSION_CACHE_PREFIX, SESSION_CACHE_TTL};
use crate::error::AccessServiceError;

/// Mirror of one session's identity as JSON under `rahala:session:{id}`.
#[derive(Clone)]
pub struct RedisSessionCache {
    pub pool: Pool,
    pub key: String,
}

impl RedisSessionCache {
    pub fn for_session(pool: Pool, session_id: &str) -> Self {
        Self {
            pool,
            key: session_key(session_id),
        }
    }
}

fn session_key(session_id: &str) -> String {
    format!("{SESSION_CACHE_PREFIX}:{session_id}")
}

impl SessionCache for RedisSessionCache {
    async fn load(&self) -> Result<Option<Identity>, AccessServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AccessServiceError::Internal(e.into()))?;
        let raw: Option<String> = conn
            .get(self.key.as_str())
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| AccessServiceError::Internal(e.into()))?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let identity = serde_json::from_str(&raw).context("decode cached identity")?;
        Ok(Some(identity))
    }

    async fn store(&self, identity: &Identity) -> Result<(), AccessServiceError> {
        let json = serde_json::to_string(identity).context("encode identity for cache")?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AccessServiceError::Internal(e.into()))?;
        let (): () = conn
            .set_ex(self.key.as_str(), json, SESSION_CACHE_TTL.as_secs())
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| AccessServiceError::Internal(e.into()))?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AccessServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AccessServiceError::Internal(e.into()))?;
        let (): () = conn
            .del(self.key.as_str())
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| AccessServiceError::Internal(e.into()))?;
        Ok(())
    }
}
