//! Network backend on Redis.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use glob::Pattern;
use parking_lot::Mutex;
use redis::aio::ConnectionManager;
use redis::{RedisError, Script};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::CacheBackend;
use crate::error::CacheError;

const BACKEND_NAME: &str = "redis";

// KEYS + DEL in one script so the deletion is atomic for other clients.
// DEL is issued in batches to stay under Lua's unpack limit.
const DELETE_PATTERN_SCRIPT: &str = r#"
local keys = redis.call('KEYS', ARGV[1])
local removed = 0
for i = 1, #keys, 500 do
    local last = math.min(i + 499, #keys)
    removed = removed + redis.call('DEL', unpack(keys, i, last))
end
return removed
"#;

/// Cache backend on a Redis server.
///
/// The connection is opened lazily on first use and at most once: concurrent
/// first callers wait on the same attempt. A failed attempt is remembered
/// and further attempts are refused until `reconnect_backoff` has passed,
/// so a dead server costs one connect timeout per backoff window rather
/// than one per request. Once connected, the connection manager reconnects
/// on its own.
pub struct RedisBackend {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
    connect_timeout: Duration,
    reconnect_backoff: Duration,
    last_failure: Mutex<Option<Instant>>,
    delete_pattern_script: Script,
}

impl RedisBackend {
    /// Creates a backend for `url` without connecting.
    ///
    /// Only a malformed URL fails here; an unreachable server is reported
    /// by the first operation.
    pub fn new(
        url: &str,
        connect_timeout: Duration,
        reconnect_backoff: Duration,
    ) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(unavailable)?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            connect_timeout,
            reconnect_backoff,
            last_failure: Mutex::new(None),
            delete_pattern_script: Script::new(DELETE_PATTERN_SCRIPT),
        })
    }

    /// Whether a connection has been established.
    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        if let Some(conn) = self.connection.get() {
            return Ok(conn.clone());
        }

        let backing_off = self
            .last_failure
            .lock()
            .is_some_and(|failed_at| failed_at.elapsed() < self.reconnect_backoff);
        if backing_off {
            return Err(CacheError::unavailable(
                BACKEND_NAME,
                "previous connection attempt failed, backing off",
            ));
        }

        // Disarmed only on success, so an attempt dropped by the caller's
        // timeout still starts the backoff window.
        let mut failure = FailureStamp::armed(&self.last_failure);
        let result = self
            .connection
            .get_or_try_init(|| async {
                info!("Connecting to redis");
                match tokio::time::timeout(
                    self.connect_timeout,
                    ConnectionManager::new(self.client.clone()),
                )
                .await
                {
                    Ok(Ok(conn)) => Ok(conn),
                    Ok(Err(e)) => Err(unavailable(e)),
                    Err(_) => Err(CacheError::Timeout {
                        operation: "connect",
                        millis: self.connect_timeout.as_millis() as u64,
                    }),
                }
            })
            .await;

        match result {
            Ok(conn) => {
                failure.disarm();
                *self.last_failure.lock() = None;
                Ok(conn.clone())
            },
            Err(e) => {
                warn!(error = %e, backoff_ms = self.reconnect_backoff.as_millis() as u64, "Redis connection failed");
                Err(e)
            },
        }
    }
}

/// Records a failed connect on drop unless disarmed.
struct FailureStamp<'a> {
    slot: &'a Mutex<Option<Instant>>,
    armed: bool,
}

impl<'a> FailureStamp<'a> {
    fn armed(slot: &'a Mutex<Option<Instant>>) -> Self {
        Self { slot, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for FailureStamp<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.slot.lock() = Some(Instant::now());
        }
    }
}

fn unavailable(err: RedisError) -> CacheError {
    CacheError::unavailable(BACKEND_NAME, err.to_string())
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let millis = ttl.as_millis().max(1) as u64;
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(millis)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection().await?;
        let removed: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(removed > 0)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        // Mismo dialecto de glob que el backend en memoria
        Pattern::new(pattern).map_err(|e| CacheError::invalid_pattern(pattern, e.to_string()))?;

        let mut conn = self.connection().await?;
        let removed: i64 = self
            .delete_pattern_script
            .arg(pattern)
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(removed.max(0) as usize)
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    fn name(&self) -> &str {
        BACKEND_NAME
    }
}
