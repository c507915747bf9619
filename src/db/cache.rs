use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use moka::notification::{ListenerFuture, RemovalCause};
use sqlx::PgPool;

use super::mask_password;
use crate::models::CacheStats;
use crate::utils::error::{AppError, Result};
use crate::utils::settings::CacheSettings;

/// 可被缓存的连接句柄，显式移除时关闭
#[async_trait]
pub trait CachedConnection: Clone + Send + Sync + 'static {
    async fn close(&self);
}

#[async_trait]
impl CachedConnection for PgPool {
    async fn close(&self) {
        PgPool::close(self).await;
    }
}

/// 按连接串缓存连接池
///
/// 键是连接串原文。容量有上限，空闲超时后淘汰；同一个键并发首次访问时只会建立一次连接，
/// 连接失败不会写入缓存。`invalidate`/`close_all` 会关闭句柄，容量或空闲淘汰只丢弃缓存引用。
#[derive(Clone)]
pub struct ConnectionCache<C: CachedConnection = PgPool> {
    entries: Cache<String, C>,
    capacity: u64,
}

impl<C: CachedConnection> ConnectionCache<C> {
    pub fn new(settings: &CacheSettings) -> Self {
        Self::with_limits(settings.capacity, settings.idle_timeout())
    }

    pub fn with_limits(capacity: u64, idle_timeout: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(idle_timeout)
            .async_eviction_listener(
                |url: Arc<String>, conn: C, cause: RemovalCause| -> ListenerFuture {
                    Box::pin(async move {
                        // 容量和空闲淘汰时请求可能仍持有句柄，只丢弃缓存里的引用，
                        // 最后一个克隆释放时连接随之释放
                        if cause != RemovalCause::Explicit {
                            tracing::debug!(
                                "Dropping cached connection for {} ({:?})",
                                mask_password(&url),
                                cause
                            );
                            return;
                        }
                        tracing::info!("Closing cached connection for {}", mask_password(&url));
                        conn.close().await;
                    })
                },
            )
            .build();

        Self { entries, capacity }
    }

    /// 获取连接串对应的句柄，不存在时用 `connect` 建立
    pub async fn get_or_connect<F, E>(&self, url: &str, connect: F) -> Result<C>
    where
        F: Future<Output = std::result::Result<C, E>>,
        E: std::fmt::Display + Send + Sync + 'static,
    {
        self.entries
            .try_get_with_by_ref(url, async {
                tracing::info!("Opening new connection pool for {}", mask_password(url));
                connect.await
            })
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to {}: {}", mask_password(url), e);
                AppError::Connection(format!(
                    "Failed to connect to {}: {}",
                    mask_password(url),
                    e
                ))
            })
    }

    /// 已缓存的句柄，不会建立新连接
    pub async fn get(&self, url: &str) -> Option<C> {
        self.entries.get(url).await
    }

    pub async fn invalidate(&self, url: &str) {
        self.entries.invalidate(url).await;
    }

    /// 关闭并移除所有缓存的连接
    pub async fn close_all(&self) {
        let urls: Vec<Arc<String>> = self.entries.iter().map(|(url, _)| url).collect();
        tracing::info!("Closing {} cached connection pools", urls.len());

        for url in urls {
            self.invalidate(&url).await;
        }
        self.entries.run_pending_tasks().await;
    }

    pub async fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks().await;
        CacheStats {
            entries: self.entries.entry_count(),
            capacity: self.capacity,
        }
    }
}
