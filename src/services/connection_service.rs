use crate::db::{mask_password, schema, ConnectionCache};
use crate::models::ConnectionTestResult;
use crate::utils::error::Result;
use crate::utils::settings::PoolSettings;
use sqlx::{
    postgres::{PgConnection, PgPoolOptions},
    Connection, PgPool,
};

/// 连接服务
pub struct ConnectionService;

impl ConnectionService {
    /// 为外部数据库建立连接池，建立时即连接一次以便立即暴露连接错误
    pub async fn connect_pool(settings: &PoolSettings, url: &str) -> sqlx::Result<PgPool> {
        tracing::debug!(
            "Building pool for {} (min {}, max {})",
            mask_password(url),
            settings.min_connections,
            settings.max_connections
        );

        PgPoolOptions::new()
            .min_connections(settings.min_connections)
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout())
            .connect(url)
            .await
    }

    /// 从缓存获取连接池，没有则新建
    pub async fn pool_for(
        cache: &ConnectionCache<PgPool>,
        settings: &PoolSettings,
        url: &str,
    ) -> Result<PgPool> {
        cache
            .get_or_connect(url, Self::connect_pool(settings, url))
            .await
    }

    /// 测试连接，使用一次性连接，不进入缓存
    pub async fn test_connection(url: &str) -> Result<ConnectionTestResult> {
        tracing::info!("Testing PostgreSQL connection to {}", mask_password(url));

        match PgConnection::connect(url).await {
            Ok(mut conn) => {
                tracing::debug!("PostgreSQL connection established, testing query...");
                let result = match sqlx::query(schema::PING).execute(&mut conn).await {
                    Ok(_) => {
                        tracing::info!("PostgreSQL connection test successful");
                        ConnectionTestResult::success()
                    }
                    Err(e) => {
                        tracing::error!("PostgreSQL query test failed: {}", e);
                        ConnectionTestResult::failure(format!("Query test failed: {}", e))
                    }
                };
                let _ = conn.close().await;
                Ok(result)
            }
            Err(e) => {
                tracing::error!("PostgreSQL connection failed: {}", e);
                Ok(ConnectionTestResult::failure(format!(
                    "PostgreSQL connection failed: {}",
                    e
                )))
            }
        }
    }
}
