pub mod connection;
pub mod metadata;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;

use crate::db::ConnectionCache;
use crate::services::ConnectionService;
use crate::utils::error::Result;
use crate::utils::settings::Settings;

/// 请求处理器共享的依赖
#[derive(Clone)]
pub struct AppState {
    pub cache: ConnectionCache<PgPool>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            cache: ConnectionCache::new(&settings.cache),
            settings: Arc::new(settings),
        }
    }

    /// 连接串对应的连接池（带缓存）
    pub async fn pool_for(&self, url: &str) -> Result<PgPool> {
        ConnectionService::pool_for(&self.cache, &self.settings.pool, url).await
    }
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "schema-lens",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// 创建 API 路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/api/health", get(health_check))

        // 连接管理路由
        .route("/api/connections/test", post(connection::test_connection))
        .route("/api/connections/cache", get(connection::cache_stats))
        .route("/api/connections/cache", delete(connection::evict_connection))

        // 元数据路由
        .route("/api/schema/tables", post(metadata::list_tables))
        .route("/api/schema/introspect", post(metadata::introspect))
        .route("/api/schema/table", post(metadata::get_table))
        .route("/api/schema/visualize", post(metadata::visualize))
        .route("/api/schema/docs", post(metadata::generate_docs))

        // CORS 配置
        .layer(CorsLayer::permissive())

        // 共享状态
        .with_state(state)
}
