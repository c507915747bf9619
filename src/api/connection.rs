use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::AppState;
use crate::models::{CacheStats, ConnectionTestResult, SchemaRequest};
use crate::services::ConnectionService;
use crate::utils::error::AppError as ServiceError;

/// 测试 PostgreSQL 连接
pub async fn test_connection(
    Json(request): Json<SchemaRequest>,
) -> Result<Json<ConnectionTestResult>, AppError> {
    let url = request.validated_url()?;
    let result = ConnectionService::test_connection(url).await?;
    Ok(Json(result))
}

/// 连接缓存状态
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats().await)
}

/// 移除并关闭某个连接串的缓存连接池
pub async fn evict_connection(
    State(state): State<AppState>,
    Json(request): Json<SchemaRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let url = request.validated_url()?;
    let evicted = state.cache.get(url).await.is_some();
    state.cache.invalidate(url).await;
    Ok(Json(json!({ "evicted": evicted })))
}

/// Axum 错误处理
pub struct AppError(ServiceError);

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Connection(_) | ServiceError::SchemaIntrospection(_) => {
                StatusCode::BAD_GATEWAY
            }
            ServiceError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<ServiceError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
