use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};

use super::connection::AppError;
use super::AppState;
use crate::generators::{MarkdownDocsGenerator, MermaidErdGenerator};
use crate::models::{
    DocsRequest, SchemaRequest, SchemaSnapshot, SchemaVisualization, TableDescriptor,
    TableRequest,
};
use crate::services::{MetadataService, DEFAULT_SCHEMA};
use crate::utils::error::AppError as ServiceError;

/// 获取基础表列表
pub async fn list_tables(
    State(state): State<AppState>,
    Json(request): Json<SchemaRequest>,
) -> Result<Json<Vec<String>>, AppError> {
    let pool = state.pool_for(request.validated_url()?).await?;
    let tables = MetadataService::list_tables(&pool, DEFAULT_SCHEMA).await?;
    Ok(Json(tables))
}

/// 内省整个 public schema
pub async fn introspect(
    State(state): State<AppState>,
    Json(request): Json<SchemaRequest>,
) -> Result<Json<SchemaSnapshot>, AppError> {
    let pool = state.pool_for(request.validated_url()?).await?;
    let snapshot = MetadataService::extract_schema(&pool).await?;
    Ok(Json(snapshot))
}

/// 获取单表结构
pub async fn get_table(
    State(state): State<AppState>,
    Json(request): Json<TableRequest>,
) -> Result<Json<TableDescriptor>, AppError> {
    let pool = state.pool_for(request.target.validated_url()?).await?;

    let tables = MetadataService::list_tables(&pool, DEFAULT_SCHEMA).await?;
    if !tables.contains(&request.table) {
        return Err(ServiceError::NotFound(format!("Table {} not found", request.table)).into());
    }

    let table = MetadataService::describe_table(&pool, DEFAULT_SCHEMA, &request.table).await?;
    Ok(Json(table))
}

/// 生成 ER 图
pub async fn visualize(
    State(state): State<AppState>,
    Json(request): Json<SchemaRequest>,
) -> Result<Json<SchemaVisualization>, AppError> {
    let pool = state.pool_for(request.validated_url()?).await?;
    let snapshot = MetadataService::extract_schema(&pool).await?;

    Ok(Json(SchemaVisualization {
        relationships: snapshot.relationships(),
        mermaid: MermaidErdGenerator::generate(&snapshot),
        snapshot,
    }))
}

/// 生成 Markdown 文档
pub async fn generate_docs(
    State(state): State<AppState>,
    Json(request): Json<DocsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let url = request.target.validated_url()?;
    let pool = state.pool_for(url).await?;
    let snapshot = MetadataService::extract_schema(&pool).await?;

    let title = request
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| database_name(url));
    let doc = MarkdownDocsGenerator::generate(&snapshot, &title);

    Ok(([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], doc))
}

/// 连接串中的数据库名，用作默认标题
fn database_name(url: &str) -> String {
    url.split('?')
        .next()
        .and_then(|base| base.rsplit_once('/'))
        .map(|(prefix, name)| (prefix, name.trim()))
        .filter(|(prefix, name)| !name.is_empty() && !prefix.ends_with('/'))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| "Database schema".to_string())
}
