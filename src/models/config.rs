use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, Result};

/// 项目所用的数据库类型
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String")]
pub enum DbEngine {
    #[default]
    #[serde(rename = "postgresql")]
    PostgreSql,
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "mongodb")]
    MongoDb,
    #[serde(rename = "sqlite")]
    Sqlite,
}

impl TryFrom<String> for DbEngine {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        DbEngine::from_str(&s).ok_or_else(|| format!("Unknown db_type: {}", s))
    }
}

impl DbEngine {
    pub fn as_str(&self) -> &str {
        match self {
            DbEngine::PostgreSql => "postgresql",
            DbEngine::MySql => "mysql",
            DbEngine::MongoDb => "mongodb",
            DbEngine::Sqlite => "sqlite",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" => Some(DbEngine::PostgreSql),
            "mysql" => Some(DbEngine::MySql),
            "mongodb" => Some(DbEngine::MongoDb),
            "sqlite" => Some(DbEngine::Sqlite),
            _ => None,
        }
    }

    pub fn supports_introspection(&self) -> bool {
        matches!(self, DbEngine::PostgreSql)
    }
}

/// 指向外部数据库的请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaRequest {
    pub db_url: String,
    #[serde(default)]
    pub db_type: DbEngine,
}

impl SchemaRequest {
    /// 校验并返回连接串
    pub fn validated_url(&self) -> Result<&str> {
        let url = self.db_url.trim();
        if url.is_empty() {
            return Err(AppError::InvalidInput("db_url is required".to_string()));
        }
        if !self.db_type.supports_introspection() {
            return Err(AppError::InvalidInput(format!(
                "Schema introspection supports only postgresql, got {}",
                self.db_type.as_str()
            )));
        }
        // 缓存按原始文本区分连接串，这里不做规范化
        Ok(&self.db_url)
    }
}

/// 单表结构请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRequest {
    #[serde(flatten)]
    pub target: SchemaRequest,
    pub table: String,
}

/// 文档生成请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsRequest {
    #[serde(flatten)]
    pub target: SchemaRequest,
    pub title: Option<String>,
}

/// 连接测试结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

impl ConnectionTestResult {
    pub fn success() -> Self {
        Self {
            success: true,
            message: "Connection successful".to_string(),
            error: None,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            message: "Connection failed".to_string(),
            error: Some(error),
        }
    }
}

/// 连接缓存状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub capacity: u64,
}
