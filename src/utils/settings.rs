use crate::utils::error::Result;
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 服务配置
///
/// 加载顺序：内置默认值 -> `schema_lens.toml`（可选）-> `SCHEMA_LENS_*` 环境变量 -> `PORT`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub cache: CacheSettings,
    pub pool: PoolSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// 连接缓存配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// 最多缓存的连接串数量
    pub capacity: u64,
    /// 空闲多久后淘汰（秒）
    pub idle_timeout_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: 64,
            idle_timeout_secs: 600,
        }
    }
}

impl CacheSettings {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// 每个外部数据库连接池的配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            min_connections: 0,
            max_connections: 10,
            acquire_timeout_secs: 10,
        }
    }
}

impl PoolSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl Settings {
    /// 从配置文件和环境变量加载
    pub fn load() -> Result<Self> {
        let path = std::env::var("SCHEMA_LENS_CONFIG").unwrap_or_else(|_| "schema_lens".to_string());

        let builder = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("SCHEMA_LENS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut settings = Self::from_builder(builder)?;

        // 兼容常见的 PORT 环境变量
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            settings.server.port = port;
        }

        tracing::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }
}
