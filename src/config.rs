use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::error::{BtcError, Result};
use crate::keys::Network;

// 指定配置文件路径的环境变量
pub const CONFIG_ENV: &str = "BTC_CODEC_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: Network,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            network: Network::Testnet,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    // 从环境变量指定的文件加载配置。未设置环境变量且默认文件不存在时使用默认配置
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path),
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            Err(_) => Ok(Config::default()),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path).map_err(|e| {
            BtcError::ConfigError(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&config_str)
            .map_err(|e| BtcError::ConfigError(format!("配置文件格式错误: {}", e)))?;
        config.log_level()?;
        Ok(config)
    }

    pub fn log_level(&self) -> Result<tracing::Level> {
        tracing::Level::from_str(&self.log_level)
            .map_err(|_| BtcError::ConfigError(format!("无效的日志级别: {}", self.log_level)))
    }
}
