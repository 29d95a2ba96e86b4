use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ADBError, ADBResult};

/// 覆盖 ADB 可执行文件路径的环境变量
pub const ENV_ADB_PATH: &str = "ADB_PATH";
/// 覆盖命令超时（毫秒）的环境变量
pub const ENV_ADB_TIMEOUT_MS: &str = "ADB_TIMEOUT_MS";

/// ADB 配置结构体
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ADBConfig {
    /// ADB 可执行文件路径
    pub path: PathBuf,
    /// 单次命令超时（毫秒）
    pub timeout: u64,
    /// 用户主目录下默认的输出目录名
    pub output_dir_name: String,
    /// 日志文件名前缀
    pub file_prefix: String,
}

impl Default for ADBConfig {
    fn default() -> Self {
        ADBConfig {
            path: PathBuf::from("adb"),
            timeout: 30000, // 30秒超时
            output_dir_name: "ivi_logs".to_string(),
            file_prefix: "ivi_logcat".to_string(),
        }
    }
}

impl ADBConfig {
    /// 创建配置构建器
    pub fn builder() -> ADBConfigBuilder {
        ADBConfigBuilder::default()
    }

    /// 在默认配置上应用环境变量覆盖
    pub fn from_env() -> ADBResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> ADBResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = ADBConfig::builder();

        if let Some(path) = lookup(ENV_ADB_PATH).filter(|p| !p.trim().is_empty()) {
            builder = builder.path(path.trim());
        }

        if let Some(raw) = lookup(ENV_ADB_TIMEOUT_MS) {
            let timeout = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|t| *t > 0)
                .ok_or_else(|| {
                    ADBError::ConfigError(format!("{} 必须是正整数: {}", ENV_ADB_TIMEOUT_MS, raw))
                })?;
            builder = builder.timeout(timeout);
        }

        Ok(builder.build())
    }

    /// 超时时长
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
}

/// ADB 配置构建器
#[derive(Default)]
pub struct ADBConfigBuilder {
    path: Option<PathBuf>,
    timeout: Option<u64>,
    output_dir_name: Option<String>,
    file_prefix: Option<String>,
}

impl ADBConfigBuilder {
    /// 设置 ADB 可执行文件路径
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// 设置操作超时（毫秒）
    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 设置默认输出目录名
    pub fn output_dir_name(mut self, name: &str) -> Self {
        self.output_dir_name = Some(name.to_string());
        self
    }

    /// 设置日志文件名前缀
    pub fn file_prefix(mut self, prefix: &str) -> Self {
        self.file_prefix = Some(prefix.to_string());
        self
    }

    /// 构建 ADB 配置
    pub fn build(self) -> ADBConfig {
        let default = ADBConfig::default();

        ADBConfig {
            path: self.path.unwrap_or(default.path),
            timeout: self.timeout.unwrap_or(default.timeout),
            output_dir_name: self.output_dir_name.unwrap_or(default.output_dir_name),
            file_prefix: self.file_prefix.unwrap_or(default.file_prefix),
        }
    }
}
