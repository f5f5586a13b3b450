//! 配置定义与加载
//!
//! 配置来源按优先级从低到高：默认值、TOML 文件、`IOC__` 前缀的环境变量。

use crate::errors::{ConfigError, ConfigResult};
use crate::policy::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "IOC";

/// 环境变量层级分隔符
pub const ENV_SEPARATOR: &str = "__";

/// 顶层配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 容器配置
    pub container: ContainerSettings,
    /// 失败处理配置
    pub handling: HandlingSettings,
    /// 日志配置
    pub logging: LoggingSettings,
}

/// 容器配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// 是否以 debug 级别记录每次解析
    pub trace_resolution: bool,
    /// 容器创建时注册到全局表的字面量
    pub globals: BTreeMap<String, String>,
}

/// 失败处理配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlingSettings {
    /// 异常处理策略
    pub policy: RetryPolicy,
    /// 队列驱动单次最多执行的命令数
    pub max_drain_steps: usize,
}

impl Default for HandlingSettings {
    fn default() -> Self {
        Self {
            policy: RetryPolicy::default(),
            max_drain_steps: 1024,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// 过滤指令，如 `info` 或 `di_impl=debug,info`
    pub level: String,
    /// 是否输出 JSON
    pub json: bool,
    /// 是否显示 target
    pub show_target: bool,
    /// 是否显示线程 ID
    pub show_thread_ids: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            show_target: true,
            show_thread_ids: false,
        }
    }
}

impl Settings {
    /// 加载配置
    ///
    /// 指定路径时文件必须存在；环境变量总是叠加在文件之上。
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!("加载配置文件: {}", path.display());
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        debug!("配置加载完成: policy={}", settings.handling.policy);
        Ok(settings)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.handling.max_drain_steps == 0 {
            return Err(ConfigError::validation("handling.max_drain_steps 必须大于 0"));
        }

        tracing_subscriber::EnvFilter::try_new(&self.logging.level).map_err(|e| {
            ConfigError::validation(format!("无效的日志级别 '{}': {}", self.logging.level, e))
        })?;

        Ok(())
    }
}
