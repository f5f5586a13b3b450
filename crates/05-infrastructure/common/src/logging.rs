//! 日志系统初始化

use crate::configuration::LoggingSettings;
use crate::errors::{InfrastructureError, InfrastructureResult};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 按配置初始化全局 tracing 订阅者
///
/// `RUST_LOG` 存在时优先于配置中的级别。重复初始化返回错误而不是 panic。
pub fn init_tracing(settings: &LoggingSettings) -> InfrastructureResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| InfrastructureError::BootstrapFailed {
            message: format!("日志过滤器无效: {}", e),
        })?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(settings.show_target)
        .with_thread_ids(settings.show_thread_ids);

    if settings.json {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    }
    .map_err(|e| InfrastructureError::BootstrapFailed {
        message: format!("日志初始化失败: {}", e),
    })?;

    info!("日志系统初始化完成");
    Ok(())
}
