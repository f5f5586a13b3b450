//! # Infrastructure Common
//!
//! 基础设施层的公共类型：错误体系、作用域标识、失败处理策略、配置与日志。
//!
//! ## 核心内容
//!
//! - [`DependencyError`] / [`CommandError`] - 依赖解析与命令执行错误
//! - [`ScopeId`] - 作用域标识，`"root"` 始终存在
//! - [`RetryPolicy`] / [`CommandState`] - 失败处理状态机
//! - [`Settings`] - 分层加载的配置
//! - [`init_tracing`] - 日志初始化

pub mod configuration;
pub mod errors;
pub mod lifecycle;
pub mod logging;
pub mod policy;

pub use configuration::*;
pub use errors::*;
pub use lifecycle::*;
pub use logging::*;
pub use policy::*;
