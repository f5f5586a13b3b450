//! 错误类型定义

use thiserror::Error;

/// 装箱的底层错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置解析失败: {source}")]
    ParseError { source: BoxError },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(source: config::ConfigError) -> Self {
        Self::ParseError {
            source: Box::new(source),
        }
    }
}

/// 依赖解析错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("依赖未找到: {key}")]
    NotFound { key: String },

    #[error("依赖类型不匹配: {key}, 期望 {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("依赖参数无效: {key}, 原因: {message}")]
    InvalidArguments { key: String, message: String },

    #[error("依赖创建失败: {key}, 原因: {source}")]
    FactoryFailed { key: String, source: BoxError },
}

impl DependencyError {
    /// 创建依赖未找到错误
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// 创建类型不匹配错误
    pub fn type_mismatch<T: ?Sized>(key: impl Into<String>) -> Self {
        Self::TypeMismatch {
            key: key.into(),
            expected: std::any::type_name::<T>(),
        }
    }

    /// 创建参数无效错误
    pub fn invalid_arguments(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            key: key.into(),
            message: message.into(),
        }
    }

    /// 创建工厂失败错误
    pub fn factory_failed(key: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::FactoryFailed {
            key: key.into(),
            source: source.into(),
        }
    }

    /// 出错的依赖键
    pub fn key(&self) -> &str {
        match self {
            Self::NotFound { key }
            | Self::TypeMismatch { key, .. }
            | Self::InvalidArguments { key, .. }
            | Self::FactoryFailed { key, .. } => key,
        }
    }

    /// 是否为依赖未找到
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// 命令错误类别，用作异常处理器的分派键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandErrorKind {
    /// 命令自身执行失败
    ExecutionFailed,
    /// 未配置异常处理器
    HandlerNotConfigured,
    /// 后续命令队列不可用
    QueueUnavailable,
    /// 命令执行过程中依赖解析失败
    Dependency,
}

/// 命令执行错误类型
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("命令执行失败: {command}, 原因: {source}")]
    ExecutionFailed { command: String, source: BoxError },

    #[error("命令未配置异常处理器: {command}, 原始错误: {source}")]
    HandlerNotConfigured {
        command: String,
        source: Box<CommandError>,
    },

    #[error("后续命令队列不可用")]
    QueueUnavailable,

    #[error("依赖解析失败: {source}")]
    Dependency {
        #[from]
        source: DependencyError,
    },
}

impl CommandError {
    /// 创建执行失败错误
    pub fn failed(command: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::ExecutionFailed {
            command: command.into(),
            source: source.into(),
        }
    }

    /// 创建未配置处理器错误
    pub fn handler_not_configured(command: impl Into<String>, source: CommandError) -> Self {
        Self::HandlerNotConfigured {
            command: command.into(),
            source: Box::new(source),
        }
    }

    /// 错误类别
    pub fn kind(&self) -> CommandErrorKind {
        match self {
            Self::ExecutionFailed { .. } => CommandErrorKind::ExecutionFailed,
            Self::HandlerNotConfigured { .. } => CommandErrorKind::HandlerNotConfigured,
            Self::QueueUnavailable => CommandErrorKind::QueueUnavailable,
            Self::Dependency { .. } => CommandErrorKind::Dependency,
        }
    }

    /// 致命错误不进入重试流程，直接向调用方传播
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::HandlerNotConfigured { .. } | Self::QueueUnavailable
        )
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("命令错误: {source}")]
    CommandError {
        #[from]
        source: CommandError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
/// 依赖操作结果
pub type DependencyResult<T> = Result<T, DependencyError>;
/// 命令操作结果
pub type CommandResult<T> = Result<T, CommandError>;
/// 基础设施操作结果
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
