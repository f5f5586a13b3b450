//! 失败处理策略与命令状态机
//!
//! 每个失败的逻辑操作经历 `Fresh → Retried1 → Retried2 → Logged`，
//! 状态由命令本身携带，策略只根据 (策略, 状态) 决定下一步。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 命令在失败处理链中的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandState {
    /// 原始命令，尚未失败过
    #[default]
    Fresh,
    /// 第一次重试包装
    Retried1,
    /// 第二次重试包装
    Retried2,
    /// 终态：已记录日志
    Logged,
}

impl CommandState {
    /// 是否为重试包装
    pub fn is_retry(self) -> bool {
        matches!(self, Self::Retried1 | Self::Retried2)
    }
}

/// 策略决定的下一步
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// 以给定状态重新入队原始命令
    Retry(CommandState),
    /// 入队日志命令
    Log,
}

/// 异常处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    /// 只记录日志
    LogOnly,
    /// 无限重试
    RetryForever,
    /// 重试一次后记录日志
    #[default]
    RetryOnceThenLog,
    /// 重试两次后记录日志
    RetryTwiceThenLog,
}

impl RetryPolicy {
    /// 所有策略
    pub const ALL: [RetryPolicy; 4] = [
        Self::LogOnly,
        Self::RetryForever,
        Self::RetryOnceThenLog,
        Self::RetryTwiceThenLog,
    ];

    /// 纯函数：给定失败命令的状态，返回下一步
    pub const fn transition(self, state: CommandState) -> Transition {
        use CommandState::{Fresh, Retried1};

        match (self, state) {
            (Self::LogOnly, _) => Transition::Log,
            (Self::RetryForever, _) => Transition::Retry(Retried1),
            (Self::RetryOnceThenLog, Fresh) => Transition::Retry(Retried1),
            // 只有两级：任何重试包装再失败都记录日志
            (Self::RetryOnceThenLog, _) => Transition::Log,
            (Self::RetryTwiceThenLog, Fresh) => Transition::Retry(Retried1),
            (Self::RetryTwiceThenLog, Retried1) => Transition::Retry(CommandState::Retried2),
            (Self::RetryTwiceThenLog, _) => Transition::Log,
        }
    }

    /// 配置中使用的名称
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LogOnly => "log_only",
            Self::RetryForever => "retry_forever",
            Self::RetryOnceThenLog => "retry_once_then_log",
            Self::RetryTwiceThenLog => "retry_twice_then_log",
        }
    }
}

impl fmt::Display for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RetryPolicy {
    type Err = crate::errors::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s)
            .ok_or_else(|| crate::errors::ConfigError::validation(format!("未知的处理策略: {}", s)))
    }
}
