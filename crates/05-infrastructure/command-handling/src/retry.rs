//! 重试包装命令与日志命令

use chrono::{DateTime, Utc};
use di_abstractions::{Command, CommandRef};
use infrastructure_common::{CommandError, CommandState};
use tracing::error;

/// 重试包装
///
/// 状态为 [`CommandState::Retried1`] 或 [`CommandState::Retried2`]。
/// 执行时原样执行原始命令并传播其失败，由外层的保护命令再次交给处理器。
pub struct RetryCommand {
    state: CommandState,
    inner: CommandRef,
}

impl RetryCommand {
    /// 以指定状态包装
    pub fn new(state: CommandState, inner: CommandRef) -> Self {
        debug_assert!(state.is_retry(), "重试包装的状态必须是重试状态");
        Self { state, inner }
    }

    /// 第一次重试
    pub fn first(inner: CommandRef) -> Self {
        Self::new(CommandState::Retried1, inner)
    }

    /// 第二次重试
    pub fn second(inner: CommandRef) -> Self {
        Self::new(CommandState::Retried2, inner)
    }

    /// 被包装的原始命令
    pub fn inner(&self) -> &CommandRef {
        &self.inner
    }
}

impl Command for RetryCommand {
    fn execute(&self) -> Result<(), CommandError> {
        self.inner.execute()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn state(&self) -> CommandState {
        self.state
    }

    fn original(&self) -> Option<&CommandRef> {
        Some(&self.inner)
    }
}

/// 日志命令，处理链的终态
///
/// 执行时输出一条错误日志，永不失败，也不再产出后续命令。
pub struct LogCommand {
    error: CommandError,
    command: CommandRef,
    captured_at: DateTime<Utc>,
}

impl LogCommand {
    /// 记录 `command` 的失败 `error`，捕获时间取当前时间
    pub fn new(error: CommandError, command: CommandRef) -> Self {
        Self {
            error,
            command,
            captured_at: Utc::now(),
        }
    }

    /// 被记录的错误
    pub fn error(&self) -> &CommandError {
        &self.error
    }

    /// 出错的原始命令
    pub fn command(&self) -> &CommandRef {
        &self.command
    }

    /// 错误被捕获的时间
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

impl Command for LogCommand {
    fn execute(&self) -> Result<(), CommandError> {
        error!(
            command = %self.command.name(),
            error = %self.error,
            kind = ?self.error.kind(),
            captured_at = %self.captured_at,
            "命令最终失败"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "LogCommand"
    }

    fn state(&self) -> CommandState {
        CommandState::Logged
    }

    fn original(&self) -> Option<&CommandRef> {
        Some(&self.command)
    }
}
