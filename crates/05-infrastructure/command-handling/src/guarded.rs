//! 受保护的命令执行

use di_abstractions::{Command, CommandRef, HandlerRef};
use infrastructure_common::{CommandError, CommandResult};
use tracing::{debug, warn};

/// 一次受保护执行的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// 内部命令执行成功
    Completed,
    /// 内部命令失败，已交给异常处理器
    Handled,
}

/// 受保护命令
///
/// 内部命令失败时不向外传播，而是交给异常处理器。
/// 没有配置处理器时，失败以 [`CommandError::HandlerNotConfigured`] 向外传播；
/// 致命错误总是直接向外传播。
pub struct GuardedCommand {
    inner: CommandRef,
    handler: Option<HandlerRef>,
}

impl GuardedCommand {
    /// 带处理器的保护命令
    pub fn new(inner: CommandRef, handler: HandlerRef) -> Self {
        Self {
            inner,
            handler: Some(handler),
        }
    }

    /// 尚未配置处理器的保护命令
    pub fn unguarded(inner: CommandRef) -> Self {
        Self {
            inner,
            handler: None,
        }
    }

    /// 设置处理器
    pub fn with_handler(mut self, handler: HandlerRef) -> Self {
        self.handler = Some(handler);
        self
    }

    /// 被保护的命令
    pub fn inner(&self) -> &CommandRef {
        &self.inner
    }

    /// 是否已配置处理器
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// 执行并报告内部命令是成功还是已被处理
    pub fn run(&self) -> CommandResult<GuardOutcome> {
        let error = match self.inner.execute() {
            Ok(()) => return Ok(GuardOutcome::Completed),
            Err(error) => error,
        };

        if error.is_fatal() {
            return Err(error);
        }

        let Some(handler) = &self.handler else {
            warn!(command = %self.inner.name(), "命令失败但未配置异常处理器");
            return Err(CommandError::handler_not_configured(
                self.inner.name(),
                error,
            ));
        };

        debug!(
            command = %self.inner.name(),
            state = ?self.inner.state(),
            kind = ?error.kind(),
            "命令失败，交给异常处理器"
        );
        handler.handle(error, self.inner.clone())?;
        Ok(GuardOutcome::Handled)
    }
}

impl Command for GuardedCommand {
    fn execute(&self) -> Result<(), CommandError> {
        self.run().map(|_| ())
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
