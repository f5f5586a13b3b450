//! 异常处理器
//!
//! [`PolicyHandler`] 按策略把一次失败转换为恰好一个后续命令并入队；
//! [`HandlerTable`] 按 (命令名, 错误类别) 选择具体的处理器。

use crate::queue::FollowUpSender;
use crate::retry::{LogCommand, RetryCommand};
use dashmap::DashMap;
use di_abstractions::{unwrap_original, Command, CommandRef, ExceptionHandler, HandlerRef};
use infrastructure_common::{
    CommandError, CommandErrorKind, CommandResult, CommandState, RetryPolicy, Transition,
};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// 根据策略与失败命令的状态构造后续命令
///
/// 重试包装或日志命令总是引用原始命令，包装层数不会超过一层。
pub fn follow_up_for(policy: RetryPolicy, error: CommandError, command: CommandRef) -> CommandRef {
    let state = command.state();
    let target = match state {
        CommandState::Fresh => command,
        _ => unwrap_original(command),
    };

    match policy.transition(state) {
        Transition::Retry(next) => Arc::new(RetryCommand::new(next, target)),
        Transition::Log => Arc::new(LogCommand::new(error, target)),
    }
}

/// 按策略处理失败的处理器
#[derive(Debug, Clone)]
pub struct PolicyHandler {
    policy: RetryPolicy,
    sender: FollowUpSender,
}

impl PolicyHandler {
    /// 按指定策略创建
    pub fn new(policy: RetryPolicy, sender: FollowUpSender) -> Self {
        Self { policy, sender }
    }

    /// 只记录日志
    pub fn log_only(sender: FollowUpSender) -> Self {
        Self::new(RetryPolicy::LogOnly, sender)
    }

    /// 无限重试
    pub fn retry_forever(sender: FollowUpSender) -> Self {
        Self::new(RetryPolicy::RetryForever, sender)
    }

    /// 重试一次后记录日志
    pub fn retry_once_then_log(sender: FollowUpSender) -> Self {
        Self::new(RetryPolicy::RetryOnceThenLog, sender)
    }

    /// 重试两次后记录日志
    pub fn retry_twice_then_log(sender: FollowUpSender) -> Self {
        Self::new(RetryPolicy::RetryTwiceThenLog, sender)
    }

    /// 处理策略
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// 作为共享处理器引用
    pub fn into_handler(self) -> HandlerRef {
        Arc::new(self)
    }
}

impl ExceptionHandler for PolicyHandler {
    fn handle(&self, error: CommandError, command: CommandRef) -> CommandResult<()> {
        let state = command.state();
        let follow_up = follow_up_for(self.policy, error, command);

        if follow_up.state().is_retry() {
            warn!(
                policy = %self.policy,
                from = ?state,
                to = ?follow_up.state(),
                command = %follow_up.name(),
                "命令失败，安排重试"
            );
        } else {
            debug!(policy = %self.policy, from = ?state, command = %follow_up.name(), "安排记录日志");
        }
        self.sender.enqueue(follow_up)
    }
}

/// 处理器表
///
/// 以 (原始命令名, 错误类别) 为键查找处理器，找不到时使用兜底处理器。
/// 两者都没有时返回 [`CommandError::HandlerNotConfigured`]。
#[derive(Default)]
pub struct HandlerTable {
    handlers: DashMap<(String, CommandErrorKind), HandlerRef>,
    fallback: RwLock<Option<HandlerRef>>,
}

impl HandlerTable {
    /// 创建空的处理器表
    pub fn new() -> Self {
        Self::default()
    }

    /// 带兜底处理器的处理器表
    pub fn with_fallback(handler: HandlerRef) -> Self {
        let table = Self::new();
        table.set_fallback(handler);
        table
    }

    /// 注册处理器，同一键后注册的覆盖先注册的
    pub fn register(&self, command: impl Into<String>, kind: CommandErrorKind, handler: HandlerRef) {
        self.handlers.insert((command.into(), kind), handler);
    }

    /// 设置兜底处理器，替换已有的
    pub fn set_fallback(&self, handler: HandlerRef) {
        *self.fallback.write() = Some(handler);
    }

    /// 查找处理器
    pub fn find(&self, command: &str, kind: CommandErrorKind) -> Option<HandlerRef> {
        self.handlers
            .get(&(command.to_string(), kind))
            .map(|entry| entry.value().clone())
            .or_else(|| self.fallback.read().clone())
    }

    /// 已注册的处理器数量，不含兜底处理器
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// 是否没有注册任何处理器
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl ExceptionHandler for HandlerTable {
    fn handle(&self, error: CommandError, command: CommandRef) -> CommandResult<()> {
        let original = unwrap_original(command.clone());
        let kind = error.kind();

        match self.find(original.name(), kind) {
            Some(handler) => handler.handle(error, command),
            None => {
                warn!(command = %original.name(), kind = ?kind, "没有匹配的异常处理器");
                Err(CommandError::handler_not_configured(original.name(), error))
            }
        }
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("handlers", &self.handlers.len())
            .field("fallback", &self.fallback.read().is_some())
            .finish()
    }
}
