//! 命令与异常处理器抽象

use infrastructure_common::{CommandError, CommandState};
use std::sync::Arc;

/// 命令 trait
///
/// 只有副作用；失败通过返回值报告，不会被吞掉。
pub trait Command: Send + Sync {
    /// 执行命令
    fn execute(&self) -> Result<(), CommandError>;

    /// 命令名称，用于日志与处理器分派
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// 在失败处理链中的状态，普通命令为 [`CommandState::Fresh`]
    fn state(&self) -> CommandState {
        CommandState::Fresh
    }

    /// 重试包装或日志命令所引用的原始命令
    fn original(&self) -> Option<&CommandRef> {
        None
    }
}

/// 共享命令引用
pub type CommandRef = Arc<dyn Command>;

/// 用闭包实现的命令
pub struct FnCommand<F> {
    name: String,
    action: F,
}

impl<F> FnCommand<F>
where
    F: Fn() -> Result<(), CommandError> + Send + Sync,
{
    /// 创建闭包命令
    pub fn new(name: impl Into<String>, action: F) -> Self {
        Self {
            name: name.into(),
            action,
        }
    }
}

impl<F> Command for FnCommand<F>
where
    F: Fn() -> Result<(), CommandError> + Send + Sync,
{
    fn execute(&self) -> Result<(), CommandError> {
        (self.action)()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 异常处理器 trait
///
/// 接收 (错误, 失败的命令)，恰好产出一个后续命令。
/// 返回错误仅表示配置故障，例如后续命令队列已关闭。
pub trait ExceptionHandler: Send + Sync {
    /// 处理一次命令失败
    fn handle(&self, error: CommandError, command: CommandRef) -> Result<(), CommandError>;
}

/// 共享处理器引用
pub type HandlerRef = Arc<dyn ExceptionHandler>;

/// 沿重试包装找到原始命令；非包装命令返回自身
pub fn unwrap_original(command: CommandRef) -> CommandRef {
    let original = command.original().cloned();
    original.unwrap_or(command)
}
