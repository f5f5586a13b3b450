//! 命令执行与失败处理
//!
//! 受保护命令捕获失败并交给异常处理器，处理器按策略产出重试包装或日志命令，
//! 后续命令进入队列，由 [`QueueDriver`] 之类的外部驱动执行。

pub mod driver;
pub mod guarded;
pub mod handlers;
pub mod macro_command;
pub mod queue;
pub mod retry;

pub use driver::{DrainReport, QueueDriver};
pub use guarded::{GuardOutcome, GuardedCommand};
pub use handlers::{follow_up_for, HandlerTable, PolicyHandler};
pub use macro_command::MacroCommand;
pub use queue::{follow_up_queue, FollowUpQueue, FollowUpSender};
pub use retry::{LogCommand, RetryCommand};
