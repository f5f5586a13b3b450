//! 后续命令队列的驱动

use crate::guarded::{GuardOutcome, GuardedCommand};
use crate::queue::FollowUpQueue;
use di_abstractions::{Command, HandlerRef};
use infrastructure_common::CommandResult;
use tracing::{debug, info};

/// 一次排空的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// 执行的命令数
    pub executed: usize,
    /// 失败并已交给处理器的命令数
    pub failed_and_handled: usize,
    /// 结束时仍在排队的命令数
    pub remaining: usize,
}

/// 队列驱动
///
/// 取出命令，包装为带处理器的 [`GuardedCommand`] 后执行。
/// 处理器产出的后续命令回到同一个队列。
pub struct QueueDriver {
    queue: FollowUpQueue,
    handler: HandlerRef,
}

impl QueueDriver {
    /// 以队列和处理器创建驱动
    pub fn new(queue: FollowUpQueue, handler: HandlerRef) -> Self {
        Self { queue, handler }
    }

    /// 执行一个命令；队列为空时返回 `None`
    pub fn step(&mut self) -> CommandResult<Option<GuardOutcome>> {
        let Some(command) = self.queue.try_dequeue() else {
            return Ok(None);
        };

        debug!(command = %command.name(), state = ?command.state(), "执行排队命令");
        GuardedCommand::new(command, self.handler.clone())
            .run()
            .map(Some)
    }

    /// 执行到队列为空或达到 `max_steps`
    ///
    /// 致命错误会中止排空并返回给调用方。
    pub fn run_until_idle(&mut self, max_steps: usize) -> CommandResult<DrainReport> {
        let mut report = DrainReport::default();

        while report.executed < max_steps {
            match self.step()? {
                Some(GuardOutcome::Completed) => report.executed += 1,
                Some(GuardOutcome::Handled) => {
                    report.executed += 1;
                    report.failed_and_handled += 1;
                }
                None => break,
            }
        }

        report.remaining = self.queue.len();
        info!(
            executed = report.executed,
            failed = report.failed_and_handled,
            remaining = report.remaining,
            "队列排空结束"
        );
        Ok(report)
    }
}
