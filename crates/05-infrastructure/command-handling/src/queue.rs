//! 后续命令队列
//!
//! 异常处理器产出的命令在这里排队，等待外部驱动执行。
//! 底层是 tokio 的无界 mpsc 通道：发送端可以克隆给任意多个处理器，
//! 接收端只有一个。

use di_abstractions::CommandRef;
use infrastructure_common::{CommandError, CommandResult};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// 创建一对发送端与接收端
pub fn follow_up_queue() -> (FollowUpSender, FollowUpQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    let pending = Arc::new(AtomicUsize::new(0));

    (
        FollowUpSender {
            tx,
            pending: pending.clone(),
        },
        FollowUpQueue { rx, pending },
    )
}

/// 队列发送端
#[derive(Clone)]
pub struct FollowUpSender {
    tx: mpsc::UnboundedSender<CommandRef>,
    pending: Arc<AtomicUsize>,
}

impl FollowUpSender {
    /// 入队；接收端已关闭时返回 [`CommandError::QueueUnavailable`]
    pub fn enqueue(&self, command: CommandRef) -> CommandResult<()> {
        // 先计数再发送，避免接收端先于计数看到命令
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.tx.send(command).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            CommandError::QueueUnavailable
        })
    }

    /// 接收端是否已关闭
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl fmt::Debug for FollowUpSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FollowUpSender")
            .field("pending", &self.pending.load(Ordering::SeqCst))
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// 队列接收端
pub struct FollowUpQueue {
    rx: mpsc::UnboundedReceiver<CommandRef>,
    pending: Arc<AtomicUsize>,
}

impl FollowUpQueue {
    /// 非阻塞出队
    pub fn try_dequeue(&mut self) -> Option<CommandRef> {
        let command = self.rx.try_recv().ok()?;
        self.pending.fetch_sub(1, Ordering::SeqCst);
        Some(command)
    }

    /// 等待下一个命令；所有发送端都已释放且队列为空时返回 `None`
    pub async fn dequeue(&mut self) -> Option<CommandRef> {
        let command = self.rx.recv().await?;
        self.pending.fetch_sub(1, Ordering::SeqCst);
        Some(command)
    }

    /// 阻塞等待下一个命令，不能在异步运行时内调用
    pub fn blocking_dequeue(&mut self) -> Option<CommandRef> {
        let command = self.rx.blocking_recv()?;
        self.pending.fetch_sub(1, Ordering::SeqCst);
        Some(command)
    }

    /// 排队中的命令数
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// 是否没有排队的命令
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 关闭队列，之后的入队都会失败；已排队的命令仍可取出
    pub fn close(&mut self) {
        self.rx.close();
    }
}

impl fmt::Debug for FollowUpQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FollowUpQueue")
            .field("pending", &self.len())
            .finish()
    }
}
