//! 停止阶段的倒计数屏障

use dashmap::DashSet;
use infrastructure_common::{StopSignal, StopSignalEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};

/// 屏障等待结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BarrierOutcome {
    /// 按完成顺序记录的已完成组件
    pub completed: Vec<String>,
    /// 信号被丢弃的组件
    pub abandoned: Vec<String>,
    /// 超时后仍未完成的组件（已排序）
    pub pending: Vec<String>,
    /// 是否在计数归零前到达截止时间
    pub timed_out: bool,
}

/// 一次性倒计数屏障
///
/// 以组内支持异步停止的成员数初始化。不需要等待的成员通过 [`ShutdownBarrier::count_down`]
/// 立即计数，其余成员各自持有一个 [`StopSignal`]，信号结束时计数一次。
pub struct ShutdownBarrier {
    remaining: AtomicUsize,
    sender: mpsc::UnboundedSender<StopSignalEvent>,
    receiver: mpsc::UnboundedReceiver<StopSignalEvent>,
    pending: Arc<DashSet<String>>,
}

impl ShutdownBarrier {
    /// 创建计数为 `count` 的屏障
    pub fn new(count: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            remaining: AtomicUsize::new(count),
            sender,
            receiver,
            pending: Arc::new(DashSet::new()),
        }
    }

    fn remaining(&self) -> usize {
        self.remaining.load(Ordering::SeqCst)
    }

    /// 立即计数一次
    pub fn count_down(&self) {
        // 归零后忽略多余的计数
        let _ = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    /// 为初始化时未计入的组件增加一次计数
    pub fn extend(&self) {
        self.remaining.fetch_add(1, Ordering::SeqCst);
    }

    /// 为组件创建停止信号，并把它加入待完成集合
    pub fn signal_for(&self, name: &str) -> StopSignal {
        self.pending.insert(name.to_string());
        StopSignal::new(name, self.sender.clone(), Arc::clone(&self.pending))
    }

    /// 仍在等待完成的组件名称（已排序）
    pub fn pending(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pending.iter().map(|name| name.key().clone()).collect();
        names.sort();
        names
    }

    /// 等待计数归零，最多等待 `timeout`
    ///
    /// 超时不会取消仍在进行的停止操作。
    pub async fn wait(mut self, timeout: Duration) -> BarrierOutcome {
        let deadline = Instant::now() + timeout;
        let mut outcome = BarrierOutcome::default();

        while self.remaining() > 0 {
            match timeout_at(deadline, self.receiver.recv()).await {
                Ok(Some(event)) => {
                    self.count_down();
                    match event {
                        StopSignalEvent::Completed(name) => outcome.completed.push(name),
                        StopSignalEvent::Abandoned(name) => outcome.abandoned.push(name),
                    }
                }
                // 屏障自身持有发送端，通道不会关闭
                Ok(None) => break,
                Err(_) => {
                    outcome.timed_out = true;
                    break;
                }
            }
        }

        outcome.pending = self.pending();
        outcome
    }
}

impl std::fmt::Debug for ShutdownBarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownBarrier")
            .field("remaining", &self.remaining())
            .field("pending", &self.pending())
            .finish()
    }
}
