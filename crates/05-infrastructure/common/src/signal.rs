//! 异步停止完成信号

use dashmap::DashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// 停止信号的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopSignalEvent {
    /// 组件报告停止完成
    Completed(String),
    /// 信号在完成前被丢弃，组件不会再报告完成
    Abandoned(String),
}

impl StopSignalEvent {
    /// 事件对应的组件名称
    pub fn name(&self) -> &str {
        match self {
            Self::Completed(name) | Self::Abandoned(name) => name,
        }
    }
}

/// 异步停止完成信号
///
/// 由编排器交给支持异步停止的组件。组件可以在任意线程或任务中调用
/// [`StopSignal::complete`]；每个信号恰好产生一个 [`StopSignalEvent`]。
/// 未调用 `complete` 就被丢弃的信号会产生 [`StopSignalEvent::Abandoned`]。
pub struct StopSignal {
    name: String,
    sender: Option<mpsc::UnboundedSender<StopSignalEvent>>,
    pending: Arc<DashSet<String>>,
}

impl StopSignal {
    /// 创建新的停止信号
    ///
    /// `pending` 中的名称会在信号结束时移除。
    pub fn new(
        name: impl Into<String>,
        sender: mpsc::UnboundedSender<StopSignalEvent>,
        pending: Arc<DashSet<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            sender: Some(sender),
            pending,
        }
    }

    /// 报告停止完成
    pub fn complete(mut self) {
        self.resolve(StopSignalEvent::Completed);
    }

    fn resolve(&mut self, event: fn(String) -> StopSignalEvent) {
        if let Some(sender) = self.sender.take() {
            self.pending.remove(&self.name);
            // 接收端可能已经超时退出
            let _ = sender.send(event(self.name.clone()));
        }
    }
}

impl Drop for StopSignal {
    fn drop(&mut self) {
        self.resolve(StopSignalEvent::Abandoned);
    }
}

impl fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopSignal")
            .field("name", &self.name)
            .field("resolved", &self.sender.is_none())
            .finish()
    }
}
