//! 集成测试共用的测试组件

use async_trait::async_trait;
use infrastructure_common::{
    BoxError, Lifecycle, LifecycleComponent, Phased, SmartLifecycle, StopSignal,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 按发生顺序记录的启动和停止事件
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    /// 创建空日志
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录事件
    pub fn push(&self, event: String) {
        self.0.lock().push(event);
    }

    /// 当前所有事件
    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// 只保留指定前缀的事件
    pub fn events_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .filter(|event| event.starts_with(prefix))
            .cloned()
            .collect()
    }
}

/// 异步停止方式
#[derive(Debug, Clone, Copy)]
pub enum AsyncStop {
    /// 停止后立即报告完成
    Immediate,
    /// 在后台任务中延迟报告完成
    After(Duration),
    /// 永远不报告完成
    Never,
}

/// 记录生命周期事件的测试组件
pub struct RecordingComponent {
    name: String,
    phase: i32,
    auto_startup: bool,
    async_stop: AsyncStop,
    running: Arc<AtomicBool>,
    held: Mutex<Vec<StopSignal>>,
    log: EventLog,
}

impl RecordingComponent {
    /// 创建阶段值为 0、自动启动、立即停止的组件
    pub fn new(name: impl Into<String>, log: &EventLog) -> Self {
        Self {
            name: name.into(),
            phase: 0,
            auto_startup: true,
            async_stop: AsyncStop::Immediate,
            running: Arc::new(AtomicBool::new(false)),
            held: Mutex::new(Vec::new()),
            log: log.clone(),
        }
    }

    /// 设置阶段值
    pub fn in_phase(mut self, phase: i32) -> Self {
        self.phase = phase;
        self
    }

    /// 关闭自动启动
    pub fn manual(mut self) -> Self {
        self.auto_startup = false;
        self
    }

    /// 设置异步停止方式
    pub fn async_stop(mut self, mode: AsyncStop) -> Self {
        self.async_stop = mode;
        self
    }

    /// 包装为普通组件
    pub fn plain(self) -> (Arc<Self>, LifecycleComponent) {
        let component = Arc::new(self);
        (Arc::clone(&component), LifecycleComponent::plain(component))
    }

    /// 包装为带阶段值的普通组件
    pub fn phased(self) -> (Arc<Self>, LifecycleComponent) {
        let component = Arc::new(self);
        (Arc::clone(&component), LifecycleComponent::phased(component))
    }

    /// 包装为扩展组件
    pub fn smart(self) -> (Arc<Self>, LifecycleComponent) {
        let component = Arc::new(self);
        (Arc::clone(&component), LifecycleComponent::smart(component))
    }
}

#[async_trait]
impl Lifecycle for RecordingComponent {
    async fn start(&self) -> Result<(), BoxError> {
        self.log.push(format!("start:{}", self.name));
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), BoxError> {
        self.log.push(format!("stop:{}", self.name));
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Phased for RecordingComponent {
    fn phase(&self) -> i32 {
        self.phase
    }
}

#[async_trait]
impl SmartLifecycle for RecordingComponent {
    fn is_auto_startup(&self) -> bool {
        self.auto_startup
    }

    fn phase(&self) -> i32 {
        self.phase
    }

    async fn stop_async(&self, signal: StopSignal) -> Result<(), BoxError> {
        match self.async_stop {
            AsyncStop::Immediate => {
                self.stop().await?;
                signal.complete();
            }
            AsyncStop::After(delay) => {
                self.log.push(format!("stop:{}", self.name));
                let running = Arc::clone(&self.running);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    running.store(false, Ordering::SeqCst);
                    signal.complete();
                });
            }
            AsyncStop::Never => {
                self.log.push(format!("stop:{}", self.name));
                self.held.lock().push(signal);
            }
        }
        Ok(())
    }
}
