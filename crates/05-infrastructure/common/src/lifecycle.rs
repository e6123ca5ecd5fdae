//! 组件生命周期管理

use crate::errors::BoxError;
use crate::signal::StopSignal;
use async_trait::async_trait;

/// [`SmartLifecycle`] 组件的默认阶段值
///
/// 最晚启动，最先停止。
pub const DEFAULT_PHASE: i32 = i32::MAX;

/// 每个停止阶段的默认超时时间（毫秒）
pub const DEFAULT_TIMEOUT_PER_SHUTDOWN_PHASE_MS: u64 = 30_000;

/// 组件生命周期管理 trait
///
/// 编排器只调用这些操作和读取运行状态，从不创建或销毁组件。
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// 启动组件
    async fn start(&self) -> Result<(), BoxError>;

    /// 停止组件，返回时视为停止完成
    async fn stop(&self) -> Result<(), BoxError>;

    /// 组件是否正在运行
    fn is_running(&self) -> bool;
}

/// 声明阶段值的组件
pub trait Phased {
    /// 阶段值，启动时升序、停止时降序
    fn phase(&self) -> i32;
}

/// 带阶段值的普通生命周期组件
pub trait PhasedLifecycle: Lifecycle + Phased {}

impl<T: Lifecycle + Phased + ?Sized> PhasedLifecycle for T {}

/// 扩展的生命周期能力
///
/// 支持自动启动开关、阶段值以及带完成信号的异步停止。
#[async_trait]
pub trait SmartLifecycle: Lifecycle {
    /// 容器刷新时是否自动启动
    fn is_auto_startup(&self) -> bool {
        true
    }

    /// 阶段值
    fn phase(&self) -> i32 {
        DEFAULT_PHASE
    }

    /// 异步停止
    ///
    /// 实现必须在停止完成后调用 [`StopSignal::complete`]，可以在其他线程或任务中调用。
    /// 默认实现先执行 [`Lifecycle::stop`] 再报告完成。
    async fn stop_async(&self, signal: StopSignal) -> Result<(), BoxError> {
        self.stop().await?;
        signal.complete();
        Ok(())
    }
}
