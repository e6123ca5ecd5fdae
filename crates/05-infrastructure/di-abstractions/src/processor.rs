//! 生命周期处理器抽象接口

use crate::report::StopReport;
use async_trait::async_trait;
use infrastructure_common::LifecycleError;

/// 生命周期处理器 trait
///
/// 由容器在刷新完成和关闭时调用，也支持手动启动和停止。
#[async_trait]
pub trait LifecycleProcessor: Send + Sync {
    /// 容器刷新完成，只启动自动启动的组件
    async fn on_refresh(&self) -> Result<(), LifecycleError>;

    /// 容器关闭，停止所有组件
    async fn on_close(&self) -> Result<StopReport, LifecycleError>;

    /// 手动启动所有组件，不考虑自动启动开关
    async fn start(&self) -> Result<(), LifecycleError>;

    /// 手动停止所有组件
    ///
    /// 停止失败和超时不会作为错误返回，而是记录在 [`StopReport`] 中。
    async fn stop(&self) -> Result<StopReport, LifecycleError>;

    /// 最近一次完成的启动或停止过程后的运行状态
    fn is_running(&self) -> bool;
}
