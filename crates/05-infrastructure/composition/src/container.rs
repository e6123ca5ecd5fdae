//! 生命周期容器

use crate::builder::ContainerBuilder;
use config_impl::LifecycleProperties;
use di_abstractions::{ComponentRegistry, LifecycleProcessor, StopReport};
use di_impl::DefaultComponentRegistry;
use infrastructure_common::InfrastructureError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// 生命周期容器
///
/// 持有组件注册表和生命周期处理器。刷新时调用一次 `on_refresh`，关闭时调用一次 `on_close`。
pub struct LifecycleContainer {
    /// 组件注册表
    registry: Arc<DefaultComponentRegistry>,
    /// 生命周期处理器
    processor: Arc<dyn LifecycleProcessor>,
    /// 生命周期配置
    properties: LifecycleProperties,
    /// 运行状态
    status: Arc<RwLock<ContainerStatus>>,
    /// 统计信息
    metrics: Arc<RwLock<ContainerMetrics>>,
    /// 最近一次关闭的停止报告
    last_stop_report: Arc<RwLock<Option<StopReport>>>,
}

impl LifecycleContainer {
    /// 创建容器构建器
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// 内部构造函数
    pub(crate) fn new(
        registry: Arc<DefaultComponentRegistry>,
        processor: Arc<dyn LifecycleProcessor>,
        properties: LifecycleProperties,
    ) -> Self {
        let metrics = ContainerMetrics {
            registered_components_count: registry.len(),
            ..Default::default()
        };
        Self {
            registry,
            processor,
            properties,
            status: Arc::new(RwLock::new(ContainerStatus::Initialized)),
            metrics: Arc::new(RwLock::new(metrics)),
            last_stop_report: Arc::new(RwLock::new(None)),
        }
    }

    /// 刷新容器，启动自动启动的组件
    ///
    /// 只能在 [`ContainerStatus::Initialized`] 状态下调用一次。
    pub async fn refresh(&self) -> Result<(), InfrastructureError> {
        {
            let mut status = self.status.write().await;
            if *status != ContainerStatus::Initialized {
                return Err(InfrastructureError::InvalidState {
                    message: format!("容器当前状态为 {:?}，无法刷新", *status),
                });
            }
            *status = ContainerStatus::Starting;
        }

        info!("刷新生命周期容器");
        let started_at = chrono::Utc::now();
        {
            let mut metrics = self.metrics.write().await;
            metrics.start_time = Some(started_at);
            metrics.registered_components_count = self.registry.len();
        }

        let result = self.processor.on_refresh().await;
        let elapsed = chrono::Utc::now() - started_at;
        let running = self.running_components_count();

        {
            let mut metrics = self.metrics.write().await;
            metrics.startup_duration_ms = Some(elapsed.num_milliseconds());
            metrics.running_components_count = running;
        }

        match result {
            Ok(()) => {
                *self.status.write().await = ContainerStatus::Running;
                info!(
                    "生命周期容器刷新完成，{} 个组件运行中，耗时 {}ms",
                    running,
                    elapsed.num_milliseconds()
                );
                Ok(())
            }
            Err(e) => {
                error!("生命周期容器刷新失败: {}", e);
                *self.status.write().await = ContainerStatus::Failed;
                Err(e.into())
            }
        }
    }

    /// 关闭容器，停止所有组件
    ///
    /// 刷新失败后仍然可以关闭，以停止已经启动的组件。重复关闭返回错误。
    pub async fn close(&self) -> Result<StopReport, InfrastructureError> {
        {
            let mut status = self.status.write().await;
            match *status {
                ContainerStatus::Initialized | ContainerStatus::Running | ContainerStatus::Failed => {
                    *status = ContainerStatus::Stopping;
                }
                current => {
                    return Err(InfrastructureError::InvalidState {
                        message: format!("容器当前状态为 {:?}，无法关闭", current),
                    });
                }
            }
        }

        info!("关闭生命周期容器");
        let stopping_at = chrono::Utc::now();

        let report = match self.processor.on_close().await {
            Ok(report) => report,
            Err(e) => {
                error!("生命周期容器关闭失败: {}", e);
                *self.status.write().await = ContainerStatus::Failed;
                return Err(e.into());
            }
        };

        let stopped_at = chrono::Utc::now();
        {
            let mut metrics = self.metrics.write().await;
            metrics.stop_time = Some(stopped_at);
            metrics.shutdown_duration_ms = Some((stopped_at - stopping_at).num_milliseconds());
            metrics.running_components_count = self.running_components_count();
            metrics.stop_failures_count = report.failures.len();
            metrics.timed_out_phases_count = report.timeouts.len();
        }

        if !report.is_clean() {
            warn!(
                "生命周期容器关闭时有 {} 个组件停止失败，{} 个阶段超时",
                report.failures.len(),
                report.timeouts.len()
            );
        }

        *self.last_stop_report.write().await = Some(report.clone());
        *self.status.write().await = ContainerStatus::Stopped;
        info!("生命周期容器关闭完成");
        Ok(report)
    }

    /// 获取运行状态
    pub async fn get_status(&self) -> ContainerStatus {
        *self.status.read().await
    }

    /// 获取统计信息
    pub async fn get_metrics(&self) -> ContainerMetrics {
        self.metrics.read().await.clone()
    }

    /// 最近一次关闭的停止报告
    pub async fn last_stop_report(&self) -> Option<StopReport> {
        self.last_stop_report.read().await.clone()
    }

    /// 处理器在最近一次启动或停止过程后是否处于运行状态
    pub fn is_running(&self) -> bool {
        self.processor.is_running()
    }

    /// 获取组件注册表引用
    pub fn registry(&self) -> &Arc<DefaultComponentRegistry> {
        &self.registry
    }

    /// 获取生命周期处理器引用
    pub fn processor(&self) -> &Arc<dyn LifecycleProcessor> {
        &self.processor
    }

    /// 获取生命周期配置
    pub fn properties(&self) -> &LifecycleProperties {
        &self.properties
    }

    fn running_components_count(&self) -> usize {
        self.registry
            .lifecycle_components()
            .iter()
            .filter(|(_, component)| component.is_running())
            .count()
    }
}

impl std::fmt::Debug for LifecycleContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleContainer")
            .field("registry", &self.registry)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

/// 容器运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerStatus {
    /// 已初始化
    Initialized,
    /// 启动中
    Starting,
    /// 运行中
    Running,
    /// 停止中
    Stopping,
    /// 已停止
    Stopped,
    /// 失败
    Failed,
}

/// 容器统计信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerMetrics {
    /// 启动时间
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    /// 停止时间
    pub stop_time: Option<chrono::DateTime<chrono::Utc>>,
    /// 刷新耗时（毫秒）
    pub startup_duration_ms: Option<i64>,
    /// 关闭耗时（毫秒）
    pub shutdown_duration_ms: Option<i64>,
    /// 已注册的组件数量
    pub registered_components_count: usize,
    /// 运行中的组件数量
    pub running_components_count: usize,
    /// 停止失败的组件数量
    pub stop_failures_count: usize,
    /// 超时的停止阶段数量
    pub timed_out_phases_count: usize,
}

impl ContainerMetrics {
    /// 计算运行时间
    pub fn uptime(&self) -> Option<chrono::Duration> {
        match (self.start_time, self.stop_time) {
            (Some(start), Some(stop)) => Some(stop - start),
            (Some(start), None) => Some(chrono::Utc::now() - start),
            _ => None,
        }
    }
}
