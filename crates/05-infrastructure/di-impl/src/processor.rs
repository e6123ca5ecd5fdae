//! 默认生命周期处理器

use crate::group::{LifecycleGroup, WorkingSet};
use async_trait::async_trait;
use di_abstractions::{ComponentRegistry, LifecycleProcessor, StopReport};
use infrastructure_common::{
    LifecycleComponent, LifecycleError, LifecycleResult, DEFAULT_TIMEOUT_PER_SHUTDOWN_PHASE_MS,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// 按阶段分组启动和停止组件的处理器
///
/// 启动时阶段值升序，停止时降序；同一阶段内按依赖关系排序。
/// 每个停止阶段最多等待 [`timeout_per_shutdown_phase`](Self::timeout_per_shutdown_phase)，
/// 超时后继续下一阶段。
pub struct DefaultLifecycleProcessor {
    timeout_per_shutdown_phase_ms: AtomicU64,
    running: AtomicBool,
    registry: RwLock<Option<Arc<dyn ComponentRegistry>>>,
}

impl DefaultLifecycleProcessor {
    /// 创建未关联注册表的处理器
    pub fn new() -> Self {
        Self {
            timeout_per_shutdown_phase_ms: AtomicU64::new(DEFAULT_TIMEOUT_PER_SHUTDOWN_PHASE_MS),
            running: AtomicBool::new(false),
            registry: RwLock::new(None),
        }
    }

    /// 创建并关联注册表
    pub fn with_registry(registry: Arc<dyn ComponentRegistry>) -> Self {
        let processor = Self::new();
        processor.set_registry(registry);
        processor
    }

    /// 关联组件注册表
    pub fn set_registry(&self, registry: Arc<dyn ComponentRegistry>) {
        *self.registry.write() = Some(registry);
    }

    /// 设置每个停止阶段的超时时间
    pub fn set_timeout_per_shutdown_phase(&self, timeout: Duration) {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.timeout_per_shutdown_phase_ms
            .store(millis, Ordering::SeqCst);
    }

    /// 每个停止阶段的超时时间
    pub fn timeout_per_shutdown_phase(&self) -> Duration {
        Duration::from_millis(self.timeout_per_shutdown_phase_ms.load(Ordering::SeqCst))
    }

    fn registry(&self) -> LifecycleResult<Arc<dyn ComponentRegistry>> {
        self.registry.read().clone().ok_or_else(|| {
            LifecycleError::registry_unavailable("生命周期处理器尚未关联组件注册表")
        })
    }

    /// 按阶段值把组件快照分组
    fn build_groups(
        &self,
        components: &WorkingSet,
        order: &[String],
        auto_startup_only: bool,
        filter: impl Fn(&LifecycleComponent) -> bool,
    ) -> BTreeMap<i32, LifecycleGroup> {
        let timeout = self.timeout_per_shutdown_phase();
        let mut groups: BTreeMap<i32, LifecycleGroup> = BTreeMap::new();

        for name in order {
            let Some(component) = components.get(name) else {
                continue;
            };
            if !filter(component) {
                continue;
            }
            let phase = component.phase();
            groups
                .entry(phase)
                .or_insert_with(|| LifecycleGroup::new(phase, timeout, auto_startup_only))
                .add(name.clone(), component.clone());
        }
        groups
    }

    async fn start_components(&self, auto_startup_only: bool) -> LifecycleResult<()> {
        let registry = self.registry()?;
        let snapshot = registry.lifecycle_components();
        let order: Vec<String> = snapshot.iter().map(|(name, _)| name.clone()).collect();
        let mut working_set: WorkingSet = snapshot.into_iter().collect();

        let mut groups = self.build_groups(&working_set, &order, auto_startup_only, |component| {
            !auto_startup_only || component.is_auto_startup()
        });

        for group in groups.values_mut() {
            debug!("阶段 {} 包含 {} 个组件", group.phase(), group.len());
            group.start(registry.as_ref(), &mut working_set).await?;
        }

        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_components(&self) -> LifecycleResult<StopReport> {
        let registry = self.registry()?;
        let snapshot = registry.lifecycle_components();
        let order: Vec<String> = snapshot.iter().map(|(name, _)| name.clone()).collect();
        let mut working_set: WorkingSet = snapshot.into_iter().collect();

        let mut groups = self.build_groups(&working_set, &order, false, |_| true);
        let mut report = StopReport::default();

        for group in groups.values_mut().rev() {
            debug!("阶段 {} 包含 {} 个组件", group.phase(), group.len());
            group
                .stop(registry.as_ref(), &mut working_set, &mut report)
                .await;
        }

        self.running.store(false, Ordering::SeqCst);
        Ok(report)
    }
}

impl Default for DefaultLifecycleProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DefaultLifecycleProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultLifecycleProcessor")
            .field("timeout_per_shutdown_phase", &self.timeout_per_shutdown_phase())
            .field("running", &self.running.load(Ordering::SeqCst))
            .field("registry_attached", &self.registry.read().is_some())
            .finish()
    }
}

#[async_trait]
impl LifecycleProcessor for DefaultLifecycleProcessor {
    async fn on_refresh(&self) -> Result<(), LifecycleError> {
        info!("容器刷新完成，启动自动启动的生命周期组件");
        self.start_components(true).await
    }

    async fn on_close(&self) -> Result<StopReport, LifecycleError> {
        info!("容器关闭，停止生命周期组件");
        self.stop_components().await
    }

    async fn start(&self) -> Result<(), LifecycleError> {
        self.start_components(false).await
    }

    async fn stop(&self) -> Result<StopReport, LifecycleError> {
        self.stop_components().await
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
