//! 生命周期分组与依赖遍历
//!
//! 每次启动或停止过程都会新建分组和工作集。工作集在遍历中被逐步清空：
//! 已移除的名称表示该组件已经处理过（可能是通过依赖递归提前处理的）。

use crate::barrier::ShutdownBarrier;
use di_abstractions::{ComponentRegistry, PhaseTimeout, StopReport};
use infrastructure_common::{LifecycleComponent, LifecycleError};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// 一次启动或停止过程的工作集：名称 -> 组件
pub type WorkingSet = HashMap<String, LifecycleComponent>;

type Traversal<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 同一阶段的组件集合
#[derive(Debug)]
pub struct LifecycleGroup {
    phase: i32,
    timeout: Duration,
    auto_startup_only: bool,
    members: Vec<LifecycleGroupMember>,
    smart_member_count: usize,
}

#[derive(Debug)]
struct LifecycleGroupMember {
    name: String,
    component: LifecycleComponent,
}

impl LifecycleGroup {
    /// 创建空分组
    pub fn new(phase: i32, timeout: Duration, auto_startup_only: bool) -> Self {
        Self {
            phase,
            timeout,
            auto_startup_only,
            members: Vec::new(),
            smart_member_count: 0,
        }
    }

    /// 阶段值
    pub fn phase(&self) -> i32 {
        self.phase
    }

    /// 成员数量
    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    /// 添加成员
    pub fn add(&mut self, name: impl Into<String>, component: LifecycleComponent) {
        if component.is_smart() {
            self.smart_member_count += 1;
        }
        self.members.push(LifecycleGroupMember {
            name: name.into(),
            component,
        });
    }

    /// 按依赖顺序启动本组成员
    ///
    /// 任一组件启动失败立即返回，已启动的组件不会回滚。
    pub async fn start(
        &mut self,
        registry: &dyn ComponentRegistry,
        working_set: &mut WorkingSet,
    ) -> Result<(), LifecycleError> {
        if self.members.is_empty() {
            return Ok(());
        }

        debug!("启动阶段 {} 的组件", self.phase);
        self.members.sort_by_key(|member| member.component.phase());

        for member in &self.members {
            do_start(registry, working_set, &member.name, self.auto_startup_only).await?;
        }
        Ok(())
    }

    /// 按依赖逆序停止本组成员，并在超时内等待异步停止完成
    pub async fn stop(
        &mut self,
        registry: &dyn ComponentRegistry,
        working_set: &mut WorkingSet,
        report: &mut StopReport,
    ) {
        if self.members.is_empty() {
            return;
        }

        debug!("停止阶段 {} 的组件", self.phase);
        self.members
            .sort_by_key(|member| Reverse(member.component.phase()));

        let barrier = ShutdownBarrier::new(self.smart_member_count);
        let present: HashSet<String> = working_set.keys().cloned().collect();
        let member_names: HashSet<String> =
            self.members.iter().map(|member| member.name.clone()).collect();

        let mut context = StopContext::new(registry, &barrier, &member_names, &mut *report);

        for member in &self.members {
            if present.contains(&member.name) {
                do_stop(&mut context, working_set, &member.name).await;
            } else if member.component.is_smart() {
                // 已被其他阶段的依赖方提前停止
                barrier.count_down();
            }
        }

        let outcome = barrier.wait(self.timeout).await;

        report.stopped.extend(outcome.completed);
        for name in outcome.abandoned {
            if !report.has_failure(&name) {
                warn!("组件 '{}' 未报告停止完成就丢弃了停止信号", name);
                report.record_failure(name, "停止信号在完成前被丢弃");
            }
        }

        if outcome.timed_out && !outcome.pending.is_empty() {
            info!(
                "阶段 {} 有 {} 个组件未能在 {}ms 超时内停止: {:?}",
                self.phase,
                outcome.pending.len(),
                self.timeout.as_millis(),
                outcome.pending
            );
            report.timeouts.push(PhaseTimeout {
                phase: self.phase,
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                pending: outcome.pending,
            });
        }
    }
}

/// 启动组件，先递归启动它的依赖
pub fn do_start<'a>(
    registry: &'a dyn ComponentRegistry,
    working_set: &'a mut WorkingSet,
    name: &'a str,
    auto_startup_only: bool,
) -> Traversal<'a, Result<(), LifecycleError>> {
    Box::pin(async move {
        let Some(component) = working_set.remove(name) else {
            return Ok(());
        };

        for dependency in registry.dependencies_for(name) {
            do_start(registry, working_set, &dependency, auto_startup_only).await?;
        }

        if !component.is_running() && (!auto_startup_only || component.is_auto_startup()) {
            trace!("启动组件 '{}' [{}]", name, component.kind());
            component
                .start()
                .await
                .map_err(|source| LifecycleError::start_failed(name, source))?;
            debug!("成功启动组件 '{}'", name);
        }
        Ok(())
    })
}

/// 停止过程中各层递归共享的只读上下文和报告
pub struct StopContext<'a> {
    registry: &'a dyn ComponentRegistry,
    barrier: &'a ShutdownBarrier,
    members: &'a HashSet<String>,
    report: &'a mut StopReport,
}

impl<'a> StopContext<'a> {
    /// 创建停止上下文
    ///
    /// `members` 是当前分组的成员名称，用于区分从其他阶段递归进来的组件。
    pub fn new(
        registry: &'a dyn ComponentRegistry,
        barrier: &'a ShutdownBarrier,
        members: &'a HashSet<String>,
        report: &'a mut StopReport,
    ) -> Self {
        Self {
            registry,
            barrier,
            members,
            report,
        }
    }
}

/// 停止组件，先递归停止依赖它的组件
///
/// 停止失败只记录，不会向上传播。
pub fn do_stop<'a, 'c>(
    context: &'a mut StopContext<'c>,
    working_set: &'a mut WorkingSet,
    name: &'a str,
) -> Traversal<'a, ()>
where
    'c: 'a,
{
    Box::pin(async move {
        let Some(component) = working_set.remove(name) else {
            return;
        };

        for dependent in context.registry.dependents_of(name) {
            do_stop(context, working_set, &dependent).await;
        }

        // 来自其他阶段的组件不在本组屏障的初始计数内
        let foreign = !context.members.contains(name);

        if !component.is_running() {
            if component.is_smart() && !foreign {
                context.barrier.count_down();
            }
            return;
        }

        match component.as_smart() {
            Some(smart) => {
                trace!("请求组件 '{}' [{}] 停止", name, component.kind());
                if foreign {
                    context.barrier.extend();
                }
                let signal = context.barrier.signal_for(name);
                if let Err(e) = smart.stop_async(signal).await {
                    warn!("停止组件 '{}' 失败: {}", name, e);
                    context.report.record_failure(name, e.to_string());
                }
            }
            None => {
                trace!("停止组件 '{}' [{}]", name, component.kind());
                match component.stop().await {
                    Ok(()) => {
                        debug!("成功停止组件 '{}'", name);
                        context.report.stopped.push(name.to_string());
                    }
                    Err(e) => {
                        warn!("停止组件 '{}' 失败: {}", name, e);
                        context.report.record_failure(name, e.to_string());
                    }
                }
            }
        }
    })
}
