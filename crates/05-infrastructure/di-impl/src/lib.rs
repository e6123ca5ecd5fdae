//! # 生命周期编排具体实现
//!
//! 提供默认组件注册表和按阶段编排的生命周期处理器。
//!
//! ## 编排规则
//!
//! - 启动时按阶段值升序逐组启动，组内先启动依赖再启动组件本身
//! - 停止时按阶段值降序逐组停止，组内先停止依赖方再停止组件本身
//! - 支持异步停止的组件通过 [`infrastructure_common::StopSignal`] 报告完成，
//!   每个阶段最多等待配置的超时时间

pub mod barrier;
pub mod group;
pub mod processor;
pub mod registry;

pub use barrier::{BarrierOutcome, ShutdownBarrier};
pub use group::{LifecycleGroup, WorkingSet};
pub use processor::DefaultLifecycleProcessor;
pub use registry::DefaultComponentRegistry;
