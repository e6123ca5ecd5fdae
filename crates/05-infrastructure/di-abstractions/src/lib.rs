//! # Dependency Injection Abstractions
//!
//! 组件注册表与生命周期处理器的抽象层。
//!
//! ## 核心接口
//!
//! - [`ComponentRegistry`] - 提供生命周期组件快照和依赖边
//! - [`LifecycleProcessor`] - 容器刷新与关闭时驱动组件启动和停止
//! - [`CircularDependencyDetector`] - 依赖图循环检测
//! - [`StopReport`] - 停止过程中的非致命失败和超时

pub mod processor;
pub mod registry;
pub mod report;

pub use processor::*;
pub use registry::*;
pub use report::*;
