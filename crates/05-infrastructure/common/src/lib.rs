//! # Infrastructure Common
//!
//! 这个 crate 提供了组件生命周期编排所需的公共 traits 和错误类型。
//!
//! ## 核心组件
//!
//! - [`Lifecycle`] - 基础生命周期 trait（启动、停止、运行状态）
//! - [`Phased`] - 声明阶段值的组件
//! - [`SmartLifecycle`] - 支持自动启动、阶段和异步停止的扩展能力
//! - [`LifecycleComponent`] - 显式的能力标签，替代运行时类型判断
//! - [`StopSignal`] - 异步停止完成信号
//!
//! ## 设计原则
//!
//! - 能力通过 trait 组合和枚举标签表达，不依赖反射
//! - 异步优先的设计理念
//! - 启动失败显式返回，停止失败只记录不传播

pub mod component;
pub mod errors;
pub mod lifecycle;
pub mod signal;

pub use component::*;
pub use errors::*;
pub use lifecycle::*;
pub use signal::*;
