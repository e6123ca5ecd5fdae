//! # Configuration Implementation
//!
//! 生命周期相关配置的绑定实现。
//!
//! ## 主要组件
//!
//! - [`LifecycleProperties`] - 生命周期编排配置
//! - [`LifecyclePropertiesBinder`] - 从配置文件和环境变量绑定配置

pub mod binder;
pub mod properties;

pub use binder::*;
pub use properties::*;
