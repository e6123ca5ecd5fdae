//! # 基础设施组合层
//!
//! 把组件注册表、生命周期处理器和生命周期配置组合成一个可以刷新和关闭的容器。
//!
//! ## 主要功能
//!
//! - **容器构建器**: 使用构建者模式注册组件、声明依赖、加载配置和初始化日志
//! - **生命周期容器**: 刷新时启动组件，关闭时按阶段停止组件，并记录状态和耗时
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{LifecycleContainer, LoggingConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let container = LifecycleContainer::builder()
//!         .with_logging(LoggingConfig::development())
//!         .build()?;
//!
//!     container.refresh().await?;
//!
//!     let report = container.close().await?;
//!     println!("已停止 {} 个组件", report.stopped.len());
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod container;

// 重新导出主要类型
pub use builder::{ContainerBuilder, LoggingConfig};
pub use container::{ContainerMetrics, ContainerStatus, LifecycleContainer};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
