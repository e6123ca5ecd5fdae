//! 生命周期组件能力标签
//!
//! 用显式枚举区分普通组件、带阶段值的组件和扩展组件。

use crate::errors::BoxError;
use crate::lifecycle::{Lifecycle, Phased, PhasedLifecycle, SmartLifecycle};
use std::fmt;
use std::sync::Arc;

/// 注册到编排器的生命周期组件
#[derive(Clone)]
pub enum LifecycleComponent {
    /// 普通组件，阶段值为 0，总是参与自动启动
    Plain(Arc<dyn Lifecycle>),
    /// 声明了阶段值的普通组件
    Phased(Arc<dyn PhasedLifecycle>),
    /// 支持自动启动开关和异步停止的扩展组件
    Smart(Arc<dyn SmartLifecycle>),
}

impl LifecycleComponent {
    /// 包装普通组件
    pub fn plain<T: Lifecycle + 'static>(component: Arc<T>) -> Self {
        Self::Plain(component)
    }

    /// 包装带阶段值的普通组件
    pub fn phased<T: Lifecycle + Phased + 'static>(component: Arc<T>) -> Self {
        Self::Phased(component)
    }

    /// 包装扩展组件
    pub fn smart<T: SmartLifecycle + 'static>(component: Arc<T>) -> Self {
        Self::Smart(component)
    }

    /// 组件的阶段值
    pub fn phase(&self) -> i32 {
        phase_of(self)
    }

    /// 是否支持异步停止
    pub fn is_smart(&self) -> bool {
        matches!(self, Self::Smart(_))
    }

    /// 容器刷新时是否自动启动，非扩展组件总是返回 `true`
    pub fn is_auto_startup(&self) -> bool {
        match self {
            Self::Smart(component) => component.is_auto_startup(),
            Self::Plain(_) | Self::Phased(_) => true,
        }
    }

    /// 扩展能力
    pub fn as_smart(&self) -> Option<&Arc<dyn SmartLifecycle>> {
        match self {
            Self::Smart(component) => Some(component),
            Self::Plain(_) | Self::Phased(_) => None,
        }
    }

    /// 启动组件
    pub async fn start(&self) -> Result<(), BoxError> {
        match self {
            Self::Plain(component) => component.start().await,
            Self::Phased(component) => component.start().await,
            Self::Smart(component) => component.start().await,
        }
    }

    /// 同步停止组件
    pub async fn stop(&self) -> Result<(), BoxError> {
        match self {
            Self::Plain(component) => component.stop().await,
            Self::Phased(component) => component.stop().await,
            Self::Smart(component) => component.stop().await,
        }
    }

    /// 组件是否正在运行
    pub fn is_running(&self) -> bool {
        match self {
            Self::Plain(component) => component.is_running(),
            Self::Phased(component) => component.is_running(),
            Self::Smart(component) => component.is_running(),
        }
    }

    /// 能力名称，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Plain(_) => "Lifecycle",
            Self::Phased(_) => "Phased",
            Self::Smart(_) => "SmartLifecycle",
        }
    }
}

impl fmt::Debug for LifecycleComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleComponent")
            .field("kind", &self.kind())
            .field("phase", &self.phase())
            .finish()
    }
}

/// 阶段分类器
///
/// 声明了阶段值的组件返回其阶段值，否则返回 0。
pub fn phase_of(component: &LifecycleComponent) -> i32 {
    match component {
        LifecycleComponent::Plain(_) => 0,
        LifecycleComponent::Phased(component) => component.phase(),
        LifecycleComponent::Smart(component) => component.phase(),
    }
}
