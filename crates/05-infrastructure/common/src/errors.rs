//! 错误类型定义

use thiserror::Error;

/// 组件操作返回的通用错误类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

/// 依赖关系错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("组件注册失败: {name}, 原因: {message}")]
    RegistrationError { name: String, message: String },
}

/// 生命周期编排错误类型
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("组件启动失败: '{name}', 原因: {source}")]
    StartFailed {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("组件注册表不可用: {message}")]
    RegistryUnavailable { message: String },
}

impl LifecycleError {
    /// 创建启动失败错误
    pub fn start_failed(name: impl Into<String>, source: BoxError) -> Self {
        Self::StartFailed {
            name: name.into(),
            source,
        }
    }

    /// 创建注册表不可用错误
    pub fn registry_unavailable(message: impl Into<String>) -> Self {
        Self::RegistryUnavailable {
            message: message.into(),
        }
    }

    /// 启动失败时返回出错组件的名称
    pub fn component_name(&self) -> Option<&str> {
        match self {
            Self::StartFailed { name, .. } => Some(name),
            Self::RegistryUnavailable { .. } => None,
        }
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖关系错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("生命周期错误: {source}")]
    LifecycleError {
        #[from]
        source: LifecycleError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },

    #[error("基础设施状态错误: {message}")]
    InvalidState { message: String },
}

/// 生命周期操作结果类型
pub type LifecycleResult<T> = Result<T, LifecycleError>;
