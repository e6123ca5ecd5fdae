//! 生命周期容器构建器

use crate::container::LifecycleContainer;
use config_impl::{LifecycleProperties, LifecyclePropertiesBinder};
use di_impl::{DefaultComponentRegistry, DefaultLifecycleProcessor};
use infrastructure_common::{InfrastructureError, LifecycleComponent};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// 生命周期容器构建器
///
/// 使用建造者模式组装注册表、处理器和配置
pub struct ContainerBuilder {
    /// 外部提供的注册表
    registry: Option<Arc<DefaultComponentRegistry>>,
    /// 待注册的组件
    components: Vec<(String, LifecycleComponent)>,
    /// 待记录的依赖关系（组件, 被依赖的组件）
    dependencies: Vec<(String, String)>,
    /// 显式指定的配置
    properties: Option<LifecycleProperties>,
    /// 配置绑定器
    binder: Option<LifecyclePropertiesBinder>,
    /// 是否在构建时检测循环依赖
    validation_enabled: bool,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ContainerBuilder {
    /// 创建新的容器构建器
    pub fn new() -> Self {
        Self {
            registry: None,
            components: Vec::new(),
            dependencies: Vec::new(),
            properties: None,
            binder: None,
            validation_enabled: true,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 使用已有的注册表
    pub fn with_registry(mut self, registry: Arc<DefaultComponentRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// 添加生命周期组件
    pub fn add_component(mut self, name: impl Into<String>, component: LifecycleComponent) -> Self {
        let name = name.into();
        debug!("添加生命周期组件: {}", name);
        self.components.push((name, component));
        self
    }

    /// 声明 `name` 依赖 `dependency`
    pub fn add_dependency(mut self, name: impl Into<String>, dependency: impl Into<String>) -> Self {
        self.dependencies.push((name.into(), dependency.into()));
        self
    }

    /// 直接指定生命周期配置
    pub fn with_properties(mut self, properties: LifecycleProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    /// 构建时从配置文件和环境变量绑定配置
    pub fn load_properties(mut self, binder: LifecyclePropertiesBinder) -> Self {
        self.binder = Some(binder);
        self
    }

    /// 启用或禁用循环依赖检测
    pub fn enable_validation(mut self, enabled: bool) -> Self {
        self.validation_enabled = enabled;
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true;
        self
    }

    /// 构建容器实例
    pub fn build(self) -> Result<LifecycleContainer, InfrastructureError> {
        // 避免在测试环境中重复初始化
        if self.logging_enabled {
            self.logging_config.init()?;
        }

        info!("开始构建生命周期容器");

        let properties = match (self.properties, &self.binder) {
            (Some(properties), _) => properties,
            (None, Some(binder)) => binder.bind()?,
            (None, None) => LifecycleProperties::default(),
        };
        properties.validate()?;

        let registry = self.registry.unwrap_or_default();
        for (name, component) in self.components {
            registry.register(name, component)?;
        }
        for (name, dependency) in self.dependencies {
            registry.depends_on(name, dependency);
        }

        if self.validation_enabled {
            debug!("检测循环依赖");
            registry.validate_dependencies()?;
        }

        let processor = DefaultLifecycleProcessor::with_registry(registry.clone());
        processor.set_timeout_per_shutdown_phase(properties.timeout_per_shutdown_phase());

        info!(
            "生命周期容器构建完成: {} 个组件，停止阶段超时 {}ms",
            registry.len(),
            properties.timeout_per_shutdown_phase_ms
        );
        Ok(LifecycleContainer::new(
            registry,
            Arc::new(processor),
            properties,
        ))
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 初始化全局日志订阅者
    ///
    /// 设置了 `RUST_LOG` 时以它为准，否则使用 `level`。
    pub fn init(&self) -> Result<(), InfrastructureError> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str()));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_file)
            .with_line_number(self.show_line_number);

        if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| InfrastructureError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}
