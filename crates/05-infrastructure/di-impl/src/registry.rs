//! 默认组件注册表

use di_abstractions::{
    build_dependency_graph, CircularDependencyDetector, ComponentRegistry,
    DefaultCircularDependencyDetector,
};
use infrastructure_common::{DependencyError, LifecycleComponent};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Default)]
struct RegistryState {
    /// 按注册顺序保存的组件
    components: Vec<(String, LifecycleComponent)>,
    /// 组件名称 -> 它依赖的组件
    dependencies: HashMap<String, Vec<String>>,
    /// 组件名称 -> 依赖它的组件
    dependents: HashMap<String, Vec<String>>,
}

/// 内存中的组件注册表
///
/// 同时维护正向（依赖）和反向（被依赖）两张表，与组件是否已注册无关：
/// 指向未注册组件的依赖边在编排时会被忽略。
#[derive(Default)]
pub struct DefaultComponentRegistry {
    state: RwLock<RegistryState>,
}

impl DefaultComponentRegistry {
    /// 创建新的注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册生命周期组件
    pub fn register(
        &self,
        name: impl Into<String>,
        component: LifecycleComponent,
    ) -> Result<(), DependencyError> {
        let name = name.into();
        let mut state = self.state.write();

        if state.components.iter().any(|(registered, _)| *registered == name) {
            return Err(DependencyError::RegistrationError {
                name,
                message: "组件名称已存在".to_string(),
            });
        }

        info!("注册生命周期组件: {} ({})", name, component.kind());
        state.components.push((name, component));
        Ok(())
    }

    /// 注销组件，依赖边保留
    pub fn unregister(&self, name: &str) -> Option<LifecycleComponent> {
        let mut state = self.state.write();
        let position = state
            .components
            .iter()
            .position(|(registered, _)| registered == name)?;

        debug!("注销生命周期组件: {}", name);
        Some(state.components.remove(position).1)
    }

    /// 记录 `dependent` 依赖 `name`
    pub fn register_dependent(&self, name: impl Into<String>, dependent: impl Into<String>) {
        let name = name.into();
        let dependent = dependent.into();
        let mut state = self.state.write();

        let dependents = state.dependents.entry(name.clone()).or_default();
        if dependents.contains(&dependent) {
            return;
        }
        dependents.push(dependent.clone());

        debug!("记录依赖关系: {} -> {}", dependent, name);
        state.dependencies.entry(dependent).or_default().push(name);
    }

    /// 记录 `name` 依赖 `dependency`
    pub fn depends_on(&self, name: impl Into<String>, dependency: impl Into<String>) {
        self.register_dependent(dependency, name);
    }

    /// 已注册组件数量
    pub fn len(&self) -> usize {
        self.state.read().components.len()
    }

    /// 是否没有注册任何组件
    pub fn is_empty(&self) -> bool {
        self.state.read().components.is_empty()
    }

    /// 验证依赖关系中没有循环
    ///
    /// 编排器本身不会因循环而死循环，但循环意味着无法满足的顺序约束。
    pub fn validate_dependencies(&self) -> Result<(), DependencyError> {
        let graph = build_dependency_graph(self);
        DefaultCircularDependencyDetector.detect_circular_dependencies(&graph)
    }
}

impl ComponentRegistry for DefaultComponentRegistry {
    fn lifecycle_components(&self) -> Vec<(String, LifecycleComponent)> {
        self.state.read().components.clone()
    }

    fn dependencies_for(&self, name: &str) -> Vec<String> {
        self.state
            .read()
            .dependencies
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    fn dependents_of(&self, name: &str) -> Vec<String> {
        self.state
            .read()
            .dependents
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    fn contains_component(&self, name: &str) -> bool {
        self.state
            .read()
            .components
            .iter()
            .any(|(registered, _)| registered == name)
    }
}

impl std::fmt::Debug for DefaultComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("DefaultComponentRegistry")
            .field(
                "components",
                &state.components.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field("dependencies", &state.dependencies)
            .finish()
    }
}
