//! 组件注册表抽象接口

use infrastructure_common::{DependencyError, LifecycleComponent};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// 组件注册表 trait
///
/// 生命周期编排器的外部协作者：提供组件快照和组件之间的依赖边。
pub trait ComponentRegistry: Send + Sync {
    /// 当前所有生命周期组件的有序快照
    ///
    /// 返回的是时间点副本，而不是实时视图。
    fn lifecycle_components(&self) -> Vec<(String, LifecycleComponent)>;

    /// 必须先于 `name` 启动的组件名称
    fn dependencies_for(&self, name: &str) -> Vec<String>;

    /// 必须先于 `name` 停止的组件名称
    fn dependents_of(&self, name: &str) -> Vec<String>;

    /// 检查组件是否已注册
    fn contains_component(&self, name: &str) -> bool {
        self.lifecycle_components()
            .iter()
            .any(|(registered, _)| registered == name)
    }
}

/// 依赖图节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraphNode {
    /// 组件名称
    pub name: String,
    /// 依赖的组件名称列表
    pub dependencies: Vec<String>,
}

/// 从注册表构建依赖图
pub fn build_dependency_graph(registry: &dyn ComponentRegistry) -> Vec<DependencyGraphNode> {
    registry
        .lifecycle_components()
        .into_iter()
        .map(|(name, _)| DependencyGraphNode {
            dependencies: registry.dependencies_for(&name),
            name,
        })
        .collect()
}

/// 循环依赖检测器
pub trait CircularDependencyDetector: Send + Sync {
    /// 检测循环依赖
    fn detect_circular_dependencies(
        &self,
        graph: &[DependencyGraphNode],
    ) -> Result<(), DependencyError>;
}

/// 默认循环依赖检测器
#[derive(Debug, Default)]
pub struct DefaultCircularDependencyDetector;

impl CircularDependencyDetector for DefaultCircularDependencyDetector {
    fn detect_circular_dependencies(
        &self,
        graph: &[DependencyGraphNode],
    ) -> Result<(), DependencyError> {
        // 使用深度优先搜索检测循环依赖
        let index: HashMap<&str, &DependencyGraphNode> =
            graph.iter().map(|node| (node.name.as_str(), node)).collect();
        let mut visited = HashSet::new();
        let mut path = Vec::new();

        for node in graph {
            if !visited.contains(node.name.as_str()) {
                Self::dfs_check(&node.name, &index, &mut visited, &mut path)?;
            }
        }

        Ok(())
    }
}

impl DefaultCircularDependencyDetector {
    fn dfs_check<'a>(
        current: &'a str,
        index: &HashMap<&'a str, &'a DependencyGraphNode>,
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> Result<(), DependencyError> {
        if let Some(start) = path.iter().position(|name| *name == current) {
            let chain = path[start..]
                .iter()
                .chain(std::iter::once(&current))
                .copied()
                .collect::<Vec<_>>()
                .join(" -> ");

            warn!("检测到循环依赖: {}", chain);
            return Err(DependencyError::CircularDependency {
                dependency_chain: chain,
            });
        }

        if visited.contains(current) {
            return Ok(());
        }

        // 依赖图之外的名称在编排时会被忽略
        let Some(&node) = index.get(current) else {
            return Ok(());
        };

        path.push(current);
        for dependency in &node.dependencies {
            Self::dfs_check(dependency, index, visited, path)?;
        }
        path.pop();
        visited.insert(current);

        Ok(())
    }
}
