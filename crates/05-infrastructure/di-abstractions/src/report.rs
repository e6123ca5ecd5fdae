//! 停止过程报告
//!
//! 停止失败和阶段超时都不会中断关闭流程，这里把它们作为返回值暴露出来。

use serde::{Deserialize, Serialize};

/// 单个组件的停止失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopFailure {
    /// 组件名称
    pub name: String,
    /// 失败原因
    pub message: String,
}

/// 单个阶段的停止超时
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTimeout {
    /// 阶段值
    pub phase: i32,
    /// 超时时间（毫秒）
    pub timeout_ms: u64,
    /// 超时后仍未报告完成的组件名称（已排序）
    pub pending: Vec<String>,
}

/// 一次停止过程的结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopReport {
    /// 按阶段降序记录的已停止组件
    pub stopped: Vec<String>,
    /// 停止失败的组件
    pub failures: Vec<StopFailure>,
    /// 超时的阶段
    pub timeouts: Vec<PhaseTimeout>,
}

impl StopReport {
    /// 所有组件都在超时前正常停止
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.timeouts.is_empty()
    }

    /// 记录停止失败
    pub fn record_failure(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.failures.push(StopFailure {
            name: name.into(),
            message: message.into(),
        });
    }

    /// 所有超时阶段中未完成的组件名称
    pub fn pending_components(&self) -> Vec<&str> {
        self.timeouts
            .iter()
            .flat_map(|timeout| timeout.pending.iter().map(String::as_str))
            .collect()
    }

    /// 指定组件是否停止失败
    pub fn has_failure(&self, name: &str) -> bool {
        self.failures.iter().any(|failure| failure.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_clean() {
        assert!(StopReport::default().is_clean());
    }

    #[test]
    fn pending_components_span_phases() {
        let report = StopReport {
            timeouts: vec![
                PhaseTimeout {
                    phase: 10,
                    timeout_ms: 100,
                    pending: vec!["queue".into()],
                },
                PhaseTimeout {
                    phase: 0,
                    timeout_ms: 100,
                    pending: vec!["cache".into(), "pool".into()],
                },
            ],
            ..Default::default()
        };

        assert!(!report.is_clean());
        assert_eq!(report.pending_components(), vec!["queue", "cache", "pool"]);
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = StopReport::default();
        report.record_failure("scheduler", "线程池未关闭");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["failures"][0]["name"], "scheduler");
        assert!(report.has_failure("scheduler"));
    }
}
