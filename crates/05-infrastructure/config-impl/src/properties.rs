//! 生命周期编排配置

use infrastructure_common::{ConfigError, DEFAULT_TIMEOUT_PER_SHUTDOWN_PHASE_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 生命周期编排配置
///
/// 对应配置中的 `lifecycle` 节，缺失的字段使用默认值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleProperties {
    /// 每个停止阶段等待异步停止完成的最长时间（毫秒）
    pub timeout_per_shutdown_phase_ms: u64,
}

impl LifecycleProperties {
    /// 每个停止阶段的超时时间
    pub fn timeout_per_shutdown_phase(&self) -> Duration {
        Duration::from_millis(self.timeout_per_shutdown_phase_ms)
    }

    /// 验证配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_per_shutdown_phase_ms == 0 {
            return Err(ConfigError::validation(
                "lifecycle.timeout_per_shutdown_phase_ms 必须大于 0",
            ));
        }
        Ok(())
    }
}

impl Default for LifecycleProperties {
    fn default() -> Self {
        Self {
            timeout_per_shutdown_phase_ms: DEFAULT_TIMEOUT_PER_SHUTDOWN_PHASE_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_thirty_seconds() {
        let properties = LifecycleProperties::default();
        assert_eq!(properties.timeout_per_shutdown_phase(), Duration::from_secs(30));
        assert_eq!(
            properties.timeout_per_shutdown_phase_ms,
            DEFAULT_TIMEOUT_PER_SHUTDOWN_PHASE_MS
        );
        assert!(properties.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let properties = LifecycleProperties {
            timeout_per_shutdown_phase_ms: 0,
        };
        assert!(matches!(
            properties.validate(),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let properties: LifecycleProperties = serde_json::from_str("{}").unwrap();
        assert_eq!(properties, LifecycleProperties::default());
    }
}
