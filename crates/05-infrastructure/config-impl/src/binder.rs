//! 生命周期配置绑定器

use crate::properties::LifecycleProperties;
use infrastructure_common::ConfigError;
use std::path::PathBuf;
use tracing::{debug, error};

/// 默认环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "ADSP";

/// 配置节名称
pub const LIFECYCLE_SECTION: &str = "lifecycle";

/// 从配置文件和环境变量绑定 [`LifecycleProperties`]
///
/// 依次读取 `config/app`、`config/local`（扩展名由 `config` crate 自动识别，文件可以不存在），
/// 最后读取环境变量，例如 `ADSP__LIFECYCLE__TIMEOUT_PER_SHUTDOWN_PHASE_MS=5000`。
/// 后面的来源覆盖前面的来源。
#[derive(Debug, Clone)]
pub struct LifecyclePropertiesBinder {
    base_dir: PathBuf,
    files: Vec<String>,
    env_prefix: String,
}

impl LifecyclePropertiesBinder {
    /// 创建使用默认来源的绑定器
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            files: vec!["config/app".to_string(), "config/local".to_string()],
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// 设置配置文件的根目录
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// 设置环境变量前缀
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// 追加一个可选的配置文件（不含扩展名）
    pub fn with_file(mut self, name: impl Into<String>) -> Self {
        self.files.push(name.into());
        self
    }

    /// 绑定并验证配置
    pub fn bind(&self) -> Result<LifecycleProperties, ConfigError> {
        let mut builder = config::Config::builder();
        for name in &self.files {
            let path = self.base_dir.join(name);
            debug!("添加配置文件来源: {}", path.display());
            builder = builder.add_source(
                config::File::with_name(&path.to_string_lossy()).required(false),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build().map_err(|e| {
            error!("配置构建失败: {}", e);
            ConfigError::ParseError {
                source: Box::new(e),
            }
        })?;

        let properties = match settings.get::<LifecycleProperties>(LIFECYCLE_SECTION) {
            Ok(properties) => properties,
            Err(config::ConfigError::NotFound(_)) => {
                debug!("未找到配置节 '{}'，使用默认值", LIFECYCLE_SECTION);
                LifecycleProperties::default()
            }
            Err(e) => {
                error!("配置绑定失败: path={}, error={}", LIFECYCLE_SECTION, e);
                return Err(ConfigError::ParseError {
                    source: Box::new(e),
                });
            }
        };

        properties.validate()?;
        debug!(
            "生命周期配置绑定成功: timeout_per_shutdown_phase_ms={}",
            properties.timeout_per_shutdown_phase_ms
        );
        Ok(properties)
    }
}

impl Default for LifecyclePropertiesBinder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_config(dir: &Path, name: &str, content: &str) {
        let config_dir = dir.join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(name), content).unwrap();
    }

    #[test]
    fn missing_files_yield_defaults() {
        let dir = TempDir::new().unwrap();
        let properties = LifecyclePropertiesBinder::new()
            .with_base_dir(dir.path())
            .with_env_prefix("LIFECYCLE_TEST_EMPTY")
            .bind()
            .unwrap();

        assert_eq!(properties, LifecycleProperties::default());
    }

    #[test]
    fn local_file_overrides_app_file() {
        let dir = TempDir::new().unwrap();
        write_config(
            dir.path(),
            "app.toml",
            "[lifecycle]\ntimeout_per_shutdown_phase_ms = 5000\n",
        );
        write_config(
            dir.path(),
            "local.json",
            r#"{ "lifecycle": { "timeout_per_shutdown_phase_ms": 1500 } }"#,
        );

        let properties = LifecyclePropertiesBinder::new()
            .with_base_dir(dir.path())
            .with_env_prefix("LIFECYCLE_TEST_FILES")
            .bind()
            .unwrap();

        assert_eq!(properties.timeout_per_shutdown_phase_ms, 1500);
    }

    #[test]
    fn environment_overrides_files() {
        let dir = TempDir::new().unwrap();
        write_config(
            dir.path(),
            "app.toml",
            "[lifecycle]\ntimeout_per_shutdown_phase_ms = 5000\n",
        );
        std::env::set_var(
            "LIFECYCLE_TEST_ENV__LIFECYCLE__TIMEOUT_PER_SHUTDOWN_PHASE_MS",
            "250",
        );

        let properties = LifecyclePropertiesBinder::new()
            .with_base_dir(dir.path())
            .with_env_prefix("LIFECYCLE_TEST_ENV")
            .bind()
            .unwrap();

        assert_eq!(properties.timeout_per_shutdown_phase_ms, 250);
    }

    #[test]
    fn extra_file_is_read_last() {
        let dir = TempDir::new().unwrap();
        write_config(
            dir.path(),
            "app.toml",
            "[lifecycle]\ntimeout_per_shutdown_phase_ms = 5000\n",
        );
        write_config(
            dir.path(),
            "shutdown.yaml",
            "lifecycle:\n  timeout_per_shutdown_phase_ms: 750\n",
        );

        let properties = LifecyclePropertiesBinder::new()
            .with_base_dir(dir.path())
            .with_env_prefix("LIFECYCLE_TEST_EXTRA")
            .with_file("config/shutdown")
            .bind()
            .unwrap();

        assert_eq!(properties.timeout_per_shutdown_phase(), std::time::Duration::from_millis(750));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let dir = TempDir::new().unwrap();
        write_config(
            dir.path(),
            "app.toml",
            "[lifecycle]\ntimeout_per_shutdown_phase_ms = 0\n",
        );

        let result = LifecyclePropertiesBinder::new()
            .with_base_dir(dir.path())
            .with_env_prefix("LIFECYCLE_TEST_ZERO")
            .bind();

        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn malformed_value_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        write_config(
            dir.path(),
            "app.toml",
            "[lifecycle]\ntimeout_per_shutdown_phase_ms = \"soon\"\n",
        );

        let result = LifecyclePropertiesBinder::new()
            .with_base_dir(dir.path())
            .with_env_prefix("LIFECYCLE_TEST_BAD")
            .bind();

        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
