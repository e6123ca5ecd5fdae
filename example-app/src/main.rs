//! # 示例应用程序
//!
//! 演示如何用生命周期容器按阶段启动和停止组件

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use config_impl::{LifecycleProperties, LifecyclePropertiesBinder};
use infrastructure_common::{
    BoxError, Lifecycle, LifecycleComponent, Phased, SmartLifecycle, StopSignal,
};
use infrastructure_composition::{LifecycleContainer, LoggingConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn ADSP 生命周期编排示例应用")]
struct Args {
    /// 配置文件根目录（读取其中的 config/app 和 config/local）
    #[arg(long, default_value = ".")]
    config_dir: String,

    /// 覆盖每个停止阶段的超时时间（毫秒）
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// 运行指定毫秒后自动关闭，不指定时等待 Ctrl+C
    #[arg(long)]
    run_for_ms: Option<u64>,

    /// 消息消费者排空队列所需的时间（毫秒）
    #[arg(long, default_value_t = 200)]
    drain_ms: u64,

    /// 使用生产环境日志格式（JSON）
    #[arg(long)]
    production: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logging = if args.production {
        LoggingConfig::production()
    } else {
        LoggingConfig::development()
    };

    let mut builder = LifecycleContainer::builder()
        .with_logging(logging)
        .load_properties(LifecyclePropertiesBinder::new().with_base_dir(&args.config_dir));
    if let Some(timeout_ms) = args.timeout_ms {
        // 显式配置优先于配置文件和环境变量
        builder = builder.with_properties(LifecycleProperties {
            timeout_per_shutdown_phase_ms: timeout_ms,
        });
    }

    let container = builder
        .add_component("database", LifecycleComponent::phased(Arc::new(Database::default())))
        .add_component("cache", LifecycleComponent::plain(Arc::new(Cache::default())))
        .add_component(
            "consumer",
            LifecycleComponent::smart(Arc::new(MessageConsumer::new(Duration::from_millis(
                args.drain_ms,
            )))),
        )
        .add_component(
            "reporter",
            LifecycleComponent::smart(Arc::new(MetricsReporter::default())),
        )
        .add_dependency("cache", "database")
        .add_dependency("consumer", "cache")
        .build()
        .context("构建生命周期容器失败")?;

    info!("启动 Lorn ADSP 示例应用");
    container.refresh().await.context("刷新生命周期容器失败")?;

    match args.run_for_ms {
        Some(millis) => tokio::time::sleep(Duration::from_millis(millis)).await,
        None => {
            info!("按 Ctrl+C 退出");
            tokio::signal::ctrl_c().await?;
        }
    }

    info!("收到退出信号，正在关闭应用");
    let report = container.close().await.context("关闭生命周期容器失败")?;
    if !report.is_clean() {
        warn!("部分组件未正常停止");
    }

    let metrics = container.get_metrics().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    println!("{}", serde_json::to_string_pretty(&metrics)?);

    info!("应用已关闭");
    Ok(())
}

/// 数据库连接池，最早启动、最晚停止
#[derive(Default)]
struct Database {
    running: AtomicBool,
}

#[async_trait]
impl Lifecycle for Database {
    async fn start(&self) -> Result<(), BoxError> {
        info!("数据库连接池已打开");
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), BoxError> {
        info!("数据库连接池已关闭");
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Phased for Database {
    fn phase(&self) -> i32 {
        -100
    }
}

/// 本地缓存
#[derive(Default)]
struct Cache {
    running: AtomicBool,
}

#[async_trait]
impl Lifecycle for Cache {
    async fn start(&self) -> Result<(), BoxError> {
        info!("缓存已预热");
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), BoxError> {
        info!("缓存已清空");
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// 消息消费者，停止时在后台排空队列
struct MessageConsumer {
    running: Arc<AtomicBool>,
    drain: Duration,
}

impl MessageConsumer {
    fn new(drain: Duration) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            drain,
        }
    }
}

#[async_trait]
impl Lifecycle for MessageConsumer {
    async fn start(&self) -> Result<(), BoxError> {
        info!("消息消费者已订阅");
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), BoxError> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SmartLifecycle for MessageConsumer {
    fn phase(&self) -> i32 {
        100
    }

    async fn stop_async(&self, signal: StopSignal) -> Result<(), BoxError> {
        info!("消息消费者开始排空队列，预计 {}ms", self.drain.as_millis());
        let running = Arc::clone(&self.running);
        let drain = self.drain;
        tokio::spawn(async move {
            tokio::time::sleep(drain).await;
            running.store(false, Ordering::SeqCst);
            info!("消息消费者已排空");
            signal.complete();
        });
        Ok(())
    }
}

/// 指标上报器，需要手动启动
#[derive(Default)]
struct MetricsReporter {
    running: AtomicBool,
}

#[async_trait]
impl Lifecycle for MetricsReporter {
    async fn start(&self) -> Result<(), BoxError> {
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), BoxError> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl SmartLifecycle for MetricsReporter {
    fn is_auto_startup(&self) -> bool {
        false
    }
}
