//! 生命周期容器的端到端集成测试

use config_impl::LifecyclePropertiesBinder;
use di_abstractions::{ComponentRegistry, LifecycleProcessor};
use di_impl::{DefaultComponentRegistry, DefaultLifecycleProcessor};
use di_impl_integration_tests::{AsyncStop, EventLog, RecordingComponent};
use infrastructure_common::Lifecycle;
use infrastructure_composition::{ContainerStatus, LifecycleContainer};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn container_orchestrates_a_realistic_application() -> anyhow::Result<()> {
    let log = EventLog::new();
    let (web, web_component) = RecordingComponent::new("web", &log).in_phase(100).smart();
    let (mq, mq_component) = RecordingComponent::new("mq", &log)
        .in_phase(50)
        .async_stop(AsyncStop::After(Duration::from_millis(30)))
        .smart();
    let (cache, cache_component) = RecordingComponent::new("cache", &log).plain();
    let (db, db_component) = RecordingComponent::new("db", &log).in_phase(-100).smart();
    let (scheduler, scheduler_component) = RecordingComponent::new("scheduler", &log)
        .in_phase(10)
        .manual()
        .smart();

    let container = LifecycleContainer::builder()
        .add_component("web", web_component)
        .add_component("mq", mq_component)
        .add_component("cache", cache_component)
        .add_component("db", db_component)
        .add_component("scheduler", scheduler_component)
        .add_dependency("web", "cache")
        .build()?;

    container.refresh().await?;
    assert_eq!(container.get_status().await, ContainerStatus::Running);
    assert_eq!(
        log.events_with_prefix("start:"),
        vec!["start:db", "start:cache", "start:mq", "start:web"]
    );
    assert!(!scheduler.is_running());
    assert_eq!(container.get_metrics().await.running_components_count, 4);

    let report = container.close().await?;
    assert!(report.is_clean());
    assert_eq!(report.stopped, vec!["web", "mq", "cache", "db"]);
    assert_eq!(
        log.events_with_prefix("stop:"),
        vec!["stop:web", "stop:mq", "stop:cache", "stop:db"]
    );
    for component in [&web, &mq, &cache, &db] {
        assert!(!component.is_running());
    }
    assert_eq!(container.get_status().await, ContainerStatus::Stopped);
    assert!(!container.is_running());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn configured_timeout_bounds_each_phase() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::create_dir_all(dir.path().join("config"))?;
    fs::write(
        dir.path().join("config/app.toml"),
        "[lifecycle]\ntimeout_per_shutdown_phase_ms = 100\n",
    )?;

    let log = EventLog::new();
    let (_, stuck) = RecordingComponent::new("stuck", &log)
        .in_phase(5)
        .async_stop(AsyncStop::Never)
        .smart();
    let (after, after_component) = RecordingComponent::new("after", &log).phased();

    let container = LifecycleContainer::builder()
        .load_properties(
            LifecyclePropertiesBinder::new()
                .with_base_dir(dir.path())
                .with_env_prefix("INTEGRATION_TIMEOUT"),
        )
        .add_component("stuck", stuck)
        .add_component("after", after_component)
        .build()?;
    assert_eq!(container.properties().timeout_per_shutdown_phase_ms, 100);

    container.refresh().await?;

    let started = Instant::now();
    let report = container.close().await?;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed < Duration::from_millis(500));
    assert_eq!(report.timeouts.len(), 1);
    assert_eq!(report.timeouts[0].phase, 5);
    assert_eq!(report.timeouts[0].pending, vec!["stuck"]);
    // 超时阶段之后的阶段仍然会停止
    assert_eq!(report.stopped, vec!["after"]);
    assert!(!after.is_running());

    let metrics = container.get_metrics().await;
    assert_eq!(metrics.timed_out_phases_count, 1);
    assert_eq!(container.get_status().await, ContainerStatus::Stopped);
    Ok(())
}

#[tokio::test]
async fn manual_components_start_through_the_processor() -> anyhow::Result<()> {
    let log = EventLog::new();
    let (worker, worker_component) = RecordingComponent::new("worker", &log).manual().smart();
    let (_, api) = RecordingComponent::new("api", &log).plain();

    let container = LifecycleContainer::builder()
        .add_component("worker", worker_component)
        .add_component("api", api)
        .build()?;

    container.refresh().await?;
    assert_eq!(log.events(), vec!["start:api"]);

    container.processor().start().await?;
    assert!(worker.is_running());
    assert_eq!(log.events(), vec!["start:api", "start:worker"]);

    let report = container.close().await?;
    assert!(report.stopped.contains(&"worker".to_string()));
    assert!(report.stopped.contains(&"api".to_string()));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn cross_phase_diamond_is_stopped_once_per_component() -> anyhow::Result<()> {
    let log = EventLog::new();
    let registry = Arc::new(DefaultComponentRegistry::new());
    let delayed = AsyncStop::After(Duration::from_millis(10));

    for (name, phase) in [("a", 0), ("b", 10), ("c", 20), ("d", -10)] {
        let (_, component) = RecordingComponent::new(name, &log)
            .in_phase(phase)
            .async_stop(delayed)
            .smart();
        registry.register(name, component)?;
    }
    registry.depends_on("b", "a");
    registry.depends_on("c", "a");
    registry.depends_on("d", "b");
    registry.depends_on("d", "c");
    registry.validate_dependencies()?;

    let processor = DefaultLifecycleProcessor::with_registry(registry.clone());
    processor.set_timeout_per_shutdown_phase(Duration::from_secs(1));

    processor.start().await?;
    assert_eq!(log.events(), vec!["start:a", "start:b", "start:c", "start:d"]);

    let started = Instant::now();
    let report = processor.stop().await?;

    assert!(report.is_clean(), "unexpected report: {:?}", report);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(
        log.events_with_prefix("stop:"),
        vec!["stop:d", "stop:c", "stop:b", "stop:a"]
    );
    assert_eq!(report.stopped.len(), 4);
    assert!(registry
        .lifecycle_components()
        .iter()
        .all(|(_, component)| !component.is_running()));
    Ok(())
}
