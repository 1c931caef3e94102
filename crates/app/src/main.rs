use anyhow::Context;
use framegate_app::camera::FilteredCamera;
use framegate_app::config::FilteredCameraConfig;
use framegate_app::synthetic::{RandomScoreProvider, SyntheticSource};
use framegate_capture::{CaptureTicker, FrameSource};
use framegate_foundation::{
    real_clock, AppState, HealthCheck, HealthMonitor, ShutdownHandler, StateManager,
};
use framegate_telemetry::CaptureMetrics;
use framegate_vision::VisionProvider;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;

fn init_logging() -> anyhow::Result<()> {
    std::fs::create_dir_all("logs")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "framegate.log");
    let (non_blocking_file, _guard) = tracing_appender::non_blocking(file_appender);
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout.and(non_blocking_file))
        .with_env_filter(log_level)
        .init();
    std::mem::forget(_guard);
    Ok(())
}

fn load_config(path: &str) -> anyhow::Result<FilteredCameraConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {path}"))?;
    let config: FilteredCameraConfig =
        toml::from_str(&raw).with_context(|| format!("failed to parse config file {path}"))?;
    Ok(config)
}

/// Self-contained demo: synthetic frames at 2 Hz, a random classifier with a
/// high accept threshold so windows open every minute or so.
fn demo_config() -> FilteredCameraConfig {
    FilteredCameraConfig {
        camera: "demo-cam".into(),
        vision_services: vec![framegate_app::config::VisionServiceConfig {
            vision: "demo-classifier".into(),
            classifications: HashMap::from([("motion".to_string(), 0.97)]),
            ..Default::default()
        }],
        window_seconds: 3,
        image_frequency: 2.0,
        ..Default::default()
    }
}

/// Fails when the background ticker stopped storing batches between checks.
struct CaptureLiveness {
    metrics: CaptureMetrics,
    last_seen: AtomicU64,
}

impl HealthCheck for CaptureLiveness {
    fn name(&self) -> &str {
        "capture-ticker"
    }

    fn check(&self) -> Result<(), String> {
        let stored = self.metrics.batches_stored.load(Ordering::Relaxed);
        let last = self.last_seen.swap(stored, Ordering::Relaxed);
        if stored > last {
            Ok(())
        } else {
            Err(format!("no batches stored since last check (total {stored})"))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("Starting framegate");

    let state_manager = StateManager::new();
    let shutdown = ShutdownHandler::new().install().await;

    let config = match std::env::var("FRAMEGATE_CONFIG") {
        Ok(path) => load_config(&path)?,
        Err(_) => demo_config(),
    };

    let clock = real_clock();
    let metrics = CaptureMetrics::new();

    // --- 1. Frame source and vision providers ---
    let source: Arc<dyn FrameSource> = Arc::new(SyntheticSource::new(
        config.camera.clone(),
        "color",
        clock.clone(),
    ));
    let mut providers: HashMap<String, Arc<dyn VisionProvider>> = HashMap::new();
    for vs in &config.vision_services {
        providers.entry(vs.vision.clone()).or_insert_with(|| {
            Arc::new(RandomScoreProvider::new(vs.vision.clone(), "motion")) as Arc<dyn VisionProvider>
        });
    }

    // --- 2. Camera with its capture buffer ---
    let camera = FilteredCamera::new(&config, source.clone(), &providers, clock, metrics.clone())?;
    tracing::info!(
        camera = camera.name(),
        max_batches = camera.buffer().max_batches(),
        "filtered camera ready"
    );

    // --- 3. Background capture ticker ---
    let ticker = CaptureTicker::new(source, camera.buffer(), config.frequency_hz());
    let ticker_handle = ticker.spawn();
    tracing::info!("capture ticker task started");

    // --- 4. Health monitoring ---
    let health_monitor = HealthMonitor::new(Duration::from_secs(10));
    health_monitor.register(Box::new(CaptureLiveness {
        metrics: metrics.clone(),
        last_seen: AtomicU64::new(0),
    }));
    let _health_monitor = health_monitor.start();

    state_manager.transition(AppState::Running)?;
    tracing::info!("Application state: {:?}", state_manager.current());

    // --- Main consumer loop ---
    let mut pull_interval = tokio::time::interval(Duration::from_secs(2));
    let mut stats_interval = tokio::time::interval(Duration::from_secs(30));
    loop {
        tokio::select! {
            _ = shutdown.wait() => {
                tracing::info!("Shutdown signal received");
                break;
            }
            _ = pull_interval.tick() => {
                match camera.pull_batch().await {
                    Ok((frames, meta)) => {
                        tracing::info!(
                            count = frames.len(),
                            captured_at = %meta.captured_at,
                            first = frames.first().map(|f| f.source_name.as_str()).unwrap_or(""),
                            "delivered frames"
                        );
                    }
                    Err(e) if e.is_no_data() => {
                        tracing::trace!("nothing to deliver");
                    }
                    Err(e) => {
                        tracing::warn!("pull failed: {}", e);
                    }
                }
            }
            _ = stats_interval.tick() => {
                let stats = camera.stats();
                tracing::info!(
                    accepted = stats.accepted.total,
                    rejected = stats.rejected.total,
                    queue_depth = metrics.queue_depth.load(Ordering::Relaxed),
                    ring_depth = metrics.ring_depth.load(Ordering::Relaxed),
                    "trigger stats"
                );
            }
        }
    }

    // --- Graceful Shutdown ---
    tracing::info!("Beginning graceful shutdown");
    state_manager.transition(AppState::Stopping)?;

    ticker_handle.join().await;
    tracing::info!("capture ticker stopped");

    state_manager.transition(AppState::Stopped)?;
    tracing::info!(
        stored = metrics.batches_stored.load(Ordering::Relaxed),
        delivered = metrics.batches_delivered.load(Ordering::Relaxed),
        triggers = metrics.triggers.load(Ordering::Relaxed),
        "Shutdown complete"
    );
    Ok(())
}
