//! Headless CLI host for the animation engine
//!
//! Drives the render loop against a recording surface, feeding it mock batches once
//! per second, and logs what it would have drawn.
//!
//! Run with: cargo run --features cli --bin reqflow-cli
//!
//! Environment:
//! - `REQFLOW_CONFIG`: path to a JSON engine config
//! - `REQFLOW_RUN_SECS`: stop after this many seconds (default: run until Ctrl-C)

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::time::Duration;

    use reqflow_vis::core::parse_payload;
    use reqflow_vis::render::{FrameStats, RecordingSurface};
    use reqflow_vis::source::MockSource;
    use reqflow_vis::time::{now_seconds, FpsCounter};
    use reqflow_vis::{EngineConfig, ManualScheduler, RenderLoop};
    use tracing::{info, warn};
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqflow_vis=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let config = match std::env::var("REQFLOW_CONFIG") {
        Ok(path) => {
            info!(path = %path, "Loading config");
            EngineConfig::load(&path)?
        }
        Err(_) => EngineConfig::default(),
    };
    let run_for = std::env::var("REQFLOW_RUN_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs);

    let surface = RecordingSurface::new(1200.0, 800.0);
    let mut engine = RenderLoop::new(config, surface, ManualScheduler::new())?;
    engine.start()?;

    let mut source = MockSource::new();
    let mut fps = FpsCounter::default();
    let mut last_stats = FrameStats::default();
    let mut batches = 0u64;
    let mut accepted = 0u64;
    let mut rejected = 0u64;

    let mut frame_interval = tokio::time::interval(Duration::from_millis(16));
    let mut fetch_interval = tokio::time::interval(Duration::from_secs(1));
    let mut stats_interval = tokio::time::interval(Duration::from_secs(5));
    let deadline = tokio::time::sleep(run_for.unwrap_or(Duration::MAX));
    tokio::pin!(deadline);

    info!(run_secs = ?run_for.map(|d| d.as_secs()), "Render loop running");

    loop {
        tokio::select! {
            _ = frame_interval.tick() => {
                if engine.scheduler_mut().take_pending().is_none() {
                    continue;
                }
                let now = now_seconds();
                fps.tick(now);
                if let Some(stats) = engine.frame(now) {
                    last_stats = stats;
                }
                // Nothing consumes the recording; keep memory flat
                engine.surface_mut().take_commands();
            }
            _ = fetch_interval.tick() => {
                let payload = source.payload();
                match parse_payload(&payload) {
                    Some(records) => {
                        let report = engine.ingest(&records, now_seconds());
                        batches += 1;
                        accepted += report.accepted as u64;
                        rejected += report.rejected as u64;
                    }
                    None => warn!("Mock payload did not parse"),
                }
            }
            _ = stats_interval.tick() => {
                let phases = engine.lifecycle().phase_counts();
                info!(
                    fps = format!("{:.1}", fps.fps()),
                    tracked = engine.lifecycle().len(),
                    start = phases.start,
                    progress = phases.progress,
                    end = phases.end,
                    slots = last_stats.slots,
                    circles = last_stats.circles_drawn,
                    culled = last_stats.circles_culled,
                    batches,
                    accepted,
                    rejected,
                    "stats"
                );
            }
            _ = &mut deadline => {
                info!("Run time elapsed");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    engine.stop();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
