//! Render loop driver
//!
//! Ties the lifecycle manager and the compositor to the host's frame pacing. Logic
//! updates are throttled to `update_interval`; drawing happens on every frame.
//!
//! ```text
//! host frame ──▶ frame(now) ──▶ [tick if interval elapsed] ──▶ draw ──▶ request next frame
//! ```

use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::core::{IngestReport, LifecycleManager};
use crate::error::EngineError;
use crate::render::{Compositor, FrameStats, Surface};

/// Token for a requested frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host-side frame pacing (requestAnimationFrame, egui repaint, a timer...)
pub trait FrameScheduler {
    /// Ask the host to call `RenderLoop::frame` once more
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request. Unknown or already-fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler polled by the host: at most one frame is pending at a time
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    pending: Option<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the pending request, if any. The host then runs one frame.
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed, not yet started
    Idle,
    Running,
    /// Terminal: resources released
    Stopped,
}

pub struct RenderLoop<S: Surface, F: FrameScheduler> {
    config: EngineConfig,
    state: LoopState,
    lifecycle: LifecycleManager,
    compositor: Compositor<S::Texture>,
    surface: S,
    scheduler: F,
    pending: Option<FrameHandle>,
    last_update: Option<f64>,
    frames: u64,
}

impl<S: Surface, F: FrameScheduler> RenderLoop<S, F> {
    /// Fails if the config is invalid or the surface has no usable area
    pub fn new(config: EngineConfig, surface: S, scheduler: F) -> Result<Self, EngineError> {
        config.validate()?;
        if !surface.is_usable() {
            let size = surface.size();
            return Err(EngineError::SurfaceUnavailable(format!(
                "surface has no drawable area ({} x {})",
                size.x, size.y
            )));
        }

        Ok(Self {
            lifecycle: LifecycleManager::new(config.cleanup_interval, config.eviction_grace),
            compositor: Compositor::new(config.clone()),
            config,
            state: LoopState::Idle,
            surface,
            scheduler,
            pending: None,
            last_update: None,
            frames: 0,
        })
    }

    /// Hand a batch of raw records to the lifecycle manager.
    /// They become visible on the next logic update. Batches arriving after
    /// `stop` are dropped and reported as an empty `IngestReport`.
    pub fn ingest(&mut self, records: &[Value], now: f64) -> IngestReport {
        if self.state == LoopState::Stopped {
            debug!(records = records.len(), "Ignoring batch after stop");
            return IngestReport::default();
        }
        self.lifecycle.ingest(records, now)
    }

    /// Begin requesting frames. No-op while running.
    pub fn start(&mut self) -> Result<(), EngineError> {
        match self.state {
            LoopState::Running => Ok(()),
            LoopState::Stopped => Err(EngineError::Stopped),
            LoopState::Idle => {
                self.state = LoopState::Running;
                self.pending = Some(self.scheduler.request_frame());
                info!(
                    update_interval = self.config.update_interval,
                    cleanup_interval = self.config.cleanup_interval,
                    "Render loop started"
                );
                Ok(())
            }
        }
    }

    /// Run one animation frame at wall-clock `now`. Returns None unless running.
    pub fn frame(&mut self, now: f64) -> Option<FrameStats> {
        if self.state != LoopState::Running {
            return None;
        }
        self.pending = None;

        let due = self
            .last_update
            .map_or(true, |last| now - last >= self.config.update_interval);
        if due {
            self.lifecycle.tick(now);
            self.last_update = Some(now);
        }

        let stats = self.compositor.draw(&mut self.surface, self.lifecycle.items());
        self.frames += 1;
        trace!(frame = self.frames, updated = due, "Frame done");

        self.pending = Some(self.scheduler.request_frame());
        Some(stats)
    }

    /// Cancel the pending frame and release everything. Idempotent; the loop cannot
    /// be restarted afterwards.
    pub fn stop(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }

        self.compositor.release();
        if let Err(e) = self.surface.release() {
            warn!(error = %e, "Surface release failed during teardown");
        }
        self.lifecycle.clear();
        self.state = LoopState::Stopped;
        debug!(frames = self.frames, "Render loop stopped");
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Frames drawn so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, RecordingSurface};
    use serde_json::json;

    type TestLoop = RenderLoop<RecordingSurface, ManualScheduler>;

    fn new_loop() -> TestLoop {
        RenderLoop::new(
            EngineConfig::default(),
            RecordingSurface::new(1200.0, 800.0),
            ManualScheduler::new(),
        )
        .unwrap()
    }

    fn clears(commands: &[DrawCommand]) -> usize {
        commands.iter().filter(|c| matches!(c, DrawCommand::Clear(_))).count()
    }

    #[test]
    fn test_unusable_surface_is_fatal() {
        let err = RenderLoop::new(
            EngineConfig::default(),
            RecordingSurface::new(0.0, 600.0),
            ManualScheduler::new(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, EngineError::SurfaceUnavailable(_)), "got {err:?}");

        let mut config = EngineConfig::default();
        config.update_interval = 0.0;
        let err = RenderLoop::new(config, RecordingSurface::new(100.0, 100.0), ManualScheduler::new())
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut rl = new_loop();
        assert_eq!(rl.frame(0.0), None, "no frames before start");

        rl.start().unwrap();
        rl.start().unwrap();
        assert!(rl.is_running());
        assert_eq!(rl.scheduler().requested(), 1);
        assert!(rl.pending_frame().is_some());
    }

    #[test]
    fn test_logic_updates_are_throttled() {
        let mut rl = new_loop();
        rl.ingest(&[json!({"id": 1, "executionTime": 40, "startOffset": 0})], 0.0);
        rl.start().unwrap();

        rl.frame(0.0);
        assert_eq!(rl.lifecycle().len(), 1, "first frame runs an update");
        assert_eq!(rl.lifecycle().items()[0].state.elapsed, 0.0);

        rl.frame(0.05);
        assert_eq!(rl.lifecycle().items()[0].state.elapsed, 0.0, "too early for an update");

        rl.frame(0.1);
        assert!((rl.lifecycle().items()[0].state.elapsed - 0.1).abs() < 1e-9);

        // Every frame redraws regardless
        assert_eq!(clears(rl.surface().commands()), 3);
        assert_eq!(rl.frames(), 3);
        assert_eq!(rl.scheduler().requested(), 4);
    }

    #[test]
    fn test_ingest_is_deferred_to_next_update() {
        let mut rl = new_loop();
        rl.start().unwrap();
        rl.frame(0.0);

        rl.ingest(&[json!({"id": 1, "executionTime": 5})], 0.02);
        rl.frame(0.05);
        assert!(rl.lifecycle().is_empty());
        assert_eq!(rl.lifecycle().pending_len(), 1);

        rl.frame(0.1);
        assert_eq!(rl.lifecycle().len(), 1);
    }

    #[test]
    fn test_stop_releases_everything() {
        let mut rl = new_loop();
        rl.ingest(&[json!({"id": 1, "executionTime": 5})], 0.0);
        rl.start().unwrap();
        rl.frame(0.0);
        rl.frame(0.5);

        rl.stop();
        assert_eq!(rl.state(), LoopState::Stopped);
        assert_eq!(rl.pending_frame(), None);
        assert_eq!(rl.scheduler().cancelled(), 1);
        assert!(!rl.scheduler().is_pending());
        assert!(rl.surface().is_released());
        assert!(rl.lifecycle().is_empty());

        // Idempotent, and terminal
        rl.stop();
        assert!(matches!(rl.start(), Err(EngineError::Stopped)));
        assert_eq!(rl.frame(1.0), None);
        // Dropped, not validated: the record itself is fine
        let report = rl.ingest(&[json!({"id": 2, "executionTime": 5})], 1.0);
        assert_eq!(report, IngestReport::default());
        assert_eq!(rl.lifecycle().pending_len(), 0);
    }

    #[test]
    fn test_stop_swallows_surface_errors() {
        let mut rl = new_loop();
        rl.start().unwrap();
        rl.surface_mut().release().unwrap();
        rl.stop();
        assert_eq!(rl.state(), LoopState::Stopped);
    }

    #[test]
    fn test_items_flow_through_to_eviction() {
        let mut rl = new_loop();
        let batch: Vec<Value> = (0..3)
            .map(|i| json!({"id": i, "executionTime": 2, "startOffset": 0.1 * i as f64}))
            .collect();
        let report = rl.ingest(&batch, 0.0);
        assert_eq!(report.accepted, 3);
        rl.start().unwrap();

        let mut max_drawn = 0;
        let mut saw_end = false;
        for i in 0..=(8 * 60) {
            let now = i as f64 / 60.0;
            let stats = rl.frame(now).unwrap();
            max_drawn = max_drawn.max(stats.circles_drawn);
            saw_end |= rl.lifecycle().phase_counts().end > 0;
            rl.surface_mut().take_commands();
        }

        assert!(max_drawn >= 1, "circles were on screen");
        assert!(saw_end, "items reached the end phase");
        assert!(rl.lifecycle().is_empty(), "finished items were evicted");
    }
}
