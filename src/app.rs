//! eframe host for the browser
//!
//! Feeds mock batches into the render loop once per second and paints the engine
//! into the central panel through an `EguiSurface`.

use std::collections::VecDeque;

use eframe::egui;
use tracing::{error, info, warn};

use crate::config::EngineConfig;
use crate::core::parse_payload;
use crate::driver::RenderLoop;
use crate::render::{EguiSurface, FrameStats, RepaintScheduler};
use crate::source::MockSource;
use crate::theme::{colors, rgb};
use crate::time::{now_seconds, Every, FpsCounter};

type Engine = RenderLoop<EguiSurface, RepaintScheduler>;

pub struct FlowApp {
    config: EngineConfig,
    /// Created on the first frame, once the panel has a size
    engine: Option<Engine>,
    init_error: Option<String>,
    source: MockSource,
    fetch: Every,
    /// Payloads waiting to be parsed, drained under a time budget
    msg_buffer: VecDeque<String>,
    fps_counter: FpsCounter,
    last_stats: FrameStats,
}

impl FlowApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        Self {
            config: load_config(),
            engine: None,
            init_error: None,
            source: MockSource::new(),
            fetch: Every::new(1.0),
            msg_buffer: VecDeque::new(),
            fps_counter: FpsCounter::default(),
            last_stats: FrameStats::default(),
        }
    }

    /// Parse buffered payloads into the engine, yielding after ~12ms
    fn process_messages(&mut self) {
        const BUDGET_MS: f64 = 12.0;
        let deadline = js_sys::Date::now() + BUDGET_MS;
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        while let Some(msg) = self.msg_buffer.pop_front() {
            if let Some(records) = parse_payload(&msg) {
                engine.ingest(&records, now_seconds());
            }
            if js_sys::Date::now() >= deadline {
                break;
            }
        }
    }

    fn ensure_engine(&mut self, ctx: &egui::Context, painter: egui::Painter) {
        if let Some(engine) = self.engine.as_mut() {
            engine.surface_mut().attach(painter);
            return;
        }

        let surface = EguiSurface::new(ctx.clone(), painter);
        let scheduler = RepaintScheduler::new(ctx.clone());
        match RenderLoop::new(self.config.clone(), surface, scheduler).and_then(|mut engine| {
            engine.start()?;
            Ok(engine)
        }) {
            Ok(engine) => {
                info!("Engine ready");
                self.engine = Some(engine);
                self.init_error = None;
            }
            Err(e) => {
                // Retried every frame; the panel may not be laid out yet
                if self.init_error.is_none() {
                    error!(error = %e, "Failed to create engine");
                }
                self.init_error = Some(e.to_string());
            }
        }
    }

    fn render_header(&self, ui: &mut egui::Ui) {
        let muted = egui::Color32::from_gray(120);
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(format!("{:.0} fps", self.fps_counter.fps()))
                    .color(muted)
                    .monospace()
                    .size(11.0),
            );
            ui.label(egui::RichText::new("/").color(muted).size(11.0));

            let tracked = self.engine.as_ref().map_or(0, |e| e.lifecycle().len());
            ui.label(
                egui::RichText::new(format!(
                    "{tracked} requests / {} slots / {} circles",
                    self.last_stats.slots, self.last_stats.circles_drawn
                ))
                .color(muted)
                .monospace()
                .size(11.0),
            );

            if let Some(err) = &self.init_error {
                ui.colored_label(rgb(colors::SLOW), egui::RichText::new(err).size(11.0));
            }
        });
    }
}

impl eframe::App for FlowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = now_seconds();
        self.fps_counter.tick(now);

        if self.fetch.due(now) {
            self.msg_buffer.push_back(self.source.payload());
        }
        self.process_messages();

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(rgb(self.config.palette.background)))
            .show(ctx, |ui| {
                self.render_header(ui);

                let (rect, _) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
                self.ensure_engine(ctx, ui.painter_at(rect));

                if let Some(engine) = self.engine.as_mut() {
                    if let Some(stats) = engine.frame(now) {
                        self.last_stats = stats;
                    }
                }
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(engine) = self.engine.as_mut() {
            engine.stop();
        }
    }
}

/// Engine config from the `window.__reqflow_config` JSON string, if set
fn load_config() -> EngineConfig {
    let Some(json) = js_sys::eval("window.__reqflow_config")
        .ok()
        .and_then(|v| v.as_string())
    else {
        return EngineConfig::default();
    };

    EngineConfig::from_json(&json).unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring invalid window.__reqflow_config");
        EngineConfig::default()
    })
}
