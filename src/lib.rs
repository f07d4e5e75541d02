//! reqflow-vis - real-time request flow animation
//!
//! Animates a stream of timed request events on a 2D surface. Each request enters
//! from the left, disappears into a formation of slanted rectangles while in flight
//! and leaves to the right when done, colored by its latency bucket.
//!
//! - `core`: item model, phase state machine, lifecycle manager
//! - `render`: sprite cache, formation, circle placement, frame composition
//! - `driver`: render loop tying updates and frames to the host's pacing
//!
//! Hosts: the eframe dashboard (feature `wasm`) and the headless CLI (feature `cli`).

pub mod config;
pub mod core;
pub mod driver;
pub mod error;
pub mod render;
pub mod source;
pub mod theme;
pub mod time;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
mod app;

pub use config::EngineConfig;
pub use driver::{FrameHandle, FrameScheduler, ManualScheduler, RenderLoop};
pub use error::{EngineError, RecordError, SurfaceError};

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() -> Result<(), wasm_bindgen::JsValue> {
    use wasm_bindgen::{JsCast, JsValue};

    console_error_panic_hook::set_once();

    // Initialize tracing for browser console
    tracing_wasm::set_as_global_default();

    let canvas = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("canvas"))
        .ok_or_else(|| JsValue::from_str("no canvas element"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str("#canvas is not a canvas element"))?;

    let web_options = eframe::WebOptions::default();
    wasm_bindgen_futures::spawn_local(async move {
        let started = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(app::FlowApp::new(cc)))),
            )
            .await;
        if let Err(e) = started {
            tracing::error!(error = ?e, "Failed to start eframe");
        }
    });
    Ok(())
}
