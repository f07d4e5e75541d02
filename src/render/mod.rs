//! Rendering: sprites, formation geometry, circle placement and frame composition
//!
//! Everything here draws through the [`Surface`] trait, so the same pipeline runs on
//! an egui painter in the browser and on a recording surface in the CLI and tests.

pub mod circles;
pub mod compose;
pub mod formation;
pub mod painter;
pub mod raster;
pub mod recording;
pub mod sprite;
pub mod surface;

pub use compose::{Compositor, FrameStats};
pub use formation::{Formation, FormationSlot};
pub use painter::{EguiSurface, RepaintScheduler};
pub use recording::{DrawCommand, RecordedTexture, RecordingSurface};
pub use sprite::{SpriteCache, SpriteKind};
pub use surface::Surface;
