//! Default palette for the request-flow canvas
//!
//! White page, black overlay text, and one color per latency bucket.

use egui::Color32;

/// Default colors, stored as plain RGB so they can round-trip through config files.
pub mod colors {
    // === Latency buckets ===
    pub const FAST: [u8; 3] = [0x38, 0xb6, 0xff];   // #38B6FF - light blue
    pub const NORMAL: [u8; 3] = [0xff, 0x98, 0x00]; // #FF9800 - orange
    pub const SLOW: [u8; 3] = [0xff, 0x6f, 0x6f];   // #FF6F6F - salmon

    // === Page ===
    pub const BACKGROUND: [u8; 3] = [0xff, 0xff, 0xff]; // #FFFFFF
    pub const TEXT: [u8; 3] = [0x00, 0x00, 0x00];       // #000000
}

/// Convert a config RGB triple to an opaque egui color
#[inline]
pub fn rgb([r, g, b]: [u8; 3]) -> Color32 {
    Color32::from_rgb(r, g, b)
}

/// Same color at reduced opacity (premultiplied, as egui expects)
#[inline]
pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}
