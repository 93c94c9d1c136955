//! Sand level rendering.
//!
//! The renderer turns a duration into a pixel extent; drawing it is up to
//! the [`RenderSurface`]. In portrait the bulbs are stacked and the sand
//! grows in height, in landscape they sit side by side and it grows in width.

use serde::{Deserialize, Serialize};

/// Pixel extent of a completely full bulb.
pub const DEFAULT_MAX_SAND_PX: u32 = 459;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bulb {
    /// Holds the remaining time.
    Upper,
    /// Holds the elapsed time.
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "axis", content = "px")]
pub enum SandExtent {
    Height(u32),
    Width(u32),
}

impl SandExtent {
    pub fn px(self) -> u32 {
        match self {
            SandExtent::Height(px) | SandExtent::Width(px) => px,
        }
    }
}

/// Something the sand can be drawn on.
pub trait RenderSurface {
    fn set_extent(&mut self, bulb: Bulb, extent: SandExtent);

    fn request_layout(&mut self, bulb: Bulb);
}

/// Maps durations to sand extents.
#[derive(Debug, Clone, Copy)]
pub struct SandRenderer {
    capacity_ms: i64,
    max_sand_px: u32,
}

impl SandRenderer {
    pub fn new(capacity_ms: i64, max_sand_px: u32) -> Self {
        Self {
            capacity_ms: capacity_ms.max(1),
            max_sand_px,
        }
    }

    /// Linear in `duration_ms / capacity`, truncated, never outside
    /// `0..=max_sand_px`.
    pub fn extent(&self, duration_ms: i64, orientation: Orientation) -> SandExtent {
        let fraction = (duration_ms as f32 / self.capacity_ms as f32).clamp(0.0, 1.0);
        let px = (self.max_sand_px as f32 * fraction) as u32;
        match orientation {
            Orientation::Portrait => SandExtent::Height(px),
            Orientation::Landscape => SandExtent::Width(px),
        }
    }

    pub fn render<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        bulb: Bulb,
        duration_ms: i64,
        orientation: Orientation,
    ) {
        surface.set_extent(bulb, self.extent(duration_ms, orientation));
        surface.request_layout(bulb);
    }
}
