//! Text rendering of the two bulbs.

use hourglass_core::{Bulb, RenderSurface, SandExtent};

const BAR_WIDTH: u32 = 40;

/// Draws each bulb as a bar on stderr after a layout request.
pub struct TextSurface {
    max_sand_px: u32,
    upper: Option<SandExtent>,
    lower: Option<SandExtent>,
    dirty: bool,
}

impl TextSurface {
    pub fn new(max_sand_px: u32) -> Self {
        Self {
            max_sand_px: max_sand_px.max(1),
            upper: None,
            lower: None,
            dirty: false,
        }
    }

    fn bar(&self, label: &str, extent: Option<SandExtent>) -> String {
        let Some(extent) = extent else {
            return format!("{label:>5} |{}|", " ".repeat(BAR_WIDTH as usize));
        };
        let (axis, px) = match extent {
            SandExtent::Height(px) => ("height", px),
            SandExtent::Width(px) => ("width", px),
        };
        let filled = (px.min(self.max_sand_px) * BAR_WIDTH / self.max_sand_px) as usize;
        format!(
            "{label:>5} |{}{}| {axis} {px}px",
            "#".repeat(filled),
            " ".repeat(BAR_WIDTH as usize - filled),
        )
    }

    /// Draw if anything changed since the last draw.
    pub fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        eprintln!("{}", self.bar("upper", self.upper));
        eprintln!("{}", self.bar("lower", self.lower));
    }
}

impl RenderSurface for TextSurface {
    fn set_extent(&mut self, bulb: Bulb, extent: SandExtent) {
        match bulb {
            Bulb::Upper => self.upper = Some(extent),
            Bulb::Lower => self.lower = Some(extent),
        }
    }

    fn request_layout(&mut self, _bulb: Bulb) {
        self.dirty = true;
    }
}
