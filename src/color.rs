use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Colour domain of the population map, in `log10(p + 1)` units.
pub const POPULATION_COLOR_RANGE: (f64, f64) = (6.0, 9.5);

// ---------------------------------------------------------------------------
// Blue ramp
// ---------------------------------------------------------------------------

/// Light-to-dark blue for `t` in `0.0..=1.0`.
pub fn blues(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let hsl = Hsl::new(210.0, 0.35 + 0.45 * t, 0.92 - 0.62 * t);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// ColorScale: transformed value → Color32
// ---------------------------------------------------------------------------

/// Linear mapping of a value domain onto [`blues`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    lo: f64,
    hi: f64,
}

impl ColorScale {
    pub fn new(lo: f64, hi: f64) -> Self {
        ColorScale { lo, hi }
    }

    pub fn population() -> Self {
        let (lo, hi) = POPULATION_COLOR_RANGE;
        ColorScale::new(lo, hi)
    }

    /// Scale over an observed range; a missing range maps everything to the dark end.
    pub fn from_range(range: Option<(f64, f64)>) -> Self {
        let (lo, hi) = range.unwrap_or((0.0, 0.0));
        ColorScale::new(lo, hi)
    }

    /// Position of `value` in the domain, clamped to `0.0..=1.0`.
    pub fn position(&self, value: f64) -> f32 {
        let span = self.hi - self.lo;
        if span.abs() < f64::EPSILON {
            return 1.0;
        }
        ((value - self.lo) / span).clamp(0.0, 1.0) as f32
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        blues(self.position(value))
    }

    /// Readable text colour on top of `color_for(value)`.
    pub fn text_color_for(&self, value: f64) -> Color32 {
        if self.position(value) > 0.5 {
            Color32::WHITE
        } else {
            Color32::BLACK
        }
    }
}
