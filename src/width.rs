use std::time::{Duration, Instant};

use tracing::debug;

use crate::coalesce::Coalescer;
use crate::windower::clamp_frame_width;

/// Maps a slider position (0-100) to a frame width, clamped to `[min, max]`.
pub fn slider_to_width(value: f64, viewport_width: f64, min: f64, max: f64) -> f64 {
    clamp_frame_width(value * viewport_width / 100.0, min, max)
}

/// Slider position that corresponds to `width` at startup.
pub fn initial_slider_value(width: f64, viewport_width: f64, min: f64) -> f64 {
    if viewport_width <= 0.0 {
        return 0.0;
    }
    ((width * 100.0) / viewport_width - (min * 100.0) / viewport_width).clamp(0.0, 100.0)
}

/// A settled change that needs a new windowing pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidthEvent {
    /// The slider came to rest at this value.
    Slider(f64),
    /// The terminal settled at this size (columns, rows).
    Resize(u16, u16),
}

/// Slider state plus the two independent coalescers feeding the windower.
#[derive(Debug, Clone)]
pub struct WidthControl {
    slider: f64,
    step: f64,
    width: Coalescer<f64>,
    resize: Coalescer<(u16, u16)>,
}

impl WidthControl {
    pub fn new(slider: f64, step: f64, width_quiet: Duration, resize_quiet: Duration) -> Self {
        Self {
            slider: slider.clamp(0.0, 100.0),
            step,
            width: Coalescer::new(width_quiet),
            resize: Coalescer::new(resize_quiet),
        }
    }

    pub fn slider_value(&self) -> f64 {
        self.slider
    }

    /// Moves the slider. The resulting width takes effect once the slider has
    /// been still for the quiet period.
    pub fn set_slider(&mut self, value: f64, now: Instant) {
        let value = value.clamp(0.0, 100.0);
        if (value - self.slider).abs() < f64::EPSILON && !self.width.is_pending() {
            return;
        }
        self.slider = value;
        self.width.push(value, now);
    }

    /// Moves the slider by `steps` increments (negative to shrink).
    pub fn nudge(&mut self, steps: i32, now: Instant) {
        self.set_slider(self.slider + f64::from(steps) * self.step, now);
    }

    pub fn on_resize(&mut self, cols: u16, rows: u16, now: Instant) {
        self.resize.push((cols, rows), now);
    }

    /// Settled changes whose quiet period has lapsed.
    pub fn poll(&mut self, now: Instant) -> Vec<WidthEvent> {
        let mut events = Vec::new();
        if let Some(value) = self.width.poll(now) {
            debug!(slider = value, "slider settled");
            events.push(WidthEvent::Slider(value));
        }
        if let Some((cols, rows)) = self.resize.poll(now) {
            debug!(cols, rows, "resize settled");
            events.push(WidthEvent::Resize(cols, rows));
        }
        events
    }

    /// Earliest moment a pending change could settle.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.width.deadline(), self.resize.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
