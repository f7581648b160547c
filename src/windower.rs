//! Page sizing and slicing.
//!
//! The page size is measurement driven: the render surface lays frames out at
//! the current width and reports where each one ends. The windower never looks
//! at the layout rules themselves.

use std::ops::Range;

use tracing::{debug, info};

use crate::viewport::Viewport;

/// Index of the first frame that does not fully fit above
/// `viewport_height - bottom_margin`, i.e. how many frames fit on one page.
///
/// Returns `None` when every measured frame fits. A page always holds at least
/// one frame, even when the first one already overflows.
pub fn frames_per_page(frame_bottoms: &[f64], viewport_height: f64, bottom_margin: f64) -> Option<usize> {
    let limit = viewport_height - bottom_margin;
    frame_bottoms
        .iter()
        .position(|bottom| *bottom > limit)
        .map(|index| index.max(1))
}

pub fn total_pages(total_frames: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total_frames.div_ceil(per_page)
}

/// `frames[done_pages * per_page ..][.. per_page]`, clipped to the list.
pub fn page_range(total_frames: usize, per_page: usize, done_pages: usize) -> Range<usize> {
    let start = done_pages.saturating_mul(per_page).min(total_frames);
    let end = start.saturating_add(per_page).min(total_frames);
    start..end
}

/// Largest frame width that still leaves room for one row below the grid top
/// and whose tile, `width * tile_aspect` rows tall, fits inside the grid.
/// Falls back to `fallback` while the grid has not been laid out yet.
pub fn max_frame_width(viewport: &Viewport, grid_margin: f64, tile_aspect: f64, fallback: f64) -> f64 {
    let top = match viewport.grid_top {
        Some(top) if viewport.height > 0.0 => top,
        _ => return fallback,
    };
    let by_viewport = (viewport.width * (viewport.height - (top + grid_margin))) / viewport.height;
    match viewport.grid_bottom {
        Some(bottom) if tile_aspect > 0.0 => {
            by_viewport.min((bottom - top - grid_margin).max(0.0) / tile_aspect)
        }
        _ => by_viewport,
    }
}

/// Clamps to `[min, max]`; when the bounds cross, `max` wins.
pub fn clamp_frame_width(desired: f64, min: f64, max: f64) -> f64 {
    let mut width = desired;
    if width < min {
        width = min;
    }
    if width > max {
        width = max;
    }
    width
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageState {
    pub frame_width: f64,
    /// `None` until the current width has been measured.
    pub frames_per_page: Option<usize>,
    pub done_pages: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone)]
pub struct Windower {
    state: PageState,
    total_frames: usize,
}

impl Windower {
    pub fn new(frame_width: f64) -> Self {
        Self {
            state: PageState {
                frame_width,
                frames_per_page: None,
                done_pages: 0,
                total_pages: 0,
            },
            total_frames: 0,
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn frame_width(&self) -> f64 {
        self.state.frame_width
    }

    pub fn set_frame_width(&mut self, frame_width: f64) {
        self.state.frame_width = frame_width;
        self.reset();
    }

    /// Back to the first page with a stale page size.
    pub fn reset(&mut self) {
        self.state.done_pages = 0;
        self.state.frames_per_page = None;
        self.state.total_pages = 0;
    }

    pub fn needs_measurement(&self) -> bool {
        self.state.frames_per_page.is_none()
    }

    /// Feeds the bottom edges of the laid-out frame list. Returns `true` when
    /// the page size changed.
    ///
    /// When everything fits and no page size is known yet, the whole list is a
    /// single page.
    pub fn measure(
        &mut self,
        total_frames: usize,
        frame_bottoms: &[f64],
        viewport_height: f64,
        bottom_margin: f64,
    ) -> bool {
        self.total_frames = total_frames;
        let per_page = match frames_per_page(frame_bottoms, viewport_height, bottom_margin) {
            Some(per_page) => per_page,
            None => match self.state.frames_per_page {
                Some(_) => {
                    debug!("all frames fit, page size unchanged");
                    self.state.total_pages = total_pages(total_frames, self.per_page());
                    return false;
                }
                None => total_frames.max(1),
            },
        };
        let changed = self.state.frames_per_page != Some(per_page);
        self.state.frames_per_page = Some(per_page);
        self.state.total_pages = total_pages(total_frames, per_page);
        info!(
            frame_width = self.state.frame_width,
            frames_per_page = per_page,
            total_pages = self.state.total_pages,
            "windowed frames"
        );
        changed
    }

    fn per_page(&self) -> usize {
        self.state.frames_per_page.unwrap_or(self.total_frames.max(1))
    }

    /// The visible slice. Before measurement this is the whole list, which is
    /// what the measurement pass lays out.
    pub fn page_range(&self, total_frames: usize) -> Range<usize> {
        match self.state.frames_per_page {
            Some(per_page) => page_range(total_frames, per_page, self.state.done_pages),
            None => 0..total_frames,
        }
    }

    /// Exactly one page left to review.
    pub fn is_done(&self) -> bool {
        self.state.frames_per_page.is_some()
            && self.state.total_pages.checked_sub(self.state.done_pages) == Some(1)
    }

    pub fn left_pages(&self) -> usize {
        self.state.total_pages.saturating_sub(self.state.done_pages)
    }

    /// Moves to the next page unless this is the last one or the page size is
    /// stale.
    pub fn advance(&mut self) -> bool {
        if self.needs_measurement() || self.is_done() || self.left_pages() == 0 {
            return false;
        }
        self.state.done_pages += 1;
        true
    }
}
