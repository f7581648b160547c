//! Range selection over the full frame list.
//!
//! [`Selection`] owns the frames of the current task together with the set of
//! selected ids. Every mutation goes through [`Selection::apply`], which updates
//! the `marked` flags and the id set in one step, so that
//! `selected == { f.id | f.marked }` holds after every call regardless of which
//! page is on screen.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use tracing::trace;

use crate::models::{Frame, FrameId};

/// Progress of the two-click range gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeGesture {
    #[default]
    Idle,
    /// The first click landed on this frame; the next click commits a range.
    StartPicked(FrameId),
}

/// A combined update of `marked` flags and the selected-id set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOp {
    Mark(RangeInclusive<usize>),
    Unmark(RangeInclusive<usize>),
    SelectAll,
    DeselectAll,
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    frames: Vec<Frame>,
    selected: HashSet<FrameId>,
    gesture: RangeGesture,
}

impl Selection {
    /// Starts a selection from freshly loaded frames, honouring their initial
    /// `marked` flags.
    pub fn new(frames: Vec<Frame>) -> Self {
        let selected = frames.iter().filter(|f| f.marked).map(|f| f.id).collect();
        Self {
            frames,
            selected,
            gesture: RangeGesture::Idle,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn selected(&self) -> &HashSet<FrameId> {
        &self.selected
    }

    /// Selected ids in frame order.
    pub fn selected_in_order(&self) -> Vec<FrameId> {
        self.frames
            .iter()
            .filter(|f| self.selected.contains(&f.id))
            .map(|f| f.id)
            .collect()
    }

    pub fn gesture(&self) -> RangeGesture {
        self.gesture
    }

    pub fn index_of(&self, id: FrameId) -> Option<usize> {
        self.frames.iter().position(|f| f.id == id)
    }

    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id == id)
    }

    pub fn is_consistent(&self) -> bool {
        let marked: HashSet<FrameId> = self
            .frames
            .iter()
            .filter(|f| f.marked)
            .map(|f| f.id)
            .collect();
        marked == self.selected
    }

    /// Applies one combined update. Ranges are clipped to the frame list.
    pub fn apply(&mut self, op: SelectionOp) {
        trace!(?op, "selection op");
        match op {
            SelectionOp::Mark(range) => self.set_range(range, true),
            SelectionOp::Unmark(range) => self.set_range(range, false),
            SelectionOp::SelectAll => {
                for frame in &mut self.frames {
                    frame.marked = true;
                    self.selected.insert(frame.id);
                }
            }
            SelectionOp::DeselectAll => {
                for frame in &mut self.frames {
                    frame.marked = false;
                    self.selected.remove(&frame.id);
                }
            }
        }
    }

    fn set_range(&mut self, range: RangeInclusive<usize>, marked: bool) {
        let (start, end) = range.into_inner();
        let Some(last) = self.frames.len().checked_sub(1) else {
            return;
        };
        if start > end || start > last {
            return;
        }
        for frame in &mut self.frames[start..=end.min(last)] {
            frame.marked = marked;
            if marked {
                self.selected.insert(frame.id);
            } else {
                self.selected.remove(&frame.id);
            }
        }
    }

    /// Left click on a frame. Returns `false` when the id is unknown.
    ///
    /// The first click marks the frame on its own and remembers it as the
    /// range start. The second click marks the inclusive range between the two,
    /// unless it lies before the start, in which case only the start frame is
    /// unmarked again.
    pub fn click(&mut self, id: FrameId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        match self.gesture {
            RangeGesture::Idle => self.pick_start(id, index),
            RangeGesture::StartPicked(start) => match self.index_of(start) {
                Some(start_index) if start_index > index => {
                    self.gesture = RangeGesture::Idle;
                    self.apply(SelectionOp::Unmark(start_index..=start_index));
                }
                Some(start_index) => {
                    self.gesture = RangeGesture::Idle;
                    self.apply(SelectionOp::Mark(start_index..=index));
                }
                // the start frame vanished with a reload; begin again here
                None => self.pick_start(id, index),
            },
        }
        true
    }

    fn pick_start(&mut self, id: FrameId, index: usize) {
        self.gesture = RangeGesture::StartPicked(id);
        self.apply(SelectionOp::Mark(index..=index));
    }

    /// Right click on a frame. Unmarks the contiguous run of marked frames
    /// around it and returns `true`; unmarked or unknown frames are left alone
    /// and `false` is returned.
    pub fn context_click(&mut self, id: FrameId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        match marked_run_around(&self.frames, index) {
            Some(run) => {
                self.apply(SelectionOp::Unmark(run));
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self) {
        self.apply(SelectionOp::SelectAll);
    }

    pub fn deselect_all(&mut self) {
        self.apply(SelectionOp::DeselectAll);
    }

    /// Replaces the frames with a re-fetched copy of the same task. Frames keep
    /// their selection; frames the source reports as marked are added to it.
    pub fn rebase(&mut self, frames: Vec<Frame>) {
        self.frames = frames;
        for frame in &mut self.frames {
            frame.marked = frame.marked || self.selected.contains(&frame.id);
        }
        self.selected = self
            .frames
            .iter()
            .filter(|f| f.marked)
            .map(|f| f.id)
            .collect();
        if let RangeGesture::StartPicked(start) = self.gesture {
            if self.index_of(start).is_none() {
                self.gesture = RangeGesture::Idle;
            }
        }
    }
}

/// The inclusive index range of the run of marked frames containing `index`,
/// bounded on each side by the nearest unmarked frame or the end of the list.
/// `None` when the frame at `index` is not marked.
pub fn marked_run_around(frames: &[Frame], index: usize) -> Option<RangeInclusive<usize>> {
    if !frames.get(index)?.marked {
        return None;
    }
    let finish = frames[index..]
        .iter()
        .position(|f| !f.marked)
        .map_or(frames.len() - 1, |offset| index + offset - 1);
    let start = frames[..index]
        .iter()
        .rposition(|f| !f.marked)
        .map_or(0, |i| i + 1);
    Some(start..=finish)
}
