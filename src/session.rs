//! One review session: the loaded task, its selection, the page counter and
//! the busy/deferred-input bookkeeping around task loads.

use std::collections::VecDeque;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::error::FramesiftError;
use crate::models::{Completion, Frame, FrameId, Task};
use crate::selection::Selection;
use crate::windower::Windower;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Failed(String),
    Reviewing,
    Completed,
}

/// Events from the render surface and the action bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    FrameClick(FrameId),
    FrameContextClick(FrameId),
    FrameHover(FrameId),
    SelectAll,
    DeselectAll,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    /// Queued until the running load and measurement finish.
    Deferred,
    Updated,
    /// Right click on an unmarked frame; the default context action stands.
    ContextMenu,
    /// Image reference of the frame under the pointer.
    Hovered(String),
    Advanced,
    Completed(Completion),
}

/// Identifies one task load. Results carrying an older ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug)]
pub struct ReviewSession {
    task_id: Option<String>,
    title: String,
    selection: Selection,
    windower: Windower,
    phase: Phase,
    deferred: VecDeque<Input>,
    generation: u64,
    hovered: Option<FrameId>,
}

impl ReviewSession {
    pub fn new(frame_width: f64) -> Self {
        Self {
            task_id: None,
            title: String::new(),
            selection: Selection::default(),
            windower: Windower::new(frame_width),
            phase: Phase::Loading,
            deferred: VecDeque::new(),
            generation: 0,
            hovered: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn windower(&self) -> &Windower {
        &self.windower
    }

    pub fn hovered(&self) -> Option<FrameId> {
        self.hovered
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    pub fn frames(&self) -> &[Frame] {
        self.selection.frames()
    }

    /// The frames currently on screen.
    pub fn page(&self) -> &[Frame] {
        let frames = self.selection.frames();
        &frames[self.windower.page_range(frames.len())]
    }

    /// Loading, or loaded but not yet measured at the current width.
    pub fn is_busy(&self) -> bool {
        match self.phase {
            Phase::Loading => true,
            Phase::Reviewing | Phase::Completed => self.windower.needs_measurement(),
            Phase::Failed(_) => false,
        }
    }

    pub fn needs_measurement(&self) -> bool {
        matches!(self.phase, Phase::Reviewing | Phase::Completed) && self.windower.needs_measurement()
    }

    /// Changes the frame width; the caller follows up with a reload.
    pub fn set_frame_width(&mut self, frame_width: f64) {
        self.windower.set_frame_width(frame_width);
    }

    /// Starts a (re)load: back to the first page with a stale page size.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.phase = Phase::Loading;
        self.windower.reset();
        debug!(generation = self.generation, "task load started");
        LoadTicket(self.generation)
    }

    /// Installs the result of a load. Returns `false` for superseded loads.
    ///
    /// Reloading the task that is already under review keeps its selection; a
    /// different task starts a fresh one.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Task, FramesiftError>,
    ) -> bool {
        if ticket.0 != self.generation {
            debug!(ticket = ticket.0, current = self.generation, "dropping superseded task load");
            return false;
        }
        match result {
            Ok(task) => {
                info!(task_id = %task.id, frames = task.frames.len(), "task loaded");
                if self.task_id.as_deref() == Some(task.id.as_str()) {
                    self.selection.rebase(task.frames);
                } else {
                    self.selection = Selection::new(task.frames);
                    self.hovered = None;
                }
                self.task_id = Some(task.id);
                self.title = task.title;
                self.phase = Phase::Reviewing;
            }
            Err(err) => {
                warn!(error = %err, "task load failed");
                self.phase = Phase::Failed(err.to_string());
                self.deferred.clear();
            }
        }
        true
    }

    /// Feeds the layout of the frame list at the current width and replays
    /// any input that arrived while busy.
    pub fn measure(
        &mut self,
        frame_bottoms: &[f64],
        viewport_height: f64,
        bottom_margin: f64,
    ) -> Vec<Outcome> {
        if !matches!(self.phase, Phase::Reviewing | Phase::Completed) {
            return Vec::new();
        }
        let total = self.selection.frames().len();
        self.windower
            .measure(total, frame_bottoms, viewport_height, bottom_margin);
        let mut outcomes = Vec::with_capacity(self.deferred.len());
        while let Some(input) = self.deferred.pop_front() {
            outcomes.push(self.handle(input));
        }
        outcomes
    }

    pub fn dispatch(&mut self, input: Input) -> Outcome {
        if let Phase::Failed(_) = self.phase {
            return Outcome::Ignored;
        }
        if self.is_busy() {
            if let Input::FrameHover(_) = input {
                return Outcome::Ignored;
            }
            self.deferred.push_back(input);
            return Outcome::Deferred;
        }
        self.handle(input)
    }

    fn handle(&mut self, input: Input) -> Outcome {
        match input {
            Input::FrameClick(id) => {
                if self.selection.click(id) {
                    Outcome::Updated
                } else {
                    Outcome::Ignored
                }
            }
            Input::FrameContextClick(id) => {
                if self.selection.frame(id).is_none() {
                    Outcome::Ignored
                } else if self.selection.context_click(id) {
                    Outcome::Updated
                } else {
                    Outcome::ContextMenu
                }
            }
            Input::FrameHover(id) => match self.selection.frame(id) {
                Some(frame) => {
                    self.hovered = Some(id);
                    Outcome::Hovered(frame.image_ref.clone())
                }
                None => Outcome::Ignored,
            },
            Input::SelectAll => {
                self.selection.select_all();
                Outcome::Updated
            }
            Input::DeselectAll => {
                self.selection.deselect_all();
                Outcome::Updated
            }
            Input::Next => self.next(),
        }
    }

    fn next(&mut self) -> Outcome {
        if self.windower.is_done() {
            let completion = Completion {
                task_id: self.task_id.clone().unwrap_or_default(),
                selected: self.selection.selected_in_order(),
                completed_at: Local::now(),
            };
            info!(
                task_id = %completion.task_id,
                selected = completion.selected.len(),
                "review completed"
            );
            self.phase = Phase::Completed;
            return Outcome::Completed(completion);
        }
        if self.windower.advance() {
            let state = self.windower.state();
            info!(done_pages = state.done_pages, total_pages = state.total_pages, "next page");
            Outcome::Advanced
        } else {
            Outcome::Ignored
        }
    }
}
