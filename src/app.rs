//! Terminal application state: wires the review session to the task loader,
//! the width slider, the preview pane and the completion sink.

use std::time::Duration;

use arboard::Clipboard;
use ratatui::layout::Rect;
use reqwest::Client;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::coalesce::Clock;
use crate::config::Settings;
use crate::error::Result;
use crate::models::{CompletionPopup, FrameId, Task};
use crate::network::TaskSource;
use crate::preview::{PreviewPane, PreviewWindow};
use crate::session::{Input, LoadTicket, Outcome, ReviewSession};
use crate::sink::{LogSink, SelectionSink, format_ids};
use crate::ui;
use crate::viewport::Viewport;
use crate::width::{WidthControl, WidthEvent, initial_slider_value, slider_to_width};
use crate::windower::{clamp_frame_width, max_frame_width};

type LoadResult = (LoadTicket, Result<Task>);

pub struct App {
    pub settings: Settings,
    pub session: ReviewSession,
    pub width: WidthControl,
    pub preview: PreviewPane,
    pub completion: CompletionPopup,
    pub sink: LogSink,
    pub viewport: Viewport,
    /// Area of the last drawn frame, used for hit-testing the mouse.
    pub screen: Rect,
    /// Keyboard hover position within the current page.
    pub cursor: Option<usize>,
    source: TaskSource,
    client: Client,
    runtime: Handle,
    clock: Box<dyn Clock>,
    load_tx: UnboundedSender<LoadResult>,
    load_rx: UnboundedReceiver<LoadResult>,
    in_flight: Option<CancellationToken>,
    /// Width last picked with the slider, if any.
    chosen_width: Option<f64>,
}

impl App {
    pub fn new(
        settings: Settings,
        source: TaskSource,
        runtime: Handle,
        clock: Box<dyn Clock>,
        viewport: Viewport,
    ) -> Self {
        let max_width = max_frame_width(
            &viewport,
            settings.grid_margin,
            settings.tile_aspect,
            settings.initial_width,
        );
        let frame_width = clamp_frame_width(settings.initial_width, settings.min_width, max_width);
        let slider = initial_slider_value(frame_width, viewport.width, settings.min_width);
        let width = WidthControl::new(
            slider,
            settings.width_step,
            settings.width_quiet(),
            settings.resize_quiet(),
        );
        let (load_tx, load_rx) = mpsc::unbounded_channel();
        Self {
            preview: PreviewPane::new(settings.preview_command.clone()),
            session: ReviewSession::new(frame_width),
            width,
            completion: CompletionPopup::default(),
            sink: LogSink::default(),
            screen: Rect::new(0, 0, to_cells(viewport.width), to_cells(viewport.height)),
            viewport,
            cursor: None,
            source,
            client: Client::new(),
            runtime,
            clock,
            load_tx,
            load_rx,
            in_flight: None,
            chosen_width: None,
            settings,
        }
    }

    /// Starts a fresh task read, superseding any read still in flight.
    pub fn start_load(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }
        let ticket = self.session.begin_load();
        self.cursor = None;
        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());

        info!(source = %self.source, "loading task");
        let source = self.source.clone();
        let client = self.client.clone();
        let tx = self.load_tx.clone();
        self.runtime.spawn(async move {
            let result = source.fetch_until_cancelled(&client, cancel).await;
            // the receiver only goes away on shutdown
            let _ = tx.send((ticket, result));
        });
    }

    /// Installs finished loads. Returns `true` if one was accepted.
    pub fn poll_loads(&mut self) -> bool {
        let mut accepted = false;
        while let Ok((ticket, result)) = self.load_rx.try_recv() {
            if self.session.finish_load(ticket, result) {
                self.in_flight = None;
                accepted = true;
            }
        }
        accepted
    }

    /// Drives everything time- or load-dependent: finished loads, settled
    /// slider/resize changes and the measurement pass.
    pub fn tick(&mut self) {
        self.poll_loads();
        let now = self.clock.now();
        for event in self.width.poll(now) {
            match event {
                WidthEvent::Slider(value) => {
                    let frame_width = slider_to_width(
                        value,
                        self.viewport.width,
                        self.settings.min_width,
                        self.max_width(),
                    );
                    info!(slider = value, frame_width, "frame width changed");
                    self.chosen_width = Some(frame_width);
                    self.session.set_frame_width(frame_width);
                    self.start_load();
                }
                WidthEvent::Resize(cols, rows) => {
                    self.viewport = Viewport::for_terminal(cols, rows);
                    // start from the wanted width so a grown terminal gets it back
                    let wanted = self.chosen_width.unwrap_or(self.settings.initial_width);
                    let frame_width =
                        clamp_frame_width(wanted, self.settings.min_width, self.max_width());
                    info!(cols, rows, frame_width, "viewport resized");
                    if frame_width != self.session.windower().frame_width() {
                        self.session.set_frame_width(frame_width);
                    }
                    self.start_load();
                }
            }
        }
        if self.session.needs_measurement() {
            self.measure();
        }
    }

    fn max_width(&self) -> f64 {
        max_frame_width(
            &self.viewport,
            self.settings.grid_margin,
            self.settings.tile_aspect,
            self.settings.initial_width,
        )
    }

    /// Width to remember for the next session: only one the user picked.
    pub fn chosen_width(&self) -> Option<f64> {
        self.chosen_width
    }

    /// How long the event loop may block before a pending width or resize
    /// change is due, capped at `idle`.
    pub fn poll_timeout(&self, idle: Duration) -> Duration {
        match self.width.next_deadline() {
            Some(deadline) => deadline.saturating_duration_since(self.clock.now()).min(idle),
            None => idle,
        }
    }

    fn measure(&mut self) {
        let grid = ui::screen_layout(self.viewport_rect()).grid;
        let bottoms = ui::measure_bottoms(
            self.session.frames().len(),
            self.session.windower().frame_width(),
            grid,
            self.settings.tile_aspect,
        );
        // counted frames must end above the footer whatever the margin
        let limit = (self.viewport.height - self.settings.bottom_margin).min(f64::from(grid.bottom()));
        let outcomes = self.session.measure(&bottoms, limit, 0.0);
        for outcome in outcomes {
            self.handle_outcome(outcome);
        }
    }

    fn viewport_rect(&self) -> Rect {
        Rect::new(0, 0, to_cells(self.viewport.width), to_cells(self.viewport.height))
    }

    pub fn dispatch(&mut self, input: Input) -> Outcome {
        let outcome = self.session.dispatch(input);
        self.handle_outcome(outcome.clone());
        outcome
    }

    fn handle_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Hovered(image_ref) => self.preview.show(&image_ref),
            Outcome::Advanced => self.cursor = None,
            Outcome::Completed(completion) => {
                if let Err(err) = self.sink.submit(&completion) {
                    warn!(error = %err, "could not submit selection");
                }
                self.completion.visible = true;
                self.completion.text = if completion.selected.is_empty() {
                    "No frames selected.".to_string()
                } else {
                    format_ids(&completion.selected)
                };
            }
            Outcome::Ignored | Outcome::Deferred | Outcome::Updated | Outcome::ContextMenu => {}
        }
    }

    pub fn on_resize(&mut self, cols: u16, rows: u16) {
        let now = self.clock.now();
        self.width.on_resize(cols, rows, now);
    }

    pub fn nudge_width(&mut self, steps: i32) {
        let now = self.clock.now();
        self.width.nudge(steps, now);
    }

    pub fn set_slider(&mut self, value: f64) {
        let now = self.clock.now();
        self.width.set_slider(value, now);
    }

    /// Opens the preview on the first frame of the page.
    pub fn open_preview(&mut self) {
        if let Some(frame) = self.session.page().first() {
            let image_ref = frame.image_ref.clone();
            self.preview.open(&image_ref);
        }
    }

    /// Closes the topmost overlay.
    pub fn close_overlay(&mut self) {
        if self.completion.visible {
            self.completion.visible = false;
        } else {
            self.preview.close();
        }
    }

    pub fn copy_completion(&self) {
        if !self.completion.visible {
            return;
        }
        let mut clipboard = Clipboard::new().ok();
        if let Some(cb) = clipboard.as_mut() {
            if let Err(err) = cb.set_text(self.completion.text.clone()) {
                warn!(error = %err, "clipboard unavailable");
            }
        }
    }

    /// Frame under a screen cell on the current page.
    pub fn frame_at(&self, col: u16, row: u16) -> Option<FrameId> {
        let grid = ui::screen_layout(self.screen).grid;
        let page = self.session.page();
        ui::layout_tiles(
            page.len(),
            self.session.windower().frame_width(),
            grid,
            self.settings.tile_aspect,
        )
        .iter()
        .position(|slot| slot.contains(col, row))
        .map(|index| page[index].id)
    }

    /// Moves the keyboard cursor by whole tiles and hovers the frame under it.
    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        let len = self.session.page().len();
        if len == 0 {
            return;
        }
        let grid = ui::screen_layout(self.screen).grid;
        let per_row = ui::tiles_per_row(self.session.windower().frame_width(), grid) as i64;
        let current = self.cursor.map_or(-1, |c| c as i64);
        let target = if current < 0 {
            0
        } else {
            (current + i64::from(dx) + i64::from(dy) * per_row).clamp(0, len as i64 - 1)
        };
        self.cursor = Some(target as usize);
        let id = self.session.page()[target as usize].id;
        self.dispatch(Input::FrameHover(id));
    }

    pub fn cursor_frame(&self) -> Option<FrameId> {
        self.cursor
            .and_then(|index| self.session.page().get(index))
            .map(|frame| frame.id)
    }
}

fn to_cells(value: f64) -> u16 {
    value.clamp(0.0, f64::from(u16::MAX)) as u16
}
