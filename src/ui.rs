use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    layout::{Constraint, Direction, Layout, Margin},
    text::{Line, Span},
};

use crate::app::App;
use crate::models::Frame as ImageFrame;
use crate::selection::RangeGesture;
use crate::session::Phase;
use crate::theme::Theme;

const TITLE_HEIGHT: u16 = 1;
const NAV_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 1;
const SLIDER_WIDTH: u16 = 32;
const MIN_TILE_HEIGHT: u16 = 3;

pub struct ScreenAreas {
    pub title: Rect,
    pub slider: Rect,
    pub progress: Rect,
    pub actions: Rect,
    pub grid: Rect,
    pub footer: Rect,
}

pub fn screen_layout(area: Rect) -> ScreenAreas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TITLE_HEIGHT),
            Constraint::Length(NAV_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);
    let nav = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(SLIDER_WIDTH),
            Constraint::Min(18),
            Constraint::Length(62),
        ])
        .split(rows[1]);
    ScreenAreas {
        title: rows[0],
        slider: nav[0],
        progress: nav[1],
        actions: nav[2],
        grid: rows[2],
        footer: rows[3],
    }
}

/// Top row and bottom edge (exclusive) of the frame grid, or `None` when the
/// terminal is too short to show any grid at all.
pub fn grid_span(rows: u16) -> Option<(u16, u16)> {
    let top = TITLE_HEIGHT + NAV_HEIGHT;
    (rows > top + FOOTER_HEIGHT).then_some((top, rows - FOOTER_HEIGHT))
}

/// Where one tile of the grid sits. Rows are `u32` since the measurement pass
/// lays out the whole frame list, far below the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSlot {
    pub x: u16,
    pub y: u32,
    pub width: u16,
    pub height: u16,
}

impl TileSlot {
    pub fn bottom(&self) -> f64 {
        f64::from(self.y) + f64::from(self.height)
    }

    pub fn contains(&self, col: u16, row: u16) -> bool {
        let row = u32::from(row);
        col >= self.x
            && col < self.x.saturating_add(self.width)
            && row >= self.y
            && row < self.y + u32::from(self.height)
    }

    /// The part of the tile that is visible inside `bounds`, clipped at its
    /// edges. `None` when none of it is.
    pub fn rect_within(&self, bounds: Rect) -> Option<Rect> {
        let y = u16::try_from(self.y).ok()?;
        if y >= bounds.bottom() || self.x >= bounds.right() {
            return None;
        }
        let visible = Rect::new(self.x, y, self.width, self.height).intersection(bounds);
        (!visible.is_empty()).then_some(visible)
    }
}

fn tile_size(frame_width: f64, grid: Rect, aspect: f64) -> (u16, u16) {
    let width = (frame_width.round().max(1.0) as u16).min(grid.width.max(1));
    let height = ((frame_width * aspect).round() as u16).max(MIN_TILE_HEIGHT);
    (width, height)
}

pub fn tiles_per_row(frame_width: f64, grid: Rect) -> u16 {
    let (width, _) = tile_size(frame_width, grid, 1.0);
    (grid.width / width).max(1)
}

/// Wrapping, centred tile layout: as many tiles per row as fit, each row
/// centred horizontally, rows stacked from the grid top.
pub fn layout_tiles(count: usize, frame_width: f64, grid: Rect, aspect: f64) -> Vec<TileSlot> {
    let (width, height) = tile_size(frame_width, grid, aspect);
    let per_row = usize::from(tiles_per_row(frame_width, grid));
    (0..count)
        .map(|index| {
            let row = index / per_row;
            let col = index % per_row;
            let in_row = per_row.min(count - row * per_row);
            let used = in_row as u16 * width;
            let offset = grid.width.saturating_sub(used) / 2;
            TileSlot {
                x: grid.x + offset + col as u16 * width,
                y: u32::from(grid.y) + row as u32 * u32::from(height),
                width,
                height,
            }
        })
        .collect()
}

/// Bottom edges of `count` tiles laid out from the grid top.
pub fn measure_bottoms(count: usize, frame_width: f64, grid: Rect, aspect: f64) -> Vec<f64> {
    layout_tiles(count, frame_width, grid, aspect)
        .iter()
        .map(TileSlot::bottom)
        .collect()
}

/// Slider position for a click at column `col` inside the slider block.
pub fn slider_value_at(slider: Rect, col: u16) -> Option<f64> {
    let inner = slider.inner(Margin::new(1, 1));
    if inner.width == 0 || col < inner.x || col >= inner.right() {
        return None;
    }
    let span = f64::from(inner.width.saturating_sub(1).max(1));
    Some(f64::from(col - inner.x) / span * 100.0)
}

pub fn render(f: &mut Frame, app: &App) {
    let theme = Theme::default();
    let areas = screen_layout(f.area());
    let session = &app.session;

    let title = if session.title().is_empty() { "framesift" } else { session.title() };
    f.render_widget(
        Paragraph::new(title).style(theme.title).alignment(Alignment::Center),
        areas.title,
    );

    // slider
    let frame_width = session.windower().frame_width();
    let slider = Gauge::default()
        .block(Block::default().title("Width").borders(Borders::ALL))
        .gauge_style(theme.slider)
        .ratio((app.width.slider_value() / 100.0).clamp(0.0, 1.0))
        .label(format!("{frame_width:.0} cols"));
    f.render_widget(slider, areas.slider);

    // progress
    let state = session.windower().state();
    let progress = Paragraph::new(format!(
        "{} done / {} left",
        state.done_pages,
        session.windower().left_pages()
    ))
    .block(Block::default().borders(Borders::ALL))
    .style(theme.nav_text)
    .alignment(Alignment::Center);
    f.render_widget(progress, areas.progress);

    // actions
    let done = session.windower().is_done();
    let mut actions = Vec::new();
    for (key, label) in [("p", "Preview"), ("a", "Select all"), ("d", "Deselect all")] {
        actions.push(Span::styled(format!("[{key}]"), theme.action_key));
        actions.push(Span::raw(format!(" {label}  ")));
    }
    actions.push(Span::styled("[n]", theme.action_key));
    if done {
        actions.push(Span::raw(" "));
        actions.push(Span::styled(" Save ", theme.save_action));
    } else {
        actions.push(Span::raw(" Next"));
    }
    f.render_widget(
        Paragraph::new(Line::from(actions))
            .block(Block::default().borders(Borders::ALL))
            .style(theme.nav_text),
        areas.actions,
    );

    match session.phase() {
        Phase::Failed(message) => render_error(f, areas.grid, message, &theme),
        _ if session.is_busy() => render_loader(f, areas.grid, &theme),
        _ => render_grid(f, app, areas.grid, &theme),
    }

    // footer
    let pending = match session.selection().gesture() {
        RangeGesture::StartPicked(id) => format!("range from #{id}, click the end | "),
        RangeGesture::Idle => String::new(),
    };
    let footer = Paragraph::new(format!(
        "{pending}{} selected | Click range | Right-click deselect run | ←/→ width | h/j/k/l move | Space click | x right-click | r reload | q quit",
        session.selection().selected().len()
    ))
    .style(theme.footer);
    f.render_widget(footer, areas.footer);

    if let Some(image_ref) = app.preview.image_ref() {
        render_preview(f, areas.grid, image_ref, &theme);
    }

    if app.completion.visible {
        let popup_area = centered_rect(60, 60, f.area());
        f.render_widget(Clear, popup_area);
        let block = Block::default()
            .title(Span::styled("Selection saved (c copy, Esc close)", theme.popup_title))
            .borders(Borders::ALL)
            .style(theme.popup_border);
        let para = Paragraph::new(app.completion.text.clone())
            .block(block)
            .wrap(Wrap { trim: true })
            .style(theme.popup_text);
        f.render_widget(para, popup_area);
    }
}

fn render_grid(f: &mut Frame, app: &App, grid: Rect, theme: &Theme) {
    let session = &app.session;
    let page = session.page();
    let slots = layout_tiles(
        page.len(),
        session.windower().frame_width(),
        grid,
        app.settings.tile_aspect,
    );
    let hovered = app.cursor_frame().or(session.hovered());
    let range_start = match session.selection().gesture() {
        RangeGesture::StartPicked(id) => Some(id),
        RangeGesture::Idle => None,
    };
    for (frame, slot) in page.iter().zip(slots) {
        let Some(rect) = slot.rect_within(grid) else {
            continue;
        };
        render_tile(f, frame, rect, hovered == Some(frame.id), range_start == Some(frame.id), theme);
    }
}

fn render_tile(f: &mut Frame, frame: &ImageFrame, rect: Rect, hovered: bool, range_start: bool, theme: &Theme) {
    // marked tiles shrink a little, like a pressed button
    let rect = if frame.marked && rect.width > 4 {
        rect.inner(Margin::new(1, 0))
    } else {
        rect
    };
    let border = if range_start {
        theme.range_start_border
    } else if frame.marked {
        theme.tile_marked_border
    } else if hovered {
        theme.tile_hover_border
    } else {
        theme.tile_border
    };
    let title = if frame.marked {
        format!(" ✓ #{} ", frame.id)
    } else {
        format!(" #{} ", frame.id)
    };
    let name = frame
        .image_ref
        .rsplit('/')
        .next()
        .unwrap_or(&frame.image_ref)
        .to_string();
    let text_style = if frame.marked { theme.tile_marked_text } else { theme.tile_text };
    let tile = Paragraph::new(name)
        .block(Block::default().title(title).borders(Borders::ALL).border_style(border))
        .style(text_style)
        .wrap(Wrap { trim: true });
    f.render_widget(tile, rect);
}

fn render_loader(f: &mut Frame, grid: Rect, theme: &Theme) {
    let area = centered_rect(30, 20, grid);
    f.render_widget(Clear, area);
    let loader = Paragraph::new("Loading frames…")
        .block(Block::default().borders(Borders::ALL))
        .style(theme.loader)
        .alignment(Alignment::Center);
    f.render_widget(loader, area);
}

fn render_error(f: &mut Frame, grid: Rect, message: &str, theme: &Theme) {
    let area = centered_rect(60, 30, grid);
    f.render_widget(Clear, area);
    let para = Paragraph::new(format!("Failed to load task: {message}\n\nPress r to retry."))
        .block(Block::default().title("Error").borders(Borders::ALL))
        .style(theme.error)
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn render_preview(f: &mut Frame, grid: Rect, image_ref: &str, theme: &Theme) {
    let height = 4.min(grid.height);
    let area = Rect {
        x: grid.x,
        y: grid.bottom().saturating_sub(height),
        width: grid.width,
        height,
    };
    f.render_widget(Clear, area);
    let para = Paragraph::new(image_ref.to_string())
        .block(
            Block::default()
                .title(Span::styled("Preview (Esc close)", theme.popup_title))
                .borders(Borders::ALL)
                .style(theme.popup_border),
        )
        .style(theme.popup_text)
        .wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default().direction(Direction::Vertical)
        .constraints([Constraint::Percentage((100-percent_y)/2), Constraint::Percentage(percent_y), Constraint::Percentage((100-percent_y)/2)]).split(r)[1];
    Layout::default().direction(Direction::Horizontal)
        .constraints([Constraint::Percentage((100-percent_x)/2), Constraint::Percentage(percent_x), Constraint::Percentage((100-percent_x)/2)]).split(vertical)[1]
}
