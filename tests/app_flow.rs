use std::io::Write;
use std::thread;
use std::time::Duration;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use framesift::app::App;
use framesift::coalesce::ManualClock;
use framesift::config::Settings;
use framesift::input::handle_event;
use framesift::network::TaskSource;
use framesift::session::Phase;
use framesift::ui;
use framesift::viewport::Viewport;
use ratatui::layout::Rect;
use tempfile::NamedTempFile;
use tokio::runtime::Runtime;

fn task_file(frames: usize) -> NamedTempFile {
    let frames: Vec<_> = (0..frames)
        .map(|i| serde_json::json!({ "id": 100 + i, "url": format!("https://img/{i}.jpg") }))
        .collect();
    let task = serde_json::json!({
        "task_id": "task-7",
        "task_title": "Pick the frames with the car",
        "frames": frames,
    });
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{task}").unwrap();
    file
}

/// Spins until the in-flight load lands, then runs the measurement pass.
fn settle(app: &mut App) {
    for _ in 0..400 {
        if app.poll_loads() {
            app.tick();
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("task load never finished");
}

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn left_click(column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

struct Harness {
    _rt: Runtime,
    _file: NamedTempFile,
    clock: ManualClock,
    app: App,
}

// 100x30 terminal: grid rows 4..29, 36-column tiles 10 rows tall, two per
// row, so two rows (four frames) fit above the bottom margin.
fn harness(frames: usize) -> Harness {
    harness_with(frames, 100, 30, Settings::from_sources(&[], None).unwrap())
}

fn harness_with(frames: usize, cols: u16, rows: u16, settings: Settings) -> Harness {
    let rt = Runtime::new().unwrap();
    let file = task_file(frames);
    let clock = ManualClock::new();
    let mut app = App::new(
        settings,
        TaskSource::File(file.path().to_path_buf()),
        rt.handle().clone(),
        Box::new(clock.clone()),
        Viewport::for_terminal(cols, rows),
    );
    app.screen = Rect::new(0, 0, cols, rows);
    app.start_load();
    settle(&mut app);
    Harness {
        _rt: rt,
        _file: file,
        clock,
        app,
    }
}

#[test]
fn loads_and_windows_the_task() {
    let h = harness(20);
    let session = &h.app.session;
    assert_eq!(session.phase(), &Phase::Reviewing);
    assert_eq!(session.title(), "Pick the frames with the car");
    assert_eq!(session.windower().state().frames_per_page, Some(4));
    assert_eq!(session.windower().state().total_pages, 5);
    assert_eq!(
        session.page().iter().map(|f| f.id).collect::<Vec<_>>(),
        vec![100, 101, 102, 103]
    );
}

#[test]
fn mouse_range_selection_and_completion() {
    let mut h = harness(20);
    let app = &mut h.app;
    app.screen = Rect::new(0, 0, 100, 30);

    // first tile starts at column 14, second row of tiles at row 14
    assert_eq!(app.frame_at(20, 6), Some(100));
    assert_eq!(app.frame_at(60, 16), Some(103));
    assert_eq!(app.frame_at(2, 6), None);

    handle_event(app, left_click(20, 6)).unwrap();
    handle_event(app, left_click(60, 16)).unwrap();
    assert_eq!(app.session.selection().selected_in_order(), vec![100, 101, 102, 103]);

    for _ in 0..4 {
        assert!(handle_event(app, key(KeyCode::Char('n'))).unwrap());
    }
    assert!(app.sink.last().is_none());
    assert_eq!(app.session.page().first().map(|f| f.id), Some(116));

    handle_event(app, key(KeyCode::Enter)).unwrap();
    let completion = app.sink.last().expect("completion submitted");
    assert_eq!(completion.task_id, "task-7");
    assert_eq!(completion.selected, vec![100, 101, 102, 103]);
    assert!(app.completion.visible);
    assert_eq!(app.completion.text, "100, 101, 102, 103");

    handle_event(app, key(KeyCode::Esc)).unwrap();
    assert!(!app.completion.visible);
    assert!(!handle_event(app, key(KeyCode::Char('q'))).unwrap());
}

#[test]
fn settled_resize_rewindows_and_keeps_selection() {
    let mut h = harness(20);
    h.app.dispatch(framesift::session::Input::FrameClick(105));
    h.app.dispatch(framesift::session::Input::FrameClick(105));
    h.app.dispatch(framesift::session::Input::Next);
    assert_eq!(h.app.session.windower().state().done_pages, 1);

    h.app.on_resize(100, 35);
    h.app.on_resize(100, 40);
    h.clock.advance(Duration::from_millis(200));
    h.app.tick();
    assert_eq!(h.app.session.phase(), &Phase::Reviewing);

    h.clock.advance(Duration::from_millis(500));
    h.app.tick();
    assert_eq!(h.app.session.phase(), &Phase::Loading);
    settle(&mut h.app);

    let state = h.app.session.windower().state();
    assert_eq!(state.done_pages, 0);
    assert_eq!(state.frames_per_page, Some(6));
    assert_eq!(state.total_pages, 4);
    assert_eq!(h.app.session.selection().selected_in_order(), vec![105]);
}

#[test]
fn slider_change_applies_after_quiet_period() {
    let mut h = harness(20);
    h.app.on_resize(100, 40);
    h.clock.advance(Duration::from_millis(500));
    h.app.tick();
    settle(&mut h.app);

    h.app.set_slider(40.0);
    h.app.set_slider(50.0);
    h.clock.advance(Duration::from_millis(299));
    h.app.tick();
    assert_eq!(h.app.session.windower().frame_width(), 36.0);

    h.clock.advance(Duration::from_millis(1));
    h.app.tick();
    assert_eq!(h.app.session.windower().frame_width(), 50.0);
    settle(&mut h.app);

    // 50-column tiles are 14 rows tall: two rows fit in a 40-row terminal
    assert_eq!(h.app.session.windower().state().frames_per_page, Some(4));
}

#[test]
fn input_during_reload_is_replayed() {
    let mut h = harness(20);
    h.app.start_load();
    assert_eq!(
        h.app.dispatch(framesift::session::Input::SelectAll),
        framesift::session::Outcome::Deferred
    );
    assert!(h.app.session.selection().selected().is_empty());

    settle(&mut h.app);
    assert_eq!(h.app.session.selection().selected().len(), 20);
}

#[test]
fn missing_task_file_shows_error() {
    let rt = Runtime::new().unwrap();
    let mut app = App::new(
        Settings::from_sources(&[], None).unwrap(),
        TaskSource::File("/nonexistent/framesift-task.json".into()),
        rt.handle().clone(),
        Box::new(ManualClock::new()),
        Viewport::for_terminal(100, 30),
    );
    app.start_load();
    settle(&mut app);
    assert!(matches!(app.session.phase(), Phase::Failed(_)));
    assert_eq!(
        app.dispatch(framesift::session::Input::Next),
        framesift::session::Outcome::Ignored
    );
}

/// Every frame of every page must be drawn in full inside the grid.
fn assert_pages_fully_drawn(app: &mut App) {
    let grid = ui::screen_layout(app.screen).grid;
    loop {
        let page = app.session.page();
        assert!(!page.is_empty());
        let slots = ui::layout_tiles(
            page.len(),
            app.session.windower().frame_width(),
            grid,
            app.settings.tile_aspect,
        );
        for slot in slots {
            let rect = slot.rect_within(grid).expect("tile on screen");
            assert_eq!((rect.width, rect.height), (slot.width, slot.height), "{slot:?} in {grid:?}");
        }
        if app.session.windower().is_done() {
            break;
        }
        app.dispatch(framesift::session::Input::Next);
    }
}

#[test]
fn widest_slider_on_short_terminal_keeps_tiles_visible() {
    let mut h = harness_with(10, 100, 20, Settings::from_sources(&[], None).unwrap());
    h.app.set_slider(100.0);
    h.clock.advance(Duration::from_millis(300));
    h.app.tick();
    settle(&mut h.app);

    // 14 grid rows below the margin cap the width at 50: 14-row tiles, two per page
    assert!((h.app.session.windower().frame_width() - 50.0).abs() < 1e-9);
    assert_eq!(h.app.session.windower().state().frames_per_page, Some(2));
    assert_pages_fully_drawn(&mut h.app);
}

#[test]
fn zero_bottom_margin_never_counts_rows_under_the_footer() {
    let mut settings = Settings::from_sources(&[], None).unwrap();
    settings.bottom_margin = 0.0;
    // 13-row tiles end at rows 17 and 30; row 30 is past the footer at 29
    settings.initial_width = 46.5;
    let mut h = harness_with(10, 100, 30, settings);

    assert_eq!(h.app.session.windower().state().frames_per_page, Some(2));
    assert_pages_fully_drawn(&mut h.app);
}

#[test]
fn settled_resize_reclamps_width_and_restores_it() {
    let mut h = harness(20);
    assert_eq!(h.app.session.windower().frame_width(), 36.0);

    h.app.on_resize(100, 12);
    h.clock.advance(Duration::from_millis(500));
    h.app.tick();
    settle(&mut h.app);
    h.app.screen = Rect::new(0, 0, 100, 12);

    // grid rows 4..11 leave 6 rows: 6 / 0.28 columns at most
    let shrunk = h.app.session.windower().frame_width();
    assert!((shrunk - 6.0 / 0.28).abs() < 1e-9);
    assert_pages_fully_drawn(&mut h.app);

    h.app.on_resize(100, 30);
    h.clock.advance(Duration::from_millis(500));
    h.app.tick();
    settle(&mut h.app);
    assert_eq!(h.app.session.windower().frame_width(), 36.0);
}

#[test]
fn only_slider_widths_are_remembered() {
    let mut h = harness(20);
    assert_eq!(h.app.chosen_width(), None);

    h.app.on_resize(100, 12);
    h.clock.advance(Duration::from_millis(500));
    h.app.tick();
    settle(&mut h.app);
    assert_eq!(h.app.chosen_width(), None);

    h.app.on_resize(100, 40);
    h.clock.advance(Duration::from_millis(500));
    h.app.tick();
    settle(&mut h.app);
    h.app.set_slider(50.0);
    h.clock.advance(Duration::from_millis(300));
    h.app.tick();
    assert_eq!(h.app.chosen_width(), Some(50.0));
}

#[test]
fn poll_timeout_shrinks_to_the_next_settle() {
    let mut h = harness(20);
    let idle = Duration::from_millis(50);
    assert_eq!(h.app.poll_timeout(idle), idle);

    h.app.set_slider(60.0);
    assert_eq!(h.app.poll_timeout(idle), idle);
    h.clock.advance(Duration::from_millis(280));
    assert_eq!(h.app.poll_timeout(idle), Duration::from_millis(20));
    h.clock.advance(Duration::from_millis(40));
    assert_eq!(h.app.poll_timeout(idle), Duration::ZERO);
}
