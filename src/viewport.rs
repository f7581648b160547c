use anyhow::Result;

/// Window geometry in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Top edge of the frame grid, once it has been laid out.
    pub grid_top: Option<f64>,
    /// Bottom edge of the frame grid, above the footer.
    pub grid_bottom: Option<f64>,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: f64::from(width),
            height: f64::from(height),
            grid_top: None,
            grid_bottom: None,
        }
    }

    pub fn with_grid(mut self, top: u16, bottom: u16) -> Self {
        self.grid_top = Some(f64::from(top));
        self.grid_bottom = Some(f64::from(bottom));
        self
    }

    /// Viewport of a terminal this size, with the grid edges filled in when
    /// the grid has room.
    pub fn for_terminal(cols: u16, rows: u16) -> Self {
        let viewport = Self::new(cols, rows);
        match crate::ui::grid_span(rows) {
            Some((top, bottom)) => viewport.with_grid(top, bottom),
            None => viewport,
        }
    }
}

/// Read-only source of the current window geometry.
pub trait ViewportProbe {
    fn probe(&self) -> Result<Viewport>;
}

/// Reads the size of the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalProbe;

impl ViewportProbe for TerminalProbe {
    fn probe(&self) -> Result<Viewport> {
        let (cols, rows) = crossterm::terminal::size()?;
        Ok(Viewport::for_terminal(cols, rows))
    }
}
