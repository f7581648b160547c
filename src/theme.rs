use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub title: Style,
    pub nav_text: Style,
    pub slider: Style,
    pub action_key: Style,
    pub save_action: Style,

    // Tiles
    pub tile_border: Style,
    pub tile_hover_border: Style,
    pub tile_marked_border: Style,
    pub tile_marked_text: Style,
    pub tile_text: Style,
    pub range_start_border: Style,

    // Overlays
    pub loader: Style,
    pub error: Style,
    pub popup_title: Style,
    pub popup_border: Style,
    pub popup_text: Style,
    pub footer: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            nav_text: Style::default().fg(Color::White),
            slider: Style::default().fg(Color::Blue).bg(Color::Rgb(30, 30, 30)),
            action_key: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            save_action: Style::default().fg(Color::White).bg(Color::Green).add_modifier(Modifier::BOLD),

            tile_border: Style::default().fg(Color::DarkGray),
            tile_hover_border: Style::default().fg(Color::Rgb(255, 165, 0)).add_modifier(Modifier::BOLD),
            tile_marked_border: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            tile_marked_text: Style::default().fg(Color::Green),
            tile_text: Style::default().fg(Color::Gray),
            range_start_border: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),

            loader: Style::default().fg(Color::Cyan).bg(Color::Black).add_modifier(Modifier::BOLD),
            error: Style::default().fg(Color::Red).bg(Color::Black).add_modifier(Modifier::BOLD),
            popup_title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            popup_border: Style::default().fg(Color::Magenta).bg(Color::Black),
            popup_text: Style::default().fg(Color::White),
            footer: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        }
    }
}
