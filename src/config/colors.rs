use ratatui::style::{Color, Style};
use tracing::warn;

/// Parse a color name or `#rrggbb` value.
///
/// Names are case-insensitive. `dark` and `bright` prefixes are accepted but
/// map onto the base terminal colors (except `dark grey` and `bright black`),
/// since terminals render the base colors in their bright variant anyway.
pub fn parse_color(color_str: &str) -> Option<Color> {
    let name = color_str.trim().to_lowercase();
    if let Some(hex) = name.strip_prefix('#') {
        return parse_hex(hex);
    }

    let color = match name.as_str() {
        "dark grey" | "dark gray" | "bright black" => Color::DarkGray,
        "light red" => Color::LightRed,
        "light green" => Color::LightGreen,
        "light yellow" => Color::LightYellow,
        "light blue" => Color::LightBlue,
        "light magenta" => Color::LightMagenta,
        "light cyan" => Color::LightCyan,
        other => {
            let base = other
                .strip_prefix("dark ")
                .or_else(|| other.strip_prefix("bright "))
                .unwrap_or(other);
            match base {
                "black" => Color::Black,
                "red" => Color::Red,
                "green" => Color::Green,
                "yellow" => Color::Yellow,
                "blue" => Color::Blue,
                "magenta" => Color::Magenta,
                "cyan" => Color::Cyan,
                "white" => Color::White,
                "grey" | "gray" => Color::Gray,
                _ => return None,
            }
        }
    };
    Some(color)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Like [`parse_color`], falling back to white for unknown values.
fn color_or_white(color_str: &str) -> Color {
    parse_color(color_str).unwrap_or_else(|| {
        warn!(color = color_str, "unknown color in config, using white");
        Color::White
    })
}

/// Parse `"fg"` or `"fg on bg"` into a style.
pub fn parse_style(style_str: &str) -> Style {
    match style_str.split_once(" on ") {
        Some((fg, bg)) => Style::default()
            .fg(color_or_white(fg))
            .bg(color_or_white(bg)),
        None => Style::default().fg(color_or_white(style_str)),
    }
}

/// Colors resolved from the `colors` config section.
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub added: Color,
    pub deleted: Color,
    pub hunk_header: Color,
    pub context: Color,
    pub staged: Color,
    pub unstaged: Color,
    pub commit_hash: Color,
    pub date: Color,
    pub author: Color,
    pub selected: Style,
    pub status_bar: Style,
    pub lanes: Vec<Color>,
}

impl ColorScheme {
    pub fn from_config(colors: &crate::config::Colors) -> Self {
        Self {
            added: color_or_white(&colors.added),
            deleted: color_or_white(&colors.deleted),
            hunk_header: color_or_white(&colors.hunk_header),
            context: color_or_white(&colors.context),
            staged: color_or_white(&colors.staged),
            unstaged: color_or_white(&colors.unstaged),
            commit_hash: color_or_white(&colors.commit_hash),
            date: color_or_white(&colors.date),
            author: color_or_white(&colors.author),
            selected: parse_style(&colors.selected),
            status_bar: parse_style(&colors.status_bar),
            lanes: colors.lanes.iter().map(|c| color_or_white(c)).collect(),
        }
    }

    /// Color of graph lane `lane`; lanes beyond the palette reuse it cyclically.
    pub fn lane(&self, lane: usize) -> Color {
        if self.lanes.is_empty() {
            return Color::White;
        }
        self.lanes[lane % self.lanes.len()]
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::from_config(&crate::config::Colors::default())
    }
}
