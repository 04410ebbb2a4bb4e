pub mod charting;
pub mod duel;
pub mod leaderboard;
pub mod play;
pub mod screen;
pub mod stats;
pub mod training;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Widget},
};

use crate::app::{App, View};
use crate::benchmark::Tier;
use crate::mode::TestMode;
use crate::ui::screen::current_screen;

const HORIZONTAL_MARGIN: u16 = 2;
const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 1;

/// Header, body and footer areas of the full frame.
pub fn frame_areas(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);
    let body = Layout::default()
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([Constraint::Min(1)])
        .split(chunks[1])[0];
    [chunks[0], body, chunks[2]]
}

/// Terminal color for a tier's hex token.
pub fn tier_color(tier: &Tier) -> Color {
    tier.color.parse().unwrap_or(Color::White)
}

pub fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

/// `123ms`, or `--` for a zero placeholder.
pub fn format_ms(ms: u64) -> String {
    if ms == 0 {
        "--".to_string()
    } else {
        format!("{ms}ms")
    }
}

fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
    let titles: Vec<Line> = TestMode::ALL
        .iter()
        .enumerate()
        .map(|(i, mode)| Line::from(format!("{} {}", i + 1, mode.title())))
        .collect();

    let view = match app.view {
        View::Play => String::new(),
        other => format!(" {other} "),
    };

    Tabs::new(titles)
        .select(app.mode.index())
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(Span::styled(" reflex ", bold().fg(Color::Cyan)))
                .title_bottom(Line::from(Span::styled(view, bold().fg(Color::Yellow))).right_aligned()),
        )
        .style(dim())
        .highlight_style(bold().fg(Color::Cyan).remove_modifier(Modifier::DIM))
        .render(area, buf);
}

fn render_footer(help: &str, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Span::styled(help.to_string(), dim().add_modifier(Modifier::ITALIC)))
        .alignment(Alignment::Center)
        .render(area, buf);
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [header, body, footer] = frame_areas(area);
        let screen = current_screen(self.view);

        render_header(self, header, buf);
        screen.render(self, body, buf);
        render_footer(screen.help(self), footer, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppOptions;
    use crate::benchmark::classify;
    use crate::store::{HistoryStore, Leaderboard};
    use ratatui::{backend::TestBackend, Terminal};

    pub(crate) fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut text = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn frame_areas_stack_vertically() {
        let [header, body, footer] = frame_areas(Rect::new(0, 0, 80, 24));
        assert_eq!(header.height, HEADER_HEIGHT);
        assert_eq!(footer.y, 23);
        assert_eq!(body.y, HEADER_HEIGHT);
        assert_eq!(body.x, HORIZONTAL_MARGIN);
        assert_eq!(body.width, 80 - 2 * HORIZONTAL_MARGIN);
    }

    #[test]
    fn tier_colors_parse() {
        assert_eq!(
            tier_color(classify(TestMode::Reaction, 100)),
            Color::Rgb(0xa8, 0x55, 0xf7)
        );
        assert_eq!(
            tier_color(classify(TestMode::Reaction, 1_000)),
            Color::Rgb(0xef, 0x44, 0x44)
        );
    }

    #[test]
    fn header_shows_modes() {
        let app = App::new(
            AppOptions::default(),
            HistoryStore::in_memory(),
            Leaderboard::in_memory(),
        );
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| f.render_widget(&app, f.area())).unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("1 Reaction Time"));
        assert!(text.contains("3 Number Sequence"));
        assert!(text.contains("reflex"));
    }

    #[test]
    fn format_ms_placeholder() {
        assert_eq!(format_ms(0), "--");
        assert_eq!(format_ms(231), "231ms");
    }
}
