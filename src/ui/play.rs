//! The play screen and the geometry shared with mouse hit testing.

use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Widget},
};

use crate::app::{App, LastRecord};
use crate::benchmark::classify;
use crate::engine::sequence::{GRID_SIDE, GRID_SIZE};
use crate::engine::{
    ReactionPhase, ReactionTest, SequencePhase, TargetPhase, TargetPosition, TimingEngine,
};
use crate::mode::TestMode;
use crate::ui::{bold, dim, frame_areas, tier_color};
use crate::util::std_dev;

pub const TARGET_WIDTH: u16 = 7;
pub const TARGET_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 2;
const CELL_WIDTH: u16 = 8;
const CELL_HEIGHT: u16 = 3;

const SLATE: Color = Color::Rgb(30, 41, 59);
const ORANGE: Color = Color::Rgb(249, 115, 22);

/// Where the active test is drawn, given the whole terminal area.
pub fn play_surface(frame: Rect) -> Rect {
    frame_areas(frame)[1]
}

/// Screen cells covered by a target, kept inside the surface.
pub fn target_rect(surface: Rect, target: &TargetPosition) -> Rect {
    let width = TARGET_WIDTH.min(surface.width);
    let height = TARGET_HEIGHT.min(surface.height);
    let max_x = surface.right().saturating_sub(width);
    let max_y = surface.bottom().saturating_sub(height);
    let x = surface.x + (target.x * f64::from(surface.width)) as u16;
    let y = surface.y + (target.y * f64::from(surface.height)) as u16;
    Rect::new(x.min(max_x), y.min(max_y), width, height)
}

/// One rect per grid cell, row-major, centered below the status line.
pub fn sequence_cells(surface: Rect) -> Vec<Rect> {
    let grid = Rect {
        y: surface.y + STATUS_HEIGHT.min(surface.height),
        height: surface.height.saturating_sub(STATUS_HEIGHT),
        ..surface
    };
    let side = GRID_SIDE as u16;
    let cell_w = (grid.width / side).clamp(1, CELL_WIDTH);
    let cell_h = (grid.height / side).clamp(1, CELL_HEIGHT);
    let left = grid.x + grid.width.saturating_sub(cell_w * side) / 2;
    let top = grid.y + grid.height.saturating_sub(cell_h * side) / 2;

    (0..GRID_SIZE)
        .map(|i| {
            let col = (i % GRID_SIDE) as u16;
            let row = (i / GRID_SIDE) as u16;
            Rect::new(left + col * cell_w, top + row * cell_h, cell_w, cell_h)
        })
        .collect()
}

pub fn sequence_cell_at(surface: Rect, pos: Position) -> Option<usize> {
    sequence_cells(surface).iter().position(|r| r.contains(pos))
}

/// Paragraph vertically centered in `area`.
pub fn render_centered(lines: Vec<Line>, area: Rect, buf: &mut Buffer) {
    let height = (lines.len() as u16).min(area.height);
    let inner = Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    };
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(inner, buf);
}

pub fn result_lines(
    mode: TestMode,
    time: u64,
    durations: &[u64],
    last: Option<LastRecord>,
) -> Vec<Line<'static>> {
    let tier = classify(mode, time);
    let label = if durations.is_empty() { "Time" } else { "Average" };
    let mut lines = vec![
        Line::from(Span::styled(format!("{label}: {time}ms"), bold())),
        Line::from(Span::styled(
            tier.label.to_string(),
            bold().fg(tier_color(tier)),
        )),
        Line::default(),
    ];

    if !durations.is_empty() {
        let rounds = durations
            .iter()
            .map(|d| format!("{d}ms"))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(Line::from(Span::styled(rounds, dim())));
        if let Some(spread) = std_dev(durations) {
            lines.push(Line::from(Span::styled(format!("spread ±{spread:.0}ms"), dim())));
        }
    }

    if let Some(last) = last.filter(|l| l.mode == mode && l.time == time) {
        if last.personal_best {
            lines.push(Line::from(Span::styled(
                "New personal best!",
                bold().fg(Color::Yellow),
            )));
        }
        if last.on_leaderboard {
            lines.push(Line::from(Span::styled("Made the leaderboard", Style::default().fg(Color::Cyan))));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Press SPACE to continue", dim())));
    lines
}

/// Background and text for a reaction test in any phase.
pub fn reaction_view<R>(test: &ReactionTest<R>, last: Option<LastRecord>) -> (Color, Vec<Line<'static>>)
where
    R: rand::Rng,
{
    let round = format!("Round {}/{}", test.round(), test.rounds());

    match test.phase() {
        ReactionPhase::Idle => (
            Color::Blue,
            vec![
                Line::from(Span::styled("Reaction Time", bold())),
                Line::default(),
                Line::from("Press SPACE or click when the screen turns green."),
                Line::from(format!("{} rounds, averaged.", test.rounds())),
            ],
        ),
        ReactionPhase::Waiting { .. } => (
            Color::Red,
            vec![
                Line::from(Span::styled("Wait for green...", bold())),
                Line::from(round),
            ],
        ),
        ReactionPhase::Ready { .. } => (
            Color::Green,
            vec![
                Line::from(Span::styled("PRESS!", bold())),
                Line::from(round),
            ],
        ),
        ReactionPhase::TooEarly => (
            ORANGE,
            vec![
                Line::from(Span::styled("Too early!", bold())),
                Line::from("Press to try this round again."),
            ],
        ),
        ReactionPhase::Result { average } => (
            Color::Reset,
            result_lines(TestMode::Reaction, average, test.durations(), last),
        ),
    }
}

/// Fill `area` with `background` and center `lines` on it.
pub fn render_panel(background: Color, lines: Vec<Line>, area: Rect, buf: &mut Buffer) {
    Block::default()
        .style(Style::default().bg(background))
        .render(area, buf);
    render_centered(lines, area, buf);
}

fn render_reaction(app: &App, area: Rect, buf: &mut Buffer) {
    let (background, lines) = reaction_view(app.reaction(), app.last_record());
    render_panel(background, lines, area, buf);
}

fn render_target(app: &App, area: Rect, buf: &mut Buffer) {
    let test = app.target();
    match test.phase() {
        TargetPhase::Idle => render_centered(
            vec![
                Line::from(Span::styled("Target Click", bold())),
                Line::default(),
                Line::from(format!("Click {} targets as fast as you can.", test.count())),
                Line::from(Span::styled("Press SPACE or click to start", dim())),
            ],
            area,
            buf,
        ),
        TargetPhase::Playing { target, .. } => {
            let status = format!("Target {}/{}", target.index + 1, test.count());
            Paragraph::new(Span::styled(status, dim()))
                .alignment(Alignment::Center)
                .render(Rect { height: 1, ..area }, buf);

            let rect = target_rect(area, &target);
            Paragraph::new("◎")
                .alignment(Alignment::Center)
                .block(Block::bordered().border_type(BorderType::Rounded))
                .style(bold().fg(Color::White).bg(Color::Red))
                .render(rect, buf);
        }
        TargetPhase::Result { average } => render_centered(
            result_lines(TestMode::Target, average, test.durations(), app.last_record()),
            area,
            buf,
        ),
    }
}

fn render_sequence(app: &App, area: Rect, buf: &mut Buffer) {
    let test = app.sequence();
    match test.phase() {
        SequencePhase::Idle => render_centered(
            vec![
                Line::from(Span::styled("Number Sequence", bold())),
                Line::default(),
                Line::from(format!("Find 1 to {GRID_SIZE} in order as fast as you can.")),
                Line::from(Span::styled("Press SPACE or click to start", dim())),
            ],
            area,
            buf,
        ),
        SequencePhase::Playing { started_at } => {
            let elapsed = Instant::now().saturating_duration_since(started_at);
            let status = format!(
                "Next: {}   Found {}/{GRID_SIZE}   {:.1}s",
                test.next_expected(),
                test.found(),
                elapsed.as_secs_f64()
            );
            Paragraph::new(Span::styled(status, bold()))
                .alignment(Alignment::Center)
                .render(Rect { height: 1, ..area }, buf);

            for (cell, rect) in sequence_cells(area).into_iter().enumerate() {
                let mut style = if test.is_found(cell) {
                    dim().fg(Color::Green)
                } else if test.is_wrong(cell) {
                    bold().bg(Color::Red)
                } else {
                    bold().bg(SLATE)
                };
                if cell == app.sequence_cursor() {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                let inner = Rect {
                    width: rect.width.saturating_sub(1).max(1),
                    ..rect
                };
                Block::default().style(style).render(inner, buf);
                let number = test.grid().get(cell).copied().unwrap_or_default();
                Paragraph::new(number.to_string())
                    .alignment(Alignment::Center)
                    .style(style)
                    .render(
                        Rect {
                            y: inner.y + inner.height / 2,
                            height: 1,
                            ..inner
                        },
                        buf,
                    );
            }
        }
        SequencePhase::Result { total } => render_centered(
            result_lines(TestMode::Sequence, total, &[], app.last_record()),
            area,
            buf,
        ),
    }
}

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    match app.engine().mode() {
        TestMode::Reaction => render_reaction(app, area, buf),
        TestMode::Target => render_target(app, area, buf),
        TestMode::Sequence => render_sequence(app, area, buf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppOptions;
    use crate::store::{HistoryStore, Leaderboard};
    use crate::ui::tests::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    fn app() -> App {
        let options = AppOptions {
            seed: Some(3),
            ..AppOptions::default()
        };
        let mut app = App::new(options, HistoryStore::in_memory(), Leaderboard::in_memory());
        app.resize(100, 30);
        app
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| f.render_widget(app, f.area())).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn target_rect_stays_inside_surface() {
        let surface = Rect::new(2, 3, 40, 10);
        let corner = TargetPosition {
            x: 0.99,
            y: 0.99,
            index: 0,
        };
        let rect = target_rect(surface, &corner);
        assert!(rect.right() <= surface.right());
        assert!(rect.bottom() <= surface.bottom());

        let origin = TargetPosition {
            x: 0.0,
            y: 0.0,
            index: 0,
        };
        assert_eq!(target_rect(surface, &origin).x, 2);
    }

    #[test]
    fn sequence_cells_tile_without_overlap() {
        let surface = Rect::new(2, 3, 96, 26);
        let cells = sequence_cells(surface);
        assert_eq!(cells.len(), GRID_SIZE);
        for (i, a) in cells.iter().enumerate() {
            assert!(surface.contains(Position::new(a.x, a.y)));
            for b in &cells[i + 1..] {
                assert!(!a.intersects(*b));
            }
        }
        let twelfth = cells[12];
        assert_eq!(
            sequence_cell_at(surface, Position::new(twelfth.x + 1, twelfth.y)),
            Some(12)
        );
        assert_eq!(sequence_cell_at(surface, Position::new(surface.x, surface.y)), None);
    }

    #[test]
    fn reaction_screens() {
        let mut app = app();
        assert!(draw(&app).contains("Press SPACE or click when the screen turns green."));

        let now = Instant::now();
        app.primary_action(now);
        assert!(draw(&app).contains("Wait for green..."));

        app.primary_action(now + Duration::from_millis(10));
        assert!(draw(&app).contains("Too early!"));
    }

    #[test]
    fn reaction_result_shows_tier_and_record() {
        let mut app = app();
        let mut now = Instant::now();
        app.primary_action(now);
        for _ in 0..5 {
            now = app.next_deadline().unwrap();
            app.fire_due_timers(now);
            assert!(draw(&app).contains("PRESS!"));
            now += Duration::from_millis(200);
            app.primary_action(now);
        }

        let text = draw(&app);
        assert!(text.contains("Average: 200ms"));
        assert!(text.contains("Fast"));
        assert!(text.contains("New personal best!"));
    }

    #[test]
    fn sequence_grid_renders_numbers() {
        let mut app = app();
        app.switch_mode(TestMode::Sequence);
        app.primary_action(Instant::now());

        let text = draw(&app);
        assert!(text.contains("Next: 1"));
        assert!(text.contains("25"));
    }

    #[test]
    fn target_playing_shows_progress() {
        let mut app = app();
        app.switch_mode(TestMode::Target);
        app.primary_action(Instant::now());

        let text = draw(&app);
        assert!(text.contains("Target 1/15"));
        assert!(text.contains("◎"));
    }
}
