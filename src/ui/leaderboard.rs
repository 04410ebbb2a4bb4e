use chrono::{DateTime, Utc};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph, Row, Table, Widget},
};
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;
use crate::record::LeaderboardEntry;
use crate::store::MAX_ENTRIES_PER_MODE;
use crate::ui::{bold, dim, tier_color};

/// "5 minutes ago" style age of an entry relative to `now`.
pub fn age(set_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - set_at).to_std().unwrap_or_default();
    HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past)
}

const NAME_COLUMNS: usize = 20;

/// Clip `name` to `columns` terminal cells, marking the cut with an ellipsis.
pub fn fit_name(name: &str, columns: usize) -> String {
    if UnicodeWidthStr::width(name) <= columns {
        return name.to_string();
    }
    let mut used = 0;
    let mut out = String::new();
    for c in name.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > columns {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

fn medal(rank: usize) -> Style {
    match rank {
        1 => bold().fg(Color::Yellow),
        2 => bold().fg(Color::Gray),
        3 => bold().fg(Color::Rgb(205, 127, 50)),
        _ => Style::default(),
    }
}

fn entry_row(rank: usize, entry: &LeaderboardEntry, now: DateTime<Utc>) -> Row<'static> {
    let tier = entry.result.tier();
    Row::new(vec![
        Span::styled(format!("{rank:>2}"), medal(rank)),
        Span::raw(fit_name(&entry.player_name, NAME_COLUMNS)),
        Span::styled(format!("{}ms", entry.time()), bold()),
        Span::styled(tier.label, Style::default().fg(tier_color(tier))),
        Span::styled(age(entry.result.timestamp, now), dim()),
    ])
}

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let mode = app.mode;
    let entries = app.leaderboard().entries_for_mode(mode);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    Paragraph::new(Span::styled(
        format!("{} top {MAX_ENTRIES_PER_MODE}", mode.title()),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let block = Block::default().borders(Borders::ALL);
    if entries.is_empty() {
        Paragraph::new(Span::styled("No scores yet. Be the first!", dim()))
            .alignment(Alignment::Center)
            .block(block)
            .render(chunks[1], buf);
        return;
    }

    let now = Utc::now();
    let rows: Vec<Row> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| entry_row(i + 1, entry, now))
        .collect();
    let header = Row::new(vec!["#", "Player", "Time", "Tier", "When"]).style(dim());
    let widths = [
        Constraint::Length(3),
        Constraint::Min(12),
        Constraint::Length(9),
        Constraint::Length(11),
        Constraint::Length(18),
    ];

    Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .block(block)
        .render(chunks[1], buf);
}
