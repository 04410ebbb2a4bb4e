use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Widget},
};

use crate::app::App;
use crate::benchmark::{classify, legend};
use crate::mode::TestMode;
use crate::stats::{compute_stats, recent_results, CHART_WINDOW};
use crate::ui::charting::bar_ceiling;
use crate::ui::{bold, dim, format_ms, tier_color};

fn chart_step(mode: TestMode) -> u64 {
    match mode {
        TestMode::Reaction => 50,
        TestMode::Target => 100,
        TestMode::Sequence => 1_000,
    }
}

fn stat_box(title: &str, value: String, style: Style, area: Rect, buf: &mut Buffer) {
    Paragraph::new(vec![
        Line::from(Span::styled(title.to_string(), dim())),
        Line::from(Span::styled(value, style)),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL))
    .render(area, buf);
}

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let mode = app.mode;
    let history = app.history().entries();
    let stats = compute_stats(history, mode);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled(format!("{} statistics", mode.title()), bold()))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let boxes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(chunks[1]);
    let tier_style = |ms: u64| {
        if ms == 0 {
            bold()
        } else {
            bold().fg(tier_color(classify(mode, ms)))
        }
    };
    stat_box("Best", format_ms(stats.best), tier_style(stats.best), boxes[0], buf);
    stat_box("Average", format_ms(stats.average), tier_style(stats.average), boxes[1], buf);
    stat_box(
        "Last 10",
        format_ms(stats.last10_average),
        tier_style(stats.last10_average),
        boxes[2],
        buf,
    );
    stat_box("Games", stats.total_games.to_string(), bold(), boxes[3], buf);

    let recent = recent_results(history, mode, CHART_WINDOW);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Last {} ", recent.len().min(CHART_WINDOW)));
    if recent.is_empty() {
        Paragraph::new(Span::styled("No games yet. Play a few rounds!", dim()))
            .alignment(Alignment::Center)
            .block(block)
            .render(chunks[2], buf);
    } else {
        let bars: Vec<Bar> = recent
            .iter()
            .map(|r| {
                Bar::default()
                    .value(r.time)
                    .text_value(r.time.to_string())
                    .style(Style::default().fg(tier_color(r.tier())))
            })
            .collect();
        let times: Vec<u64> = recent.iter().map(|r| r.time).collect();
        let inner_width = chunks[2].width.saturating_sub(2);
        let bar_width = (inner_width / CHART_WINDOW as u16).saturating_sub(1).clamp(1, 6);

        BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width)
            .bar_gap(1)
            .max(bar_ceiling(&times, chart_step(mode)))
            .render(chunks[2], buf);
    }

    let mut legend_spans = vec![];
    for (tier, range) in legend(mode) {
        legend_spans.push(Span::styled("■ ", Style::default().fg(tier_color(tier))));
        legend_spans.push(Span::raw(format!("{} {range}   ", tier.label)));
    }
    Paragraph::new(Line::from(legend_spans))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
}
