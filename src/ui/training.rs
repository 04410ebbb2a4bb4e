use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Widget, Wrap},
};

use crate::app::App;
use crate::benchmark::classify;
use crate::mode::TestMode;
use crate::training::{DaySummary, TrainingReport};
use crate::ui::charting::{bar_percent, format_label};
use crate::ui::{bold, dim, format_ms, tier_color};

const CALENDAR_COLUMNS: usize = 10;

fn weekly_boxes(report: &TrainingReport, area: Rect, buf: &mut Buffer) {
    let weekly = &report.weekly;
    let change = if weekly.comparable() {
        let sign = if weekly.improvement_pct > 0 { "+" } else { "" };
        format!("{sign}{}%", weekly.improvement_pct)
    } else {
        "--".to_string()
    };
    let change_color = match weekly.improvement_pct {
        p if p > 0 => Color::Green,
        p if p < 0 => Color::Red,
        _ => Color::DarkGray,
    };

    let cells = [
        ("This week", format!("{} games", weekly.this_week_games), Color::Blue),
        ("Week avg", format_ms(weekly.this_week_average), Color::Magenta),
        ("vs last week", change, change_color),
        ("Streak", format!("{} days", report.streak), Color::Yellow),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    for ((title, value, color), column) in cells.into_iter().zip(columns.iter()) {
        Paragraph::new(vec![
            Line::from(Span::styled(title, dim())),
            Line::from(Span::styled(value, bold().fg(color))),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .render(*column, buf);
    }
}

fn trend_chart(report: &TrainingReport, area: Rect, buf: &mut Buffer) {
    let (min, max) = report.chart_bounds;
    let block = Block::default().borders(Borders::ALL).title(format!(
        " Best reaction time, 30 days ({min}ms to {max}ms, mid {}ms) ",
        format_label((min + max) as f64 / 2.0)
    ));

    let played: Vec<&DaySummary> = report.played_days().collect();
    if played.is_empty() {
        Paragraph::new(Span::styled(
            "No data yet. Play some reaction time games to see your trend!",
            dim(),
        ))
        .alignment(Alignment::Center)
        .block(block)
        .render(area, buf);
        return;
    }

    let bars: Vec<Bar> = played
        .iter()
        .map(|day| {
            Bar::default()
                .value(bar_percent(day.best, report.chart_bounds))
                .text_value(day.best.to_string())
                .label(Line::from(day.day.format("%d").to_string()))
                .style(Style::default().fg(tier_color(classify(TestMode::Reaction, day.best))))
        })
        .collect();

    BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(4)
        .bar_gap(1)
        .max(100)
        .render(area, buf);
}

fn calendar(report: &TrainingReport, today: chrono::NaiveDate, area: Rect, buf: &mut Buffer) {
    let lines: Vec<Line> = report
        .days
        .chunks(CALENDAR_COLUMNS)
        .map(|week| {
            let spans: Vec<Span> = week
                .iter()
                .map(|day| {
                    let date = day.day.format("%a %d").to_string();
                    let mut span = if day.games > 0 {
                        let tier = classify(TestMode::Reaction, day.best);
                        Span::styled(
                            format!("{date} {:>5} ", format!("{}ms", day.best)),
                            Style::default().fg(tier_color(tier)),
                        )
                    } else {
                        Span::styled(format!("{date}    -- "), dim())
                    };
                    if day.day == today {
                        span = span.patch_style(Style::default().add_modifier(Modifier::UNDERLINED));
                    }
                    span
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Last 30 days "))
        .render(area, buf);
}

fn tips(report: &TrainingReport, area: Rect, buf: &mut Buffer) {
    let lines: Vec<Line> = report
        .tips
        .iter()
        .enumerate()
        .map(|(i, tip)| {
            Line::from(vec![
                Span::styled(format!("{}. ", i + 1), bold().fg(Color::Green)),
                Span::raw(tip.clone()),
            ])
        })
        .collect();

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Training tips "))
        .render(area, buf);
}

pub fn render_report(report: &TrainingReport, today: chrono::NaiveDate, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(5),
            Constraint::Length(5),
        ])
        .split(area);

    weekly_boxes(report, chunks[0], buf);
    trend_chart(report, chunks[1], buf);
    calendar(report, today, chunks[2], buf);
    tips(report, chunks[3], buf);
}

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let today = chrono::Local::now().date_naive();
    let report = TrainingReport::build(app.history().entries(), today);
    render_report(&report, today, area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::GameResult;
    use crate::ui::tests::buffer_text;
    use chrono::{Local, NaiveDate, TimeZone, Utc};

    fn reaction_on(day: NaiveDate, time: u64) -> GameResult {
        let noon = Local
            .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
            .unwrap();
        GameResult::at(TestMode::Reaction, time, noon.with_timezone(&Utc))
    }

    fn draw(report: &TrainingReport, today: NaiveDate) -> String {
        let area = Rect::new(0, 0, 140, 32);
        let mut buf = Buffer::empty(area);
        render_report(report, today, area, &mut buf);
        buffer_text(&buf)
    }

    #[test]
    fn empty_report_prompts_to_play() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let text = draw(&TrainingReport::build(&[], today), today);
        assert!(text.contains("No data yet"));
        assert!(text.contains("0 days"));
        assert!(text.contains("Start playing"));
    }

    #[test]
    fn report_shows_weekly_change_and_streak() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let history = vec![
            reaction_on(NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(), 250),
            reaction_on(NaiveDate::from_ymd_opt(2026, 10, 12).unwrap(), 220),
            reaction_on(NaiveDate::from_ymd_opt(2026, 10, 13).unwrap(), 200),
            reaction_on(today, 210),
        ];
        let text = draw(&TrainingReport::build(&history, today), today);

        assert!(text.contains("3 games"));
        assert!(text.contains("+16%"));
        assert!(text.contains("3 days"));
        assert!(text.contains("200ms"));
    }
}
