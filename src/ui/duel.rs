use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::App;
use crate::benchmark::classify;
use crate::engine::{DuelOutcome, DuelPhase, PlayerCard, ReactionPhase};
use crate::mode::TestMode;
use crate::ui::play::{reaction_view, render_centered, render_panel};
use crate::ui::{bold, dim, format_ms, tier_color};

fn player_card(card: &PlayerCard, winner: bool, area: Rect, buf: &mut Buffer) {
    let average = card.average();
    let tier = classify(TestMode::Reaction, average);
    let mut lines = vec![
        Line::from(Span::styled(card.name.clone(), bold())),
        Line::default(),
        Line::from(vec![Span::styled("avg  ", dim()), Span::styled(format_ms(average), bold())]),
        Line::from(vec![Span::styled("best ", dim()), Span::raw(format_ms(card.best()))]),
        Line::from(Span::styled(tier.label, Style::default().fg(tier_color(tier)))),
    ];
    if winner {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("WINNER", bold().fg(Color::Yellow))));
    }

    let border = if winner { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    block.render(area, buf);
    render_centered(lines, inner, buf);
}

fn render_outcome(players: &[PlayerCard; 2], outcome: &DuelOutcome, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(8), Constraint::Length(2)])
        .split(area);

    let headline = match outcome.winner {
        Some(i) => format!("{} wins!", players[i].name),
        None => "It's a tie!".to_string(),
    };
    Paragraph::new(Span::styled(headline, bold().fg(Color::Yellow)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2); 2])
        .split(chunks[1]);
    for (i, card) in players.iter().enumerate() {
        player_card(card, outcome.winner == Some(i), columns[i], buf);
    }

    Paragraph::new(Span::styled("Press SPACE for a rematch", dim()))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
}

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let duel = app.duel();
    let players = duel.players();

    let DuelPhase::Turn { player } = duel.phase() else {
        if let Some(outcome) = duel.outcome() {
            render_outcome(players, &outcome, area, buf);
        }
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);
    let name = &players[player].name;
    Paragraph::new(Span::styled(
        format!("Duel: {name}'s turn ({}/2)", player + 1),
        bold().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let test = duel.test();
    if let ReactionPhase::Result { average } = test.phase() {
        let tier = classify(TestMode::Reaction, average);
        let next = if player == 0 {
            format!("Press SPACE to hand over to {}", players[1].name)
        } else {
            "Press SPACE to see who won".to_string()
        };
        let lines = vec![
            Line::from(Span::styled(format!("{name}: {average}ms"), bold())),
            Line::from(Span::styled(tier.label, bold().fg(tier_color(tier)))),
            Line::default(),
            Line::from(Span::styled(next, dim())),
        ];
        render_centered(lines, chunks[1], buf);
    } else {
        let (background, lines) = reaction_view(test, None);
        render_panel(background, lines, chunks[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppOptions, View};
    use crate::store::{HistoryStore, Leaderboard};
    use crate::ui::tests::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::{Duration, Instant};

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| f.render_widget(app, f.area())).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn play_turn(app: &mut App, now: &mut Instant, reaction: u64) {
        app.primary_action(*now);
        for _ in 0..5 {
            *now = app.next_deadline().unwrap();
            app.fire_due_timers(*now);
            *now += Duration::from_millis(reaction);
            app.primary_action(*now);
        }
    }

    #[test]
    fn duel_walkthrough() {
        let options = AppOptions {
            seed: Some(5),
            duel_names: ["ada".to_string(), "grace".to_string()],
            ..AppOptions::default()
        };
        let mut app = App::new(options, HistoryStore::in_memory(), Leaderboard::in_memory());
        app.switch_view(View::Duel);
        assert!(draw(&app).contains("Duel: ada's turn (1/2)"));

        let mut now = Instant::now();
        play_turn(&mut app, &mut now, 260);
        let text = draw(&app);
        assert!(text.contains("ada: 260ms"));
        assert!(text.contains("hand over to grace"));

        app.primary_action(now);
        assert!(draw(&app).contains("Duel: grace's turn (2/2)"));

        play_turn(&mut app, &mut now, 190);
        app.primary_action(now);

        let text = draw(&app);
        assert!(text.contains("grace wins!"));
        assert!(text.contains("WINNER"));
        assert!(text.contains("260ms"));
    }
}
