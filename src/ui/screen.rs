use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::{App, View};
use crate::mode::TestMode;
use crate::ui::{duel, leaderboard, play, stats, training};

/// A UI screen boundary: renders the body area and names its keys.
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
    fn help(&self, app: &App) -> &'static str;
}

pub struct PlayScreen;

impl Screen for PlayScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        play::render(app, area, buf);
    }

    fn help(&self, app: &App) -> &'static str {
        match app.mode {
            TestMode::Sequence => {
                "space select / arrows move / click cells / tab mode / s l t d views / r restart / q quit"
            }
            TestMode::Target => {
                "space start / click targets / tab mode / s l t d views / r restart / q quit"
            }
            _ => "space or click / tab mode / s stats / l leaderboard / t training / d duel / r restart / q quit",
        }
    }
}

pub struct StatsScreen;

impl Screen for StatsScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        stats::render(app, area, buf);
    }

    fn help(&self, _app: &App) -> &'static str {
        "tab mode / c clear history / s back / q quit"
    }
}

pub struct LeaderboardScreen;

impl Screen for LeaderboardScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        leaderboard::render(app, area, buf);
    }

    fn help(&self, _app: &App) -> &'static str {
        "tab mode / c clear leaderboard / l back / q quit"
    }
}

pub struct TrainingScreen;

impl Screen for TrainingScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        training::render(app, area, buf);
    }

    fn help(&self, _app: &App) -> &'static str {
        "t back / q quit"
    }
}

pub struct DuelScreen;

impl Screen for DuelScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        duel::render(app, area, buf);
    }

    fn help(&self, _app: &App) -> &'static str {
        "space or click / r new duel / d back / q quit"
    }
}

/// Helper to construct the screen for the current view
pub fn current_screen(view: View) -> Box<dyn Screen> {
    match view {
        View::Play => Box::new(PlayScreen),
        View::Stats => Box::new(StatsScreen),
        View::Leaderboard => Box::new(LeaderboardScreen),
        View::Training => Box::new(TrainingScreen),
        View::Duel => Box::new(DuelScreen),
    }
}
