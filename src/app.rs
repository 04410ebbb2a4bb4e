//! Application state shared by the terminal front-end and headless tests.
//!
//! `App` owns one engine per mode plus the duel, routes input to whichever is
//! on screen, carries out the effects they return and records finished
//! sessions in the stores.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ratatui::layout::{Position, Rect};

use crate::engine::sequence::{GRID_SIDE, GRID_SIZE};
use crate::engine::{
    Duel, Effect, Effects, ReactionTest, SafeArea, SequencePhase, SequenceTest, TargetPhase,
    TargetTest, TimerToken, TimingEngine,
};
use crate::mode::TestMode;
use crate::record::{GameResult, LeaderboardEntry};
use crate::runtime::TimerQueue;
use crate::stats::compute_stats;
use crate::store::{HistoryStore, Leaderboard};
use crate::ui::play::{play_surface, sequence_cell_at, target_rect};

pub type GameRng = ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum View {
    Play,
    Stats,
    Leaderboard,
    Training,
    Duel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Everything the app needs besides its stores.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub mode: TestMode,
    pub player_name: String,
    pub safe_area: SafeArea,
    pub duel_names: [String; 2],
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            mode: TestMode::Reaction,
            player_name: "You".to_string(),
            safe_area: SafeArea::default(),
            duel_names: [String::new(), String::new()],
            seed: None,
        }
    }
}

/// What happened to the last finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastRecord {
    pub mode: TestMode,
    pub time: u64,
    pub personal_best: bool,
    pub on_leaderboard: bool,
}

pub struct App {
    pub view: View,
    pub mode: TestMode,
    pub player_name: String,
    reaction: ReactionTest<GameRng>,
    target: TargetTest<GameRng>,
    sequence: SequenceTest<GameRng>,
    duel: Duel<GameRng>,
    history: HistoryStore,
    leaderboard: Leaderboard,
    timers: TimerQueue,
    sequence_cursor: usize,
    surface: Rect,
    last_record: Option<LastRecord>,
}

fn rng_for(seed: Option<u64>, stream: u64) -> GameRng {
    match seed {
        Some(seed) => {
            let mut rng = GameRng::seed_from_u64(seed);
            rng.set_stream(stream);
            rng
        }
        None => GameRng::from_entropy(),
    }
}

impl App {
    pub fn new(options: AppOptions, history: HistoryStore, leaderboard: Leaderboard) -> Self {
        let [first, second] = &options.duel_names;
        Self {
            view: View::Play,
            mode: options.mode,
            reaction: ReactionTest::new(rng_for(options.seed, 0)),
            target: TargetTest::with_area(rng_for(options.seed, 1), options.safe_area),
            sequence: SequenceTest::new(rng_for(options.seed, 2)),
            duel: Duel::new(rng_for(options.seed, 3), first, second),
            player_name: options.player_name,
            history,
            leaderboard,
            timers: TimerQueue::new(),
            sequence_cursor: 0,
            surface: Rect::default(),
            last_record: None,
        }
    }

    pub fn reaction(&self) -> &ReactionTest<GameRng> {
        &self.reaction
    }

    pub fn target(&self) -> &TargetTest<GameRng> {
        &self.target
    }

    pub fn sequence(&self) -> &SequenceTest<GameRng> {
        &self.sequence
    }

    pub fn duel(&self) -> &Duel<GameRng> {
        &self.duel
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn sequence_cursor(&self) -> usize {
        self.sequence_cursor
    }

    pub fn last_record(&self) -> Option<LastRecord> {
        self.last_record
    }

    /// Earliest pending timer, for bounding the event wait.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Track the terminal size so mouse clicks map onto what was drawn.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.surface = play_surface(Rect::new(0, 0, width, height));
    }

    pub fn surface(&self) -> Rect {
        self.surface
    }

    fn engine_mut(&mut self, mode: TestMode) -> &mut dyn TimingEngine {
        match mode {
            TestMode::Reaction => &mut self.reaction,
            TestMode::Target => &mut self.target,
            TestMode::Sequence => &mut self.sequence,
        }
    }

    pub fn engine(&self) -> &dyn TimingEngine {
        match self.mode {
            TestMode::Reaction => &self.reaction,
            TestMode::Target => &self.target,
            TestMode::Sequence => &self.sequence,
        }
    }

    /// Carry out what an engine asked for.
    pub fn apply(&mut self, effects: Effects, now: Instant) {
        for effect in effects {
            match effect {
                Effect::ArmTimer { token, after } => self.timers.arm(token, now + after),
                Effect::CancelTimer(token) => self.timers.cancel(token),
                Effect::Completed(time) => self.record(time),
            }
        }
    }

    fn record(&mut self, time: u64) {
        let stats = compute_stats(self.history.entries(), self.mode);
        let record = LastRecord {
            mode: self.mode,
            time,
            personal_best: stats.total_games == 0 || time < stats.best,
            on_leaderboard: self.leaderboard.qualifies(self.mode, time),
        };

        let result = GameResult::new(self.mode, time);
        self.history.append(result.clone());
        self.leaderboard
            .append(LeaderboardEntry::new(result, self.player_name.clone()));
        self.last_record = Some(record);
    }

    /// Deliver every timer due at `now` to whoever armed it.
    pub fn fire_due_timers(&mut self, now: Instant) {
        for (token, _) in self.timers.take_due(now) {
            // stamped with the wake-up instant, not the scheduled deadline
            let effects = self.route_timer(token, now);
            self.apply(effects, now);
        }
    }

    fn route_timer(&mut self, token: TimerToken, at: Instant) -> Effects {
        match self.view {
            View::Duel => self.duel.on_timer(token, at),
            _ => self.engine_mut(self.mode).on_timer(token, at),
        }
    }

    /// Tear down whatever is running on the current screen.
    fn teardown(&mut self) {
        let effects = match self.view {
            View::Duel => self.duel.reset(),
            _ => self.engine_mut(self.mode).reset(),
        };
        self.apply(effects, Instant::now());
        if !self.timers.is_empty() {
            log::debug!("dropping {} leftover timers", self.timers.len());
            self.timers.clear();
        }
    }

    pub fn switch_mode(&mut self, mode: TestMode) {
        self.teardown();
        self.mode = mode;
        self.view = View::Play;
        self.sequence_cursor = 0;
        self.last_record = None;
    }

    pub fn switch_view(&mut self, view: View) {
        if view == self.view {
            return;
        }
        self.teardown();
        self.view = view;
    }

    /// Toggle between `view` and the play screen.
    fn toggle_view(&mut self, view: View) {
        if self.view == view {
            self.switch_view(View::Play);
        } else {
            self.switch_view(view);
        }
    }

    pub fn restart(&mut self) {
        self.teardown();
        self.last_record = None;
    }

    pub fn primary_action(&mut self, at: Instant) {
        let effects = match self.view {
            View::Play => match (self.mode, self.sequence.phase()) {
                (TestMode::Sequence, SequencePhase::Playing { .. }) => {
                    self.sequence.select_cell(self.sequence_cursor, at)
                }
                _ => self.engine_mut(self.mode).primary_action(at),
            },
            View::Duel => self.duel.primary_action(at),
            View::Stats | View::Leaderboard | View::Training => return,
        };
        self.apply(effects, at);
    }

    pub fn clear_history(&mut self) {
        log::info!("clearing history");
        self.history.clear();
    }

    pub fn clear_leaderboard(&mut self) {
        log::info!("clearing leaderboard");
        self.leaderboard.clear();
    }

    fn move_cursor(&mut self, dx: i32, dy: i32) {
        let side = GRID_SIDE as i32;
        let col = (self.sequence_cursor as i32 % side + dx).rem_euclid(side);
        let row = (self.sequence_cursor as i32 / side + dy).rem_euclid(side);
        self.sequence_cursor = (row * side + col) as usize;
    }

    pub fn handle_key(&mut self, key: KeyEvent, at: Instant) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Char(' ') | KeyCode::Enter => self.primary_action(at),
            KeyCode::Tab => self.switch_mode(self.mode.next()),
            KeyCode::BackTab => self.switch_mode(self.mode.prev()),
            KeyCode::Char(c @ '1'..='3') => {
                let index = c as usize - '1' as usize;
                self.switch_mode(TestMode::ALL[index]);
            }
            KeyCode::Char('p') => self.switch_view(View::Play),
            KeyCode::Char('s') => self.toggle_view(View::Stats),
            KeyCode::Char('l') => self.toggle_view(View::Leaderboard),
            KeyCode::Char('t') => self.toggle_view(View::Training),
            KeyCode::Char('d') => self.toggle_view(View::Duel),
            KeyCode::Char('r') => self.restart(),
            KeyCode::Char('c') => match self.view {
                View::Stats => self.clear_history(),
                View::Leaderboard => self.clear_leaderboard(),
                _ => {}
            },
            KeyCode::Left if self.cursor_active() => self.move_cursor(-1, 0),
            KeyCode::Right if self.cursor_active() => self.move_cursor(1, 0),
            KeyCode::Up if self.cursor_active() => self.move_cursor(0, -1),
            KeyCode::Down if self.cursor_active() => self.move_cursor(0, 1),
            _ => {}
        }
        Flow::Continue
    }

    fn cursor_active(&self) -> bool {
        self.view == View::Play && self.mode == TestMode::Sequence
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, at: Instant) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let pos = Position::new(mouse.column, mouse.row);
        if !self.surface.contains(pos) {
            return;
        }

        match (self.view, self.mode) {
            (View::Duel, _) | (View::Play, TestMode::Reaction) => self.primary_action(at),
            (View::Play, TestMode::Target) => match self.target.phase() {
                TargetPhase::Playing { target, .. } => {
                    if target_rect(self.surface, &target).contains(pos) {
                        let effects = self.target.hit(at);
                        self.apply(effects, at);
                    }
                }
                _ => self.primary_action(at),
            },
            (View::Play, TestMode::Sequence) => match self.sequence.phase() {
                SequencePhase::Playing { .. } => {
                    if let Some(cell) = sequence_cell_at(self.surface, pos) {
                        debug_assert!(cell < GRID_SIZE);
                        self.sequence_cursor = cell;
                        let effects = self.sequence.select_cell(cell, at);
                        self.apply(effects, at);
                    }
                }
                _ => self.primary_action(at),
            },
            _ => {}
        }
    }
}
