//! Sequence test: find 1 through 25 in a shuffled grid, in order.

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;

use super::{Effect, Effects, TimerToken, TimingEngine};
use crate::mode::TestMode;
use crate::util::elapsed_ms;

pub const GRID_SIZE: usize = 25;
pub const GRID_SIDE: usize = 5;
/// How long a wrong-click marker stays visible
pub const WRONG_CLICK_CLEAR: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencePhase {
    Idle,
    Playing { started_at: Instant },
    Result { total: u64 },
}

/// Transient rejection marker on a cell, cleared by its own timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrongClick {
    pub cell: usize,
    pub token: TimerToken,
}

#[derive(Debug)]
pub struct SequenceTest<R> {
    phase: SequencePhase,
    grid: Vec<u8>,
    next_expected: u8,
    wrong: Option<WrongClick>,
    rng: R,
}

/// Unbiased Fisher-Yates permutation of 1..=25.
pub fn shuffled_grid<R: Rng>(rng: &mut R) -> Vec<u8> {
    let mut grid: Vec<u8> = (1..=GRID_SIZE as u8).collect();
    grid.shuffle(rng);
    grid
}

impl<R: Rng> SequenceTest<R> {
    pub fn new(rng: R) -> Self {
        Self {
            phase: SequencePhase::Idle,
            grid: (1..=GRID_SIZE as u8).collect(),
            next_expected: 1,
            wrong: None,
            rng,
        }
    }

    pub fn phase(&self) -> SequencePhase {
        self.phase
    }

    pub fn grid(&self) -> &[u8] {
        &self.grid
    }

    pub fn next_expected(&self) -> u8 {
        self.next_expected
    }

    pub fn found(&self) -> usize {
        usize::from(self.next_expected - 1)
    }

    pub fn wrong_click(&self) -> Option<WrongClick> {
        self.wrong
    }

    /// Already-found cells are permanently disabled.
    pub fn is_found(&self, cell: usize) -> bool {
        self.grid.get(cell).is_some_and(|n| *n < self.next_expected)
    }

    pub fn is_wrong(&self, cell: usize) -> bool {
        self.wrong.is_some_and(|w| w.cell == cell)
    }

    fn begin(&mut self, at: Instant) -> Effects {
        self.grid = shuffled_grid(&mut self.rng);
        self.next_expected = 1;
        self.phase = SequencePhase::Playing { started_at: at };
        Effects::new()
    }

    fn clear_wrong(&mut self, effects: &mut Effects) {
        if let Some(wrong) = self.wrong.take() {
            effects.push(Effect::CancelTimer(wrong.token));
        }
    }

    pub fn select_cell(&mut self, cell: usize, at: Instant) -> Effects {
        let SequencePhase::Playing { started_at } = self.phase else {
            return Effects::new();
        };
        let Some(&number) = self.grid.get(cell) else {
            log::debug!("sequence cell {cell} out of range");
            return Effects::new();
        };
        if number < self.next_expected {
            return Effects::new();
        }

        let mut effects = Effects::new();
        self.clear_wrong(&mut effects);

        if number == self.next_expected {
            if usize::from(number) == GRID_SIZE {
                let total = elapsed_ms(started_at, at);
                log::info!("sequence session finished in {total} ms");
                self.next_expected += 1;
                self.phase = SequencePhase::Result { total };
                effects.push(Effect::Completed(total));
            } else {
                self.next_expected += 1;
            }
        } else {
            let token = TimerToken::issue();
            self.wrong = Some(WrongClick { cell, token });
            effects.push(Effect::ArmTimer {
                token,
                after: WRONG_CLICK_CLEAR,
            });
        }
        effects
    }

    pub fn select_number(&mut self, number: u8, at: Instant) -> Effects {
        match self.grid.iter().position(|n| *n == number) {
            Some(cell) => self.select_cell(cell, at),
            None => Effects::new(),
        }
    }
}

impl<R: Rng> TimingEngine for SequenceTest<R> {
    fn mode(&self) -> TestMode {
        TestMode::Sequence
    }

    fn start(&mut self, at: Instant) -> Effects {
        let mut effects = self.reset();
        effects.extend(self.begin(at));
        effects
    }

    /// Starts from idle and dismisses the result. Cells are chosen with
    /// [`SequenceTest::select_cell`].
    fn primary_action(&mut self, at: Instant) -> Effects {
        match self.phase {
            SequencePhase::Idle => self.begin(at),
            SequencePhase::Playing { .. } => Effects::new(),
            SequencePhase::Result { .. } => {
                self.phase = SequencePhase::Idle;
                Effects::new()
            }
        }
    }

    fn on_timer(&mut self, token: TimerToken, _at: Instant) -> Effects {
        match self.wrong {
            Some(wrong) if wrong.token == token => self.wrong = None,
            _ => log::debug!("ignoring stale sequence timer {token:?}"),
        }
        Effects::new()
    }

    fn reset(&mut self) -> Effects {
        let mut effects = Effects::new();
        self.clear_wrong(&mut effects);
        self.phase = SequencePhase::Idle;
        self.next_expected = 1;
        effects
    }

    fn completed(&self) -> Option<u64> {
        match self.phase {
            SequencePhase::Result { total } => Some(total),
            _ => None,
        }
    }
}
