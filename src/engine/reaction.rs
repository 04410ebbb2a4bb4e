//! Reaction test: wait for the stimulus after a random delay, then press.

use std::time::{Duration, Instant};

use rand::Rng;

use super::{Effect, Effects, TimerToken, TimingEngine};
use crate::mode::TestMode;
use crate::util::{elapsed_ms, rounded_mean};

pub const ROUNDS: usize = 5;
pub const MIN_DELAY_MS: u64 = 1_000;
pub const MAX_DELAY_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionPhase {
    Idle,
    /// Stimulus armed; pressing now is too early.
    Waiting { armed_at: Instant, token: TimerToken },
    /// Stimulus shown at `stimulus_at`; the next press is measured.
    Ready { stimulus_at: Instant },
    /// Pressed before the stimulus. Needs an explicit retry.
    TooEarly,
    Result { average: u64 },
}

#[derive(Debug)]
pub struct ReactionTest<R> {
    phase: ReactionPhase,
    round: usize,
    rounds: usize,
    durations: Vec<u64>,
    rng: R,
}

impl<R: Rng> ReactionTest<R> {
    pub fn new(rng: R) -> Self {
        Self::with_rounds(rng, ROUNDS)
    }

    pub fn with_rounds(rng: R, rounds: usize) -> Self {
        debug_assert!(rounds > 0);
        Self {
            phase: ReactionPhase::Idle,
            round: 0,
            rounds,
            durations: Vec::with_capacity(rounds),
            rng,
        }
    }

    pub fn phase(&self) -> ReactionPhase {
        self.phase
    }

    /// 1-based round currently being played, 0 when idle
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn durations(&self) -> &[u64] {
        &self.durations
    }

    fn begin(&mut self, at: Instant) -> Effects {
        self.round = 1;
        self.durations.clear();
        self.arm(at)
    }

    /// Enter `Waiting` with a fresh random delay.
    fn arm(&mut self, at: Instant) -> Effects {
        let mut effects = Effects::new();
        if let ReactionPhase::Waiting { token, .. } = self.phase {
            effects.push(Effect::CancelTimer(token));
        }

        let delay = self.rng.gen_range(MIN_DELAY_MS..MAX_DELAY_MS);
        debug_assert!((MIN_DELAY_MS..MAX_DELAY_MS).contains(&delay));

        let token = TimerToken::issue();
        self.phase = ReactionPhase::Waiting {
            armed_at: at,
            token,
        };
        effects.push(Effect::ArmTimer {
            token,
            after: Duration::from_millis(delay),
        });
        effects
    }

    fn record(&mut self, stimulus_at: Instant, at: Instant) -> Effects {
        self.durations.push(elapsed_ms(stimulus_at, at));

        if self.durations.len() >= self.rounds {
            let average = rounded_mean(&self.durations).unwrap_or_default();
            log::info!(
                "reaction session finished: {average} ms over {} rounds",
                self.durations.len()
            );
            self.phase = ReactionPhase::Result { average };
            vec![Effect::Completed(average)]
        } else {
            self.round += 1;
            self.arm(at)
        }
    }
}

impl<R: Rng> TimingEngine for ReactionTest<R> {
    fn mode(&self) -> TestMode {
        TestMode::Reaction
    }

    fn start(&mut self, at: Instant) -> Effects {
        let mut effects = self.reset();
        effects.extend(self.begin(at));
        effects
    }

    fn primary_action(&mut self, at: Instant) -> Effects {
        match self.phase {
            ReactionPhase::Idle => self.begin(at),
            ReactionPhase::Waiting { token, .. } => {
                self.phase = ReactionPhase::TooEarly;
                vec![Effect::CancelTimer(token)]
            }
            // input read before the stimulus fired still counts as early
            ReactionPhase::Ready { stimulus_at } if at < stimulus_at => {
                self.phase = ReactionPhase::TooEarly;
                Effects::new()
            }
            ReactionPhase::Ready { stimulus_at } => self.record(stimulus_at, at),
            ReactionPhase::TooEarly => self.arm(at),
            ReactionPhase::Result { .. } => {
                self.phase = ReactionPhase::Idle;
                Effects::new()
            }
        }
    }

    fn on_timer(&mut self, token: TimerToken, at: Instant) -> Effects {
        match self.phase {
            ReactionPhase::Waiting { token: armed, .. } if armed == token => {
                self.phase = ReactionPhase::Ready { stimulus_at: at };
            }
            _ => log::debug!("ignoring stale reaction timer {token:?}"),
        }
        Effects::new()
    }

    fn reset(&mut self) -> Effects {
        let effects = match self.phase {
            ReactionPhase::Waiting { token, .. } => vec![Effect::CancelTimer(token)],
            _ => Effects::new(),
        };
        self.phase = ReactionPhase::Idle;
        self.round = 0;
        self.durations.clear();
        effects
    }

    fn completed(&self) -> Option<u64> {
        match self.phase {
            ReactionPhase::Result { average } => Some(average),
            _ => None,
        }
    }
}
