//! Target test: hit a sequence of randomly placed targets as fast as possible.

use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Effect, Effects, TimerToken, TimingEngine};
use crate::error::ConfigError;
use crate::mode::TestMode;
use crate::util::{elapsed_ms, rounded_mean};

pub const TARGET_COUNT: usize = 15;

/// Sub-rectangle of the play surface targets may appear in, as fractions of
/// its width and height. Keeps targets away from the edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeArea {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for SafeArea {
    fn default() -> Self {
        Self {
            min_x: 0.10,
            max_x: 0.85,
            min_y: 0.10,
            max_y: 0.80,
        }
    }
}

impl SafeArea {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if ![self.min_x, self.max_x, self.min_y, self.max_y]
            .into_iter()
            .all(in_unit)
        {
            return Err(ConfigError::InvalidSafeArea(format!(
                "bounds must be fractions in [0, 1], got {self:?}"
            )));
        }
        if self.min_x >= self.max_x || self.min_y >= self.max_y {
            return Err(ConfigError::InvalidSafeArea(format!(
                "minimum must be below maximum, got {self:?}"
            )));
        }
        Ok(())
    }

    fn sample<R: Rng>(&self, rng: &mut R, index: usize) -> TargetPosition {
        TargetPosition {
            x: rng.gen_range(self.min_x..self.max_x),
            y: rng.gen_range(self.min_y..self.max_y),
            index,
        }
    }
}

/// Where the current target sits, as fractions of the play surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPosition {
    pub x: f64,
    pub y: f64,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetPhase {
    Idle,
    Playing {
        target: TargetPosition,
        shown_at: Instant,
    },
    Result {
        average: u64,
    },
}

#[derive(Debug)]
pub struct TargetTest<R> {
    phase: TargetPhase,
    area: SafeArea,
    count: usize,
    durations: Vec<u64>,
    rng: R,
}

impl<R: Rng> TargetTest<R> {
    pub fn new(rng: R) -> Self {
        Self::with_area(rng, SafeArea::default())
    }

    pub fn with_area(rng: R, area: SafeArea) -> Self {
        debug_assert!(area.validate().is_ok());
        Self {
            phase: TargetPhase::Idle,
            area,
            count: TARGET_COUNT,
            durations: Vec::with_capacity(TARGET_COUNT),
            rng,
        }
    }

    pub fn phase(&self) -> TargetPhase {
        self.phase
    }

    pub fn area(&self) -> SafeArea {
        self.area
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn hits(&self) -> usize {
        self.durations.len()
    }

    pub fn durations(&self) -> &[u64] {
        &self.durations
    }

    pub fn current_target(&self) -> Option<TargetPosition> {
        match self.phase {
            TargetPhase::Playing { target, .. } => Some(target),
            _ => None,
        }
    }

    fn begin(&mut self, at: Instant) -> Effects {
        self.durations.clear();
        self.spawn(0, at);
        Effects::new()
    }

    fn spawn(&mut self, index: usize, at: Instant) {
        let target = self.area.sample(&mut self.rng, index);
        self.phase = TargetPhase::Playing {
            target,
            shown_at: at,
        };
    }

    /// Register a hit on the current target. Only the target itself is
    /// clickable, so there is no miss path.
    pub fn hit(&mut self, at: Instant) -> Effects {
        let TargetPhase::Playing { target, shown_at } = self.phase else {
            return Effects::new();
        };

        self.durations.push(elapsed_ms(shown_at, at));

        if self.durations.len() >= self.count {
            let average = rounded_mean(&self.durations).unwrap_or_default();
            log::info!("target session finished: {average} ms average");
            self.phase = TargetPhase::Result { average };
            vec![Effect::Completed(average)]
        } else {
            self.spawn(target.index + 1, at);
            Effects::new()
        }
    }
}

impl<R: Rng> TimingEngine for TargetTest<R> {
    fn mode(&self) -> TestMode {
        TestMode::Target
    }

    fn start(&mut self, at: Instant) -> Effects {
        let mut effects = self.reset();
        effects.extend(self.begin(at));
        effects
    }

    /// Starts from idle and dismisses the result. Targets are only hit
    /// by clicking them, through [`TargetTest::hit`].
    fn primary_action(&mut self, at: Instant) -> Effects {
        match self.phase {
            TargetPhase::Idle => self.begin(at),
            TargetPhase::Playing { .. } => {
                log::debug!("target hits need a click, ignoring action");
                Effects::new()
            }
            TargetPhase::Result { .. } => {
                self.phase = TargetPhase::Idle;
                Effects::new()
            }
        }
    }

    fn on_timer(&mut self, token: TimerToken, _at: Instant) -> Effects {
        log::debug!("target test has no timers, ignoring {token:?}");
        Effects::new()
    }

    fn reset(&mut self) -> Effects {
        self.phase = TargetPhase::Idle;
        self.durations.clear();
        Effects::new()
    }

    fn completed(&self) -> Option<u64> {
        match self.phase {
            TargetPhase::Result { average } => Some(average),
            _ => None,
        }
    }
}
