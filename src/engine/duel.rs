//! Two local players take turns at a full reaction session on one device.

use std::time::Instant;

use rand::Rng;

use super::{completion, Effect, Effects, ReactionTest, TimerToken, TimingEngine};
use crate::util::rounded_mean;

pub const DEFAULT_NAMES: [&str; 2] = ["Player 1", "Player 2"];
pub const MAX_NAME_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCard {
    pub name: String,
    pub times: Vec<u64>,
}

impl PlayerCard {
    fn new(name: &str, fallback: &str) -> Self {
        let name: String = name.trim().chars().take(MAX_NAME_LEN).collect();
        Self {
            name: if name.is_empty() {
                fallback.to_string()
            } else {
                name
            },
            times: vec![],
        }
    }

    pub fn average(&self) -> u64 {
        rounded_mean(&self.times).unwrap_or(0)
    }

    pub fn best(&self) -> u64 {
        self.times.iter().copied().min().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelPhase {
    /// `player` (0 or 1) is at the controls
    Turn { player: usize },
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelOutcome {
    /// Lower average wins; `None` is a tie
    pub winner: Option<usize>,
    pub averages: [u64; 2],
    pub bests: [u64; 2],
}

#[derive(Debug)]
pub struct Duel<R> {
    players: [PlayerCard; 2],
    phase: DuelPhase,
    test: ReactionTest<R>,
}

impl<R: Rng> Duel<R> {
    pub fn new(rng: R, first: &str, second: &str) -> Self {
        Self {
            players: [
                PlayerCard::new(first, DEFAULT_NAMES[0]),
                PlayerCard::new(second, DEFAULT_NAMES[1]),
            ],
            phase: DuelPhase::Turn { player: 0 },
            test: ReactionTest::new(rng),
        }
    }

    pub fn phase(&self) -> DuelPhase {
        self.phase
    }

    pub fn players(&self) -> &[PlayerCard; 2] {
        &self.players
    }

    pub fn test(&self) -> &ReactionTest<R> {
        &self.test
    }

    pub fn active_player(&self) -> Option<&PlayerCard> {
        match self.phase {
            DuelPhase::Turn { player } => Some(&self.players[player]),
            DuelPhase::Finished => None,
        }
    }

    /// Duel sessions never reach history, so `Completed` is kept in here.
    pub fn primary_action(&mut self, at: Instant) -> Effects {
        match self.phase {
            DuelPhase::Finished => self.reset(),
            DuelPhase::Turn { player } if self.test.completed().is_some() => {
                if player == 0 {
                    self.phase = DuelPhase::Turn { player: 1 };
                } else {
                    log::info!(
                        "duel finished: {} {} ms, {} {} ms",
                        self.players[0].name,
                        self.players[0].average(),
                        self.players[1].name,
                        self.players[1].average()
                    );
                    self.phase = DuelPhase::Finished;
                }
                self.test.reset()
            }
            DuelPhase::Turn { player } => {
                let effects = self.test.primary_action(at);
                if completion(&effects).is_some() {
                    self.players[player].times = self.test.durations().to_vec();
                }
                effects
                    .into_iter()
                    .filter(|e| !matches!(e, Effect::Completed(_)))
                    .collect()
            }
        }
    }

    pub fn on_timer(&mut self, token: TimerToken, at: Instant) -> Effects {
        self.test.on_timer(token, at)
    }

    /// Fresh duel with the same players, player 1 first.
    pub fn reset(&mut self) -> Effects {
        for player in &mut self.players {
            player.times.clear();
        }
        self.phase = DuelPhase::Turn { player: 0 };
        self.test.reset()
    }

    pub fn outcome(&self) -> Option<DuelOutcome> {
        if self.phase != DuelPhase::Finished {
            return None;
        }
        let averages = [self.players[0].average(), self.players[1].average()];
        let winner = match averages[0].cmp(&averages[1]) {
            std::cmp::Ordering::Less => Some(0),
            std::cmp::Ordering::Greater => Some(1),
            std::cmp::Ordering::Equal => None,
        };
        Some(DuelOutcome {
            winner,
            averages,
            bests: [self.players[0].best(), self.players[1].best()],
        })
    }
}
