//! Timing engines, one per test mode.
//!
//! Every engine is a phase enum plus the bookkeeping of one session. Inputs
//! arrive as method calls stamped with the monotonic instant they happened at;
//! each call returns the side effects the caller has to carry out (arm or
//! cancel a one-shot timer, record a finished session). Engines never read the
//! clock and never sleep, so they are fully deterministic under test.

pub mod duel;
pub mod reaction;
pub mod sequence;
pub mod target;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::mode::TestMode;

pub use duel::{Duel, DuelOutcome, DuelPhase, PlayerCard};
pub use reaction::{ReactionPhase, ReactionTest};
pub use sequence::{SequencePhase, SequenceTest, WrongClick};
pub use target::{SafeArea, TargetPhase, TargetPosition, TargetTest};

/// Identifies one armed timer. Tokens are unique for the life of the process
/// so a fire delivered after its session moved on can never match again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

impl TimerToken {
    pub fn issue() -> Self {
        TimerToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver `on_timer(token, ..)` once `after` has elapsed.
    ArmTimer { token: TimerToken, after: Duration },
    CancelTimer(TimerToken),
    /// The session finished with this duration in milliseconds.
    Completed(u64),
}

pub type Effects = Vec<Effect>;

/// Common surface the presentation layer drives.
pub trait TimingEngine {
    fn mode(&self) -> TestMode;

    /// Abandon whatever is in flight and begin a fresh session.
    fn start(&mut self, at: Instant) -> Effects;

    /// The single generic "advance" input: start, react, retry, replay.
    fn primary_action(&mut self, at: Instant) -> Effects;

    fn on_timer(&mut self, token: TimerToken, at: Instant) -> Effects;

    /// Back to idle, cancelling any pending timer.
    fn reset(&mut self) -> Effects;

    /// Final duration of the last finished session, while it is on screen.
    fn completed(&self) -> Option<u64>;
}

/// Milliseconds carried by the first `Completed` effect, if any.
pub fn completion(effects: &[Effect]) -> Option<u64> {
    effects.iter().find_map(|e| match e {
        Effect::Completed(ms) => Some(*ms),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        let a = TimerToken::issue();
        let b = TimerToken::issue();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn completion_finds_duration() {
        let effects = vec![
            Effect::CancelTimer(TimerToken::issue()),
            Effect::Completed(250),
        ];
        assert_eq!(completion(&effects), Some(250));
        assert_eq!(completion(&[]), None);
    }
}
