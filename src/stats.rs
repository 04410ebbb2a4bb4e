use serde::Serialize;

use crate::mode::TestMode;
use crate::record::GameResult;
use crate::util::rounded_mean;

/// How many of the latest results feed `last10_average`
pub const RECENT_WINDOW: usize = 10;
/// How many of the latest results the history chart shows
pub const CHART_WINDOW: usize = 20;

/// Summary of a mode's history. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub best: u64,
    pub average: u64,
    pub last10_average: u64,
    pub total_games: usize,
}

/// Times of the results for `mode`, in insertion order.
pub fn mode_times(history: &[GameResult], mode: TestMode) -> Vec<u64> {
    history
        .iter()
        .filter(|r| r.mode == mode)
        .map(|r| r.time)
        .collect()
}

pub fn compute_stats(history: &[GameResult], mode: TestMode) -> Stats {
    let times = mode_times(history, mode);
    let Some(best) = times.iter().copied().min() else {
        return Stats::default();
    };

    let recent = &times[times.len().saturating_sub(RECENT_WINDOW)..];

    Stats {
        best,
        average: rounded_mean(&times).unwrap_or_default(),
        last10_average: rounded_mean(recent).unwrap_or_default(),
        total_games: times.len(),
    }
}

/// The latest `limit` results for `mode`, oldest first.
pub fn recent_results(history: &[GameResult], mode: TestMode, limit: usize) -> Vec<&GameResult> {
    let matching: Vec<&GameResult> = history.iter().filter(|r| r.mode == mode).collect();
    let skip = matching.len().saturating_sub(limit);
    matching.into_iter().skip(skip).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(mode: TestMode, time: u64) -> GameResult {
        GameResult::new(mode, time)
    }

    #[test]
    fn empty_history_is_all_zero() {
        let stats = compute_stats(&[], TestMode::Reaction);
        assert_eq!(
            stats,
            Stats {
                best: 0,
                average: 0,
                last10_average: 0,
                total_games: 0
            }
        );
    }

    #[test]
    fn reaction_scenario() {
        let history = vec![
            result(TestMode::Reaction, 200),
            result(TestMode::Reaction, 300),
            result(TestMode::Reaction, 250),
        ];

        let stats = compute_stats(&history, TestMode::Reaction);

        assert_eq!(stats.average, 250);
        assert_eq!(stats.best, 200);
        assert_eq!(stats.last10_average, 250);
        assert_eq!(stats.total_games, 3);
    }

    #[test]
    fn other_modes_are_filtered_out() {
        let history = vec![
            result(TestMode::Target, 500),
            result(TestMode::Reaction, 180),
            result(TestMode::Sequence, 14_000),
            result(TestMode::Target, 601),
        ];

        let stats = compute_stats(&history, TestMode::Target);

        assert_eq!(stats.total_games, 2);
        assert_eq!(stats.best, 500);
        assert_eq!(stats.average, 551);
        assert_eq!(compute_stats(&history, TestMode::Sequence).best, 14_000);
    }

    #[test]
    fn last10_is_a_suffix_in_insertion_order() {
        // twelve results: two slow ones first, then ten at 200
        let mut history = vec![
            result(TestMode::Reaction, 1_000),
            result(TestMode::Reaction, 1_000),
        ];
        history.extend((0..10).map(|_| result(TestMode::Reaction, 200)));
        history.insert(5, result(TestMode::Target, 9_999));

        let stats = compute_stats(&history, TestMode::Reaction);

        assert_eq!(stats.total_games, 12);
        assert_eq!(stats.last10_average, 200);
        assert_eq!(stats.average, 333);
    }

    #[test]
    fn compute_stats_is_idempotent() {
        let history: Vec<GameResult> = [310, 290, 275, 401]
            .into_iter()
            .map(|t| result(TestMode::Reaction, t))
            .collect();
        let first = compute_stats(&history, TestMode::Reaction);
        let second = compute_stats(&history, TestMode::Reaction);
        assert_eq!(first, second);
        assert_eq!(first.total_games, 4);
    }

    #[test]
    fn recent_results_keeps_latest_in_order() {
        let history: Vec<GameResult> = (0..25)
            .map(|i| result(TestMode::Sequence, 10_000 + i))
            .collect();
        let recent = recent_results(&history, TestMode::Sequence, CHART_WINDOW);
        assert_eq!(recent.len(), CHART_WINDOW);
        assert_eq!(recent.first().unwrap().time, 10_005);
        assert_eq!(recent.last().unwrap().time, 10_024);
        assert!(recent_results(&history, TestMode::Reaction, 5).is_empty());
    }
}
