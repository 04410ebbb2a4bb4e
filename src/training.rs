//! Daily and weekly progress for reaction mode.

use chrono::{Datelike, Days, Local, NaiveDate};
use itertools::Itertools;

use crate::mode::TestMode;
use crate::record::GameResult;
use crate::stats::RECENT_WINDOW;
use crate::util::rounded_mean;

pub const TRAINING_DAYS: u64 = 30;
pub const MAX_TIPS: usize = 3;
const MAX_STREAK_DAYS: u64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySummary {
    pub day: NaiveDate,
    pub games: usize,
    /// Zero when no games were played that day
    pub best: u64,
    pub average: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeeklyStats {
    pub this_week_games: usize,
    pub this_week_average: u64,
    pub last_week_average: u64,
    /// Positive when this week is faster than last week
    pub improvement_pct: i64,
}

impl WeeklyStats {
    pub fn comparable(&self) -> bool {
        self.this_week_average > 0 && self.last_week_average > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingReport {
    pub days: Vec<DaySummary>,
    pub weekly: WeeklyStats,
    pub streak: u32,
    /// (min, max) of the best-time chart
    pub chart_bounds: (u64, u64),
    pub tips: Vec<String>,
}

/// Calendar day of a result in the local time zone.
pub fn local_day(result: &GameResult) -> NaiveDate {
    result.timestamp.with_timezone(&Local).date_naive()
}

fn reaction_results(history: &[GameResult]) -> Vec<&GameResult> {
    history
        .iter()
        .filter(|r| r.mode == TestMode::Reaction)
        .collect()
}

/// One summary per day for the `TRAINING_DAYS` days ending `today`, oldest first.
pub fn daily_summaries(history: &[GameResult], today: NaiveDate) -> Vec<DaySummary> {
    let by_day = reaction_results(history)
        .into_iter()
        .map(|r| (local_day(r), r.time))
        .into_group_map();

    (0..TRAINING_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|day| {
            let times = by_day.get(&day).map(Vec::as_slice).unwrap_or_default();
            DaySummary {
                day,
                games: times.len(),
                best: times.iter().copied().min().unwrap_or(0),
                average: rounded_mean(times).unwrap_or(0),
            }
        })
        .collect()
}

/// JS-style rounding: halves go towards positive infinity.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Weeks start on Sunday.
pub fn weekly_stats(history: &[GameResult], today: NaiveDate) -> WeeklyStats {
    let since_sunday = u64::from(today.weekday().num_days_from_sunday());
    let Some(this_week_start) = today.checked_sub_days(Days::new(since_sunday)) else {
        return WeeklyStats::default();
    };
    let Some(last_week_start) = this_week_start.checked_sub_days(Days::new(7)) else {
        return WeeklyStats::default();
    };

    let mut this_week = vec![];
    let mut last_week = vec![];
    for r in reaction_results(history) {
        let day = local_day(r);
        if day >= this_week_start {
            this_week.push(r.time);
        } else if day >= last_week_start {
            last_week.push(r.time);
        }
    }

    let this_week_average = rounded_mean(&this_week).unwrap_or(0);
    let last_week_average = rounded_mean(&last_week).unwrap_or(0);
    let improvement_pct = if this_week_average > 0 && last_week_average > 0 {
        let last = last_week_average as f64;
        round_half_up((last - this_week_average as f64) / last * 100.0)
    } else {
        0
    };

    WeeklyStats {
        this_week_games: this_week.len(),
        this_week_average,
        last_week_average,
        improvement_pct,
    }
}

/// Consecutive days with games, ending today or, if today is empty, yesterday.
pub fn streak(history: &[GameResult], today: NaiveDate) -> u32 {
    let played: std::collections::HashSet<NaiveDate> =
        reaction_results(history).into_iter().map(local_day).collect();

    let mut count = 0;
    for back in 0..MAX_STREAK_DAYS {
        let Some(day) = today.checked_sub_days(Days::new(back)) else {
            break;
        };
        if played.contains(&day) {
            count += 1;
        } else if back > 0 {
            break;
        }
    }
    count
}

/// Y range of the daily-best chart over days that had games.
pub fn chart_bounds(days: &[DaySummary]) -> (u64, u64) {
    let bests: Vec<u64> = days.iter().filter(|d| d.games > 0).map(|d| d.best).collect();
    match (bests.iter().min(), bests.iter().max()) {
        (Some(&min), Some(&max)) => (min.saturating_sub(50), max.max(200)),
        _ => (0, 400),
    }
}

pub fn tips(history: &[GameResult], weekly: &WeeklyStats, streak: u32) -> Vec<String> {
    let times: Vec<u64> = reaction_results(history).iter().map(|r| r.time).collect();
    if times.is_empty() {
        return vec![
            "Start playing reaction time games to track your progress!".to_string(),
            "Consistency is key: try to practice a few rounds every day.".to_string(),
        ];
    }

    let recent = &times[times.len().saturating_sub(RECENT_WINDOW)..];
    let recent_average = rounded_mean(recent).unwrap_or(0);

    let mut tips: Vec<String> = match recent_average {
        0..=199 => vec![
            "Excellent reflexes! Focus on consistency across all rounds.",
            "Try the Target Click mode to test your precision along with speed.",
        ],
        200..=279 => vec![
            "Good performance! Try to anticipate the color change timing.",
            "Reduce distractions and focus solely on the screen during tests.",
        ],
        280..=349 => vec![
            "Room for improvement! Make sure you are well-rested before testing.",
            "Keep a finger resting on the space bar between rounds.",
        ],
        _ => vec![
            "Keep practicing! Regular sessions will improve your reaction time.",
            "Try warming up with a few practice rounds before serious attempts.",
        ],
    }
    .into_iter()
    .map(String::from)
    .collect();

    if weekly.improvement_pct > 0 {
        tips.push(format!(
            "Great progress! You improved {}% compared to last week.",
            weekly.improvement_pct
        ));
    } else if weekly.improvement_pct < -5 {
        tips.push("Your times increased this week. Ensure you are focused and rested.".to_string());
    }

    if streak >= 3 {
        tips.push(format!(
            "{streak}-day streak! Consistency is building your muscle memory."
        ));
    } else if streak == 0 {
        tips.push("Start a daily practice streak to build consistent improvement.".to_string());
    }

    tips.truncate(MAX_TIPS);
    tips
}

impl TrainingReport {
    pub fn build(history: &[GameResult], today: NaiveDate) -> Self {
        let days = daily_summaries(history, today);
        let weekly = weekly_stats(history, today);
        let streak = streak(history, today);
        Self {
            chart_bounds: chart_bounds(&days),
            tips: tips(history, &weekly, streak),
            days,
            weekly,
            streak,
        }
    }

    /// Days that had at least one game, oldest first.
    pub fn played_days(&self) -> impl Iterator<Item = &DaySummary> {
        self.days.iter().filter(|d| d.games > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// A result at local noon on `day`, so the local calendar day is stable.
    fn on(day: NaiveDate, mode: TestMode, time: u64) -> GameResult {
        let noon = day.and_hms_opt(12, 0, 0).unwrap();
        let ts = Local.from_local_datetime(&noon).unwrap().with_timezone(&Utc);
        GameResult::at(mode, time, ts)
    }

    fn reaction(day: NaiveDate, time: u64) -> GameResult {
        on(day, TestMode::Reaction, time)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn thirty_days_with_zero_filled_gaps() {
        // 2026-10-14 is a Wednesday
        let today = date(2026, 10, 14);
        let history = vec![
            reaction(today, 240),
            reaction(today, 260),
            reaction(date(2026, 10, 10), 300),
            on(today, TestMode::Target, 100),
            reaction(date(2026, 8, 1), 150),
        ];

        let days = daily_summaries(&history, today);

        assert_eq!(days.len(), 30);
        assert_eq!(days[0].day, date(2026, 9, 15));
        let last = days[29];
        assert_eq!((last.day, last.games, last.best, last.average), (today, 2, 240, 250));
        let oct10 = days.iter().find(|d| d.day == date(2026, 10, 10)).unwrap();
        assert_eq!(oct10.games, 1);
        assert_eq!(days.iter().filter(|d| d.games == 0).count(), 28);
    }

    #[test]
    fn weekly_stats_start_on_sunday() {
        let today = date(2026, 10, 14);
        let history = vec![
            reaction(date(2026, 10, 11), 200), // Sunday, this week
            reaction(date(2026, 10, 13), 220),
            reaction(date(2026, 10, 10), 250), // Saturday, last week
            reaction(date(2026, 10, 4), 250),  // Sunday, last week
            reaction(date(2026, 10, 3), 900),  // two weeks back
        ];

        let weekly = weekly_stats(&history, today);

        assert_eq!(weekly.this_week_games, 2);
        assert_eq!(weekly.this_week_average, 210);
        assert_eq!(weekly.last_week_average, 250);
        assert_eq!(weekly.improvement_pct, 16);
        assert!(weekly.comparable());
    }

    #[test]
    fn improvement_needs_both_weeks() {
        let today = date(2026, 10, 14);
        let weekly = weekly_stats(&[reaction(today, 200)], today);
        assert_eq!(weekly.improvement_pct, 0);
        assert!(!weekly.comparable());

        let slower = weekly_stats(&[reaction(today, 300), reaction(date(2026, 10, 5), 200)], today);
        assert_eq!(slower.improvement_pct, -50);
    }

    #[test]
    fn streak_counts_back_from_today_or_yesterday() {
        let today = date(2026, 10, 14);
        let run = vec![
            reaction(date(2026, 10, 13), 250),
            reaction(date(2026, 10, 12), 250),
            reaction(date(2026, 10, 11), 250),
            reaction(date(2026, 10, 9), 250),
        ];
        assert_eq!(streak(&run, today), 3);

        let mut with_today = run.clone();
        with_today.push(reaction(today, 250));
        assert_eq!(streak(&with_today, today), 4);

        assert_eq!(streak(&[reaction(date(2026, 10, 12), 250)], today), 0);
        assert_eq!(streak(&[], today), 0);
    }

    #[test]
    fn chart_bounds_pad_below_and_floor_above() {
        let today = date(2026, 10, 14);
        assert_eq!(chart_bounds(&daily_summaries(&[], today)), (0, 400));

        let history = vec![reaction(today, 180), reaction(date(2026, 10, 1), 150)];
        assert_eq!(chart_bounds(&daily_summaries(&history, today)), (100, 200));

        let history = vec![reaction(today, 30), reaction(date(2026, 10, 1), 420)];
        assert_eq!(chart_bounds(&daily_summaries(&history, today)), (0, 420));
    }

    #[test]
    fn tips_for_empty_history() {
        let tips = tips(&[], &WeeklyStats::default(), 0);
        assert_eq!(tips.len(), 2);
        assert!(tips[0].starts_with("Start playing"));
    }

    #[test]
    fn tips_follow_speed_progress_and_streak() {
        let today = date(2026, 10, 14);
        let history = vec![reaction(today, 190)];
        let weekly = WeeklyStats {
            improvement_pct: 12,
            ..WeeklyStats::default()
        };

        let tips = tips(&history, &weekly, 5);

        assert_eq!(tips.len(), MAX_TIPS);
        assert!(tips[0].starts_with("Excellent reflexes"));
        assert!(tips[2].contains("12%"));
    }

    #[test]
    fn tips_mention_streak_or_lack_of_one() {
        let today = date(2026, 10, 14);
        let history = vec![reaction(today, 400)];

        let tips_with_streak = tips(&history, &WeeklyStats::default(), 4);
        assert!(tips_with_streak[2].starts_with("4-day streak"));

        let slower = WeeklyStats {
            improvement_pct: -10,
            ..WeeklyStats::default()
        };
        let tips_slower = tips(&history, &slower, 0);
        assert!(tips_slower[2].starts_with("Your times increased"));
    }

    #[test]
    fn report_only_uses_reaction_results() {
        let today = date(2026, 10, 14);
        let history = vec![
            on(today, TestMode::Sequence, 9_000),
            on(today, TestMode::Target, 400),
        ];

        let report = TrainingReport::build(&history, today);

        assert_eq!(report.played_days().count(), 0);
        assert_eq!(report.streak, 0);
        assert_eq!(report.chart_bounds, (0, 400));
        assert!(report.tips[0].starts_with("Start playing"));
    }

    #[test]
    fn utc_timestamps_map_to_local_days() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap();
        let result = GameResult::at(TestMode::Reaction, 200, ts);
        assert_eq!(local_day(&result), ts.with_timezone(&Local).date_naive());
    }
}
