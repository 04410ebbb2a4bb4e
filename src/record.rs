use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::benchmark::{classify, Tier};
use crate::mode::TestMode;

/// One completed session. Persisted as `{ "mode", "time", "date" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub mode: TestMode,
    /// Milliseconds
    pub time: u64,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
}

impl GameResult {
    pub fn new(mode: TestMode, time: u64) -> Self {
        Self::at(mode, time, Utc::now())
    }

    pub fn at(mode: TestMode, time: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            mode,
            time,
            timestamp,
        }
    }

    pub fn tier(&self) -> &'static Tier {
        classify(self.mode, self.time)
    }
}

/// A result tagged with whoever set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(flatten)]
    pub result: GameResult,
    #[serde(rename = "playerName")]
    pub player_name: String,
}

impl LeaderboardEntry {
    pub fn new(result: GameResult, player_name: impl Into<String>) -> Self {
        Self {
            result,
            player_name: player_name.into(),
        }
    }

    pub fn mode(&self) -> TestMode {
        self.result.mode
    }

    pub fn time(&self) -> u64 {
        self.result.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn game_result_json_shape() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        let result = GameResult::at(TestMode::Reaction, 231, ts);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["mode"], "reaction");
        assert_eq!(value["time"], 231);
        assert_eq!(value["date"], "2026-03-14T15:09:26Z");
    }

    #[test]
    fn leaderboard_entry_is_flat() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let entry = LeaderboardEntry::new(GameResult::at(TestMode::Target, 410, ts), "ada");

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["mode"], "target");
        assert_eq!(value["time"], 410);
        assert_eq!(value["playerName"], "ada");
        assert!(value.get("result").is_none());

        let back: LeaderboardEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn reads_browser_style_iso_dates() {
        let json = r#"{"mode":"sequence","time":15234,"date":"2025-11-02T18:22:10.123Z"}"#;
        let result: GameResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.mode, TestMode::Sequence);
        assert_eq!(result.time, 15234);
        assert_eq!(result.tier().label, "Average");
    }
}
