use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::mode::TestMode;
use crate::record::GameResult;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    mode: TestMode,
    time: u64,
    date: String,
    tier: &'a str,
}

/// Write `history` as `mode,time,date,tier` rows, header first.
pub fn write_csv<W: Write>(history: &[GameResult], out: W) -> Result<usize, csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for result in history {
        writer.serialize(CsvRow {
            mode: result.mode,
            time: result.time,
            date: result.timestamp.to_rfc3339(),
            tier: result.tier().label,
        })?;
    }
    writer.flush()?;
    Ok(history.len())
}

pub fn export_csv(history: &[GameResult], path: &Path) -> Result<usize, csv::Error> {
    let file = std::fs::File::create(path)?;
    let rows = write_csv(history, file)?;
    log::info!("exported {rows} results to {}", path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn rows_carry_tier_labels() {
        let ts = Utc.with_ymd_and_hms(2026, 5, 1, 8, 30, 0).unwrap();
        let history = vec![
            GameResult::at(TestMode::Reaction, 149, ts),
            GameResult::at(TestMode::Sequence, 30_000, ts),
        ];

        let mut buf = vec![];
        let rows = write_csv(&history, &mut buf).unwrap();

        assert_eq!(rows, 2);
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "mode,time,date,tier");
        assert_eq!(lines[1], "reaction,149,2026-05-01T08:30:00+00:00,Incredible");
        assert_eq!(lines[2], "sequence,30000,2026-05-01T08:30:00+00:00,Sleepy");
    }

    #[test]
    fn empty_history_writes_nothing() {
        let mut buf = vec![];
        assert_eq!(write_csv(&[], &mut buf).unwrap(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let history = vec![GameResult::new(TestMode::Target, 512)];

        assert_eq!(export_csv(&history, &path).unwrap(), 1);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("mode,time,date,tier\ntarget,512,"));
    }
}
