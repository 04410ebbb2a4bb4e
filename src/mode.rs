use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The three test modes. Adding one means a new engine and a new benchmark table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TestMode {
    Reaction,
    Target,
    Sequence,
}

impl TestMode {
    pub const ALL: [TestMode; 3] = [TestMode::Reaction, TestMode::Target, TestMode::Sequence];

    /// Human readable title used in headers and tables
    pub fn title(&self) -> &'static str {
        match self {
            TestMode::Reaction => "Reaction Time",
            TestMode::Target => "Target Click",
            TestMode::Sequence => "Number Sequence",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            TestMode::Reaction => 0,
            TestMode::Target => 1,
            TestMode::Sequence => 2,
        }
    }

    pub fn next(&self) -> TestMode {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> TestMode {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}
