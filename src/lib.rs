// Library surface for the binary, headless/integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod benchmark;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod logging;
pub mod mode;
pub mod record;
pub mod runtime;
pub mod stats;
pub mod store;
pub mod training;
pub mod ui;
pub mod util;

pub use app::{App, AppOptions, Flow, View};
pub use mode::TestMode;
pub use record::{GameResult, LeaderboardEntry};
