//! Benchmark tiers: map a measured duration onto a named, colored bracket.
//!
//! Every mode has its own five tier table because the natural scales differ
//! wildly: a single reaction is a few hundred milliseconds while finding all
//! 25 numbers of the sequence grid takes tens of seconds.

use crate::mode::TestMode;

/// A named performance bracket. `upper_bound` is exclusive; `None` is the
/// catch-all tier at the end of every table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    pub label: &'static str,
    pub upper_bound: Option<u64>,
    /// Hex color token, e.g. `#22c55e`
    pub color: &'static str,
}

impl Tier {
    const fn new(label: &'static str, upper_bound: u64, color: &'static str) -> Self {
        Self {
            label,
            upper_bound: Some(upper_bound),
            color,
        }
    }

    const fn catch_all(label: &'static str, color: &'static str) -> Self {
        Self {
            label,
            upper_bound: None,
            color,
        }
    }

    pub fn admits(&self, duration_ms: u64) -> bool {
        self.upper_bound.map_or(true, |bound| duration_ms < bound)
    }
}

const PURPLE: &str = "#a855f7";
const GREEN: &str = "#22c55e";
const YELLOW: &str = "#eab308";
const ORANGE: &str = "#f97316";
const RED: &str = "#ef4444";

const REACTION_TIERS: [Tier; 5] = [
    Tier::new("Incredible", 150, PURPLE),
    Tier::new("Fast", 220, GREEN),
    Tier::new("Average", 300, YELLOW),
    Tier::new("Slow", 400, ORANGE),
    Tier::catch_all("Sleepy", RED),
];

const TARGET_TIERS: [Tier; 5] = [
    Tier::new("Incredible", 350, PURPLE),
    Tier::new("Fast", 500, GREEN),
    Tier::new("Average", 650, YELLOW),
    Tier::new("Slow", 800, ORANGE),
    Tier::catch_all("Sleepy", RED),
];

const SEQUENCE_TIERS: [Tier; 5] = [
    Tier::new("Incredible", 8_000, PURPLE),
    Tier::new("Fast", 12_000, GREEN),
    Tier::new("Average", 18_000, YELLOW),
    Tier::new("Slow", 25_000, ORANGE),
    Tier::catch_all("Sleepy", RED),
];

/// The tier table for a mode, sorted ascending by bound.
pub fn tiers(mode: TestMode) -> &'static [Tier] {
    match mode {
        TestMode::Reaction => &REACTION_TIERS,
        TestMode::Target => &TARGET_TIERS,
        TestMode::Sequence => &SEQUENCE_TIERS,
    }
}

/// First tier whose bound strictly exceeds `duration_ms`. A duration equal to
/// a bound therefore lands in the next tier.
pub fn classify(mode: TestMode, duration_ms: u64) -> &'static Tier {
    let table = tiers(mode);
    table
        .iter()
        .find(|tier| tier.admits(duration_ms))
        .unwrap_or(&table[table.len() - 1])
}

/// Legend entries like `<150ms` and `>400ms`, in table order.
pub fn legend(mode: TestMode) -> Vec<(&'static Tier, String)> {
    let table = tiers(mode);
    let last_bound = table.iter().filter_map(|t| t.upper_bound).last();

    table
        .iter()
        .map(|tier| {
            let range = match (tier.upper_bound, last_bound) {
                (Some(bound), _) => format!("<{bound}ms"),
                (None, Some(prev)) => format!(">{prev}ms"),
                (None, None) => "any".to_string(),
            };
            (tier, range)
        })
        .collect()
}
