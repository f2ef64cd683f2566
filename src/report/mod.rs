//! Reports built on top of the scoring engine.
//!
//! Each report takes an already-loaded [`ScoringSnapshot`] (or a slice of it)
//! and stays synchronous; loading is the repository's job.

pub mod fan_score;
pub mod period;
pub mod ranking;
pub mod snapshot;

pub use fan_score::{
    build_fan_score, FanScoreReport, FanScoreWindow, FanStats, MonthlyScore, ScoreBreakdown,
};
pub use period::{InvalidMonth, MonthWindow};
pub use ranking::{build_fan_tiers, build_ranking, RankingEntry, RankingScope};
pub use snapshot::ScoringSnapshot;
