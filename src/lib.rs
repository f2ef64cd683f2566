pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod import;
pub mod report;

pub use config::Config;
pub use db::{init_db, seed_defaults, Repository};
pub use domain::{
    Area, AreaMultiplier, AreaMultiplierTable, Decimal, EventRecord, EventType, Fan, FanId,
    ScoringSettings, TierDefinition,
};
pub use engine::{FanScoreResult, RankedResult};
pub use error::AppError;
