//! Domain types for fan engagement scoring.
//!
//! This module provides:
//! - Lossless monetary amounts via the Decimal wrapper
//! - Domain primitives: FanId, Area, EventType
//! - Participation records, fans, tiers and the area multiplier table
//! - Typed scoring settings with their stored defaults
//! - Stable chronological record ordering

pub mod decimal;
pub mod event;
pub mod fan;
pub mod multiplier;
pub mod ordering;
pub mod primitives;
pub mod settings;
pub mod tier;

pub use decimal::Decimal;
pub use event::{effective_venue, EventRecord};
pub use fan::Fan;
pub use multiplier::{AreaMultiplier, AreaMultiplierTable};
pub use ordering::{sort_records_chronological, RecordOrderingKey};
pub use primitives::{Area, EventType, FanId, ParseEnumError};
pub use settings::{
    BasePoints, DiminishingReturns, MoneyCoefficients, MoneyMode, ScoringSettings, SettingsError,
};
pub use tier::{TierBenefit, TierDefinition, TierSummary};
