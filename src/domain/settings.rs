//! Typed scoring settings.
//!
//! Settings are decoded once at the store boundary into [`ScoringSettings`]
//! and handed to the engine as a plain immutable value.

use crate::domain::{EventType, ParseEnumError};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Settings keys as stored in the key/value settings table.
pub const KEY_POINTS_BASE: &str = "pointsBase";
pub const KEY_MONEY_COEFF: &str = "moneyCoeff";
pub const KEY_MONEY_MODE: &str = "moneyMode";
pub const KEY_DIMINISHING_RETURNS: &str = "diminishingReturns";

pub const SETTINGS_KEYS: [&str; 4] = [
    KEY_POINTS_BASE,
    KEY_MONEY_COEFF,
    KEY_MONEY_MODE,
    KEY_DIMINISHING_RETURNS,
];

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unknown settings key: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl SettingsError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        SettingsError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Unweighted points per unit of participation, per event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasePoints {
    pub paid_live_base: f64,
    pub free_live_base: f64,
    pub paid_stream_base: f64,
    pub youtube_view_base: f64,
}

impl BasePoints {
    /// Base point for an event type; unrecognized types score 0.
    pub fn get(&self, event_type: EventType) -> f64 {
        match event_type {
            EventType::PaidLive => self.paid_live_base,
            EventType::FreeLive => self.free_live_base,
            EventType::PaidStream => self.paid_stream_base,
            EventType::YouTube => self.youtube_view_base,
            EventType::Unrecognized => 0.0,
        }
    }
}

impl Default for BasePoints {
    fn default() -> Self {
        Self {
            paid_live_base: 10.0,
            free_live_base: 5.0,
            paid_stream_base: 3.0,
            youtube_view_base: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyCoefficients {
    pub merch_coeff: f64,
    #[serde(rename = "superchatCoeff", alias = "donationCoeff")]
    pub donation_coeff: f64,
}

impl Default for MoneyCoefficients {
    fn default() -> Self {
        Self {
            merch_coeff: 0.01,
            donation_coeff: 0.02,
        }
    }
}

/// Curve applied to monetary amounts before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoneyMode {
    Linear,
    #[default]
    Sqrt,
    Log,
}

impl MoneyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoneyMode::Linear => "linear",
            MoneyMode::Sqrt => "sqrt",
            MoneyMode::Log => "log",
        }
    }

    /// Lenient decoding: any unknown label degrades to `Linear`.
    pub fn from_label(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!(mode = %s, "Unknown money mode, falling back to linear");
            MoneyMode::Linear
        })
    }
}

impl FromStr for MoneyMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "linear" => Ok(MoneyMode::Linear),
            "sqrt" => Ok(MoneyMode::Sqrt),
            "log" => Ok(MoneyMode::Log),
            other => Err(ParseEnumError {
                kind: "money mode",
                value: other.to_string(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for MoneyMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(MoneyMode::from_label(&label))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiminishingReturns {
    pub enabled: bool,
    /// Decay factor in (0, 1].
    pub rate: f64,
    #[serde(rename = "applyTo", alias = "appliesTo")]
    pub applies_to: Vec<EventType>,
}

impl DiminishingReturns {
    pub fn applies(&self, event_type: EventType) -> bool {
        self.enabled && self.applies_to.contains(&event_type)
    }
}

impl Default for DiminishingReturns {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: 0.9,
            applies_to: vec![
                EventType::PaidLive,
                EventType::FreeLive,
                EventType::PaidStream,
            ],
        }
    }
}

/// Complete settings value for one scoring invocation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringSettings {
    #[serde(rename = "pointsBase")]
    pub base_points: BasePoints,
    #[serde(rename = "moneyCoeff")]
    pub money_coefficients: MoneyCoefficients,
    pub money_mode: MoneyMode,
    pub diminishing_returns: DiminishingReturns,
}

impl ScoringSettings {
    /// Replace one section from its stored JSON value, validating strictly.
    ///
    /// Used on the write path: unknown money modes, non-positive decay rates
    /// and negative weights are rejected here rather than degraded later.
    ///
    /// # Errors
    /// Returns an error for unknown keys or values that fail validation.
    pub fn apply_update(&mut self, key: &str, value: &serde_json::Value) -> Result<(), SettingsError> {
        match key {
            KEY_POINTS_BASE => {
                let points: BasePoints = decode(key, value)?;
                let all = [
                    points.paid_live_base,
                    points.free_live_base,
                    points.paid_stream_base,
                    points.youtube_view_base,
                ];
                if all.iter().any(|p| !p.is_finite() || *p < 0.0) {
                    return Err(SettingsError::invalid(key, "base points must be >= 0"));
                }
                self.base_points = points;
            }
            KEY_MONEY_COEFF => {
                let coeff: MoneyCoefficients = decode(key, value)?;
                if [coeff.merch_coeff, coeff.donation_coeff]
                    .iter()
                    .any(|c| !c.is_finite() || *c < 0.0)
                {
                    return Err(SettingsError::invalid(key, "coefficients must be >= 0"));
                }
                self.money_coefficients = coeff;
            }
            KEY_MONEY_MODE => {
                let label = value
                    .as_str()
                    .ok_or_else(|| SettingsError::invalid(key, "expected a string"))?;
                self.money_mode = label
                    .parse()
                    .map_err(|e: ParseEnumError| SettingsError::invalid(key, e.to_string()))?;
            }
            KEY_DIMINISHING_RETURNS => {
                let dr: DiminishingReturns = decode(key, value)?;
                if !(dr.rate > 0.0 && dr.rate <= 1.0) {
                    return Err(SettingsError::invalid(key, "rate must be in (0, 1]"));
                }
                if dr.applies_to.contains(&EventType::Unrecognized) {
                    return Err(SettingsError::invalid(key, "applyTo contains an unknown event type"));
                }
                self.diminishing_returns = dr;
            }
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Stored JSON value for one section.
    pub fn section_value(&self, key: &str) -> Option<serde_json::Value> {
        let value = match key {
            KEY_POINTS_BASE => serde_json::to_value(&self.base_points),
            KEY_MONEY_COEFF => serde_json::to_value(&self.money_coefficients),
            KEY_MONEY_MODE => serde_json::to_value(self.money_mode),
            KEY_DIMINISHING_RETURNS => serde_json::to_value(&self.diminishing_returns),
            _ => return None,
        };
        value.ok()
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    key: &str,
    value: &serde_json::Value,
) -> Result<T, SettingsError> {
    serde_json::from_value(value.clone()).map_err(|e| SettingsError::invalid(key, e.to_string()))
}
