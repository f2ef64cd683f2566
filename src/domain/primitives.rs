//! Domain primitives: FanId, Area, EventType.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a label does not name a known enum member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Stable fan identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FanId(pub String);

impl FanId {
    /// Create a FanId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        FanId(id.into())
    }

    /// Fresh random identifier.
    pub fn generate() -> Self {
        FanId(uuid::Uuid::new_v4().to_string())
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geographic area of a venue or a fan's residence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Area {
    Kobe,
    Osaka,
    Nara,
    Tokyo,
    Mito,
    Shikoku,
    Other,
    Online,
}

impl Area {
    pub const ALL: [Area; 8] = [
        Area::Kobe,
        Area::Osaka,
        Area::Nara,
        Area::Tokyo,
        Area::Mito,
        Area::Shikoku,
        Area::Other,
        Area::Online,
    ];

    /// Canonical upper-case code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Kobe => "KOBE",
            Area::Osaka => "OSAKA",
            Area::Nara => "NARA",
            Area::Tokyo => "TOKYO",
            Area::Mito => "MITO",
            Area::Shikoku => "SHIKOKU",
            Area::Other => "OTHER",
            Area::Online => "ONLINE",
        }
    }

    /// Whether a fan can reside here. Everything except `ONLINE`.
    pub fn is_physical(&self) -> bool {
        !matches!(self, Area::Online)
    }

    /// Areas a fan may live in.
    pub fn physical() -> impl Iterator<Item = Area> {
        Self::ALL.into_iter().filter(Area::is_physical)
    }
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Area {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Area::ALL
            .into_iter()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| ParseEnumError::new("area", s))
    }
}

/// Category of fan participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventType {
    PaidLive,
    FreeLive,
    PaidStream,
    YouTube,
    /// Any label the scoring engine does not know. Scores a base point of 0.
    #[serde(other)]
    Unrecognized,
}

impl EventType {
    pub const KNOWN: [EventType; 4] = [
        EventType::PaidLive,
        EventType::FreeLive,
        EventType::PaidStream,
        EventType::YouTube,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PaidLive => "PaidLive",
            EventType::FreeLive => "FreeLive",
            EventType::PaidStream => "PaidStream",
            EventType::YouTube => "YouTube",
            EventType::Unrecognized => "Unrecognized",
        }
    }

    /// Streams and video views have no physical venue.
    pub fn is_online(&self) -> bool {
        matches!(self, EventType::PaidStream | EventType::YouTube)
    }

    /// Lenient decoding used for stored rows: unknown labels map to `Unrecognized`.
    pub fn from_label(s: &str) -> Self {
        s.parse().unwrap_or(EventType::Unrecognized)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::KNOWN
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| ParseEnumError::new("event type", s))
    }
}
