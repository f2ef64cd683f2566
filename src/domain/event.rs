//! Participation record: one dated event a fan took part in.

use crate::domain::{Area, Decimal, EventType, FanId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single participation record (live attendance, stream, purchase, donation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub date: NaiveDate,
    pub fan_id: FanId,
    pub event_type: EventType,
    pub venue_area: Area,
    /// Number of participations folded into this record.
    pub attend_count: i64,
    /// Merchandise spend.
    pub merch_amount: Decimal,
    /// Donation (super chat) spend.
    pub donation_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl EventRecord {
    /// Create a record with a fresh id and no note.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        fan_id: FanId,
        event_type: EventType,
        venue_area: Area,
        attend_count: i64,
        merch_amount: Decimal,
        donation_amount: Decimal,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            fan_id,
            event_type,
            venue_area: effective_venue(event_type, venue_area),
            attend_count,
            merch_amount,
            donation_amount,
            note: None,
        }
    }

    /// Total money spent on this record.
    pub fn sales_amount(&self) -> Decimal {
        self.merch_amount + self.donation_amount
    }
}

/// Online event types have no physical venue; their venue is always `ONLINE`.
pub fn effective_venue(event_type: EventType, requested: Area) -> Area {
    if event_type.is_online() {
        Area::Online
    } else {
        requested
    }
}
