use crate::domain::{Area, AreaMultiplierTable};

/// Neutral multiplier for unknown pairs and online venues.
pub const NEUTRAL_MULTIPLIER: f64 = 1.0;

/// Resolve the travel multiplier from a fan's residence to a venue.
///
/// Online venues always resolve to 1.0, whatever the table says. Pairs absent
/// from the table are neutral.
pub fn resolve_distance_multiplier(from: Area, to: Area, table: &AreaMultiplierTable) -> f64 {
    if to == Area::Online {
        return NEUTRAL_MULTIPLIER;
    }
    table.get(from, to).unwrap_or(NEUTRAL_MULTIPLIER)
}
