//! Directed (origin, destination) area multiplier table.

use crate::domain::Area;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One stored multiplier row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaMultiplier {
    pub id: String,
    pub from_area: Area,
    pub to_area: Area,
    pub multiplier: f64,
}

/// Directed lookup table. Not assumed symmetric; a missing pair is valid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AreaMultiplierTable {
    entries: HashMap<(Area, Area), f64>,
}

impl AreaMultiplierTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, from: Area, to: Area, multiplier: f64) {
        self.entries.insert((from, to), multiplier);
    }

    pub fn with(mut self, from: Area, to: Area, multiplier: f64) -> Self {
        self.insert(from, to, multiplier);
        self
    }

    /// Raw table entry, without any override.
    pub fn get(&self, from: Area, to: Area) -> Option<f64> {
        self.entries.get(&(from, to)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The seeded table: neutral same-area and online pairs plus symmetric travel pairs.
    pub fn default_table() -> Self {
        default_pairs().into_iter().collect()
    }
}

impl FromIterator<(Area, Area, f64)> for AreaMultiplierTable {
    fn from_iter<I: IntoIterator<Item = (Area, Area, f64)>>(iter: I) -> Self {
        let mut table = AreaMultiplierTable::new();
        for (from, to, multiplier) in iter {
            table.insert(from, to, multiplier);
        }
        table
    }
}

impl<'a> FromIterator<&'a AreaMultiplier> for AreaMultiplierTable {
    fn from_iter<I: IntoIterator<Item = &'a AreaMultiplier>>(iter: I) -> Self {
        iter.into_iter()
            .map(|m| (m.from_area, m.to_area, m.multiplier))
            .collect()
    }
}

const TRAVEL_PAIRS: [(Area, Area, f64); 21] = [
    (Area::Kobe, Area::Osaka, 1.2),
    (Area::Kobe, Area::Nara, 1.2),
    (Area::Kobe, Area::Shikoku, 1.35),
    (Area::Kobe, Area::Tokyo, 1.6),
    (Area::Kobe, Area::Mito, 1.7),
    (Area::Kobe, Area::Other, 1.3),
    (Area::Osaka, Area::Nara, 1.1),
    (Area::Osaka, Area::Shikoku, 1.25),
    (Area::Osaka, Area::Tokyo, 1.5),
    (Area::Osaka, Area::Mito, 1.6),
    (Area::Osaka, Area::Other, 1.25),
    (Area::Nara, Area::Shikoku, 1.3),
    (Area::Nara, Area::Tokyo, 1.5),
    (Area::Nara, Area::Mito, 1.6),
    (Area::Nara, Area::Other, 1.25),
    (Area::Tokyo, Area::Shikoku, 1.5),
    (Area::Tokyo, Area::Mito, 1.15),
    (Area::Tokyo, Area::Other, 1.2),
    (Area::Mito, Area::Shikoku, 1.6),
    (Area::Mito, Area::Other, 1.3),
    (Area::Shikoku, Area::Other, 1.3),
];

/// Every seeded `(from, to, multiplier)` row.
pub fn default_pairs() -> Vec<(Area, Area, f64)> {
    let mut pairs: Vec<(Area, Area, f64)> = Area::physical().map(|a| (a, a, 1.0)).collect();
    pairs.extend(Area::ALL.into_iter().map(|a| (a, Area::Online, 1.0)));
    pairs.extend(Area::physical().map(|a| (Area::Online, a, 1.0)));
    for (a, b, m) in TRAVEL_PAIRS {
        pairs.push((a, b, m));
        pairs.push((b, a, m));
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_directed() {
        let table = AreaMultiplierTable::new().with(Area::Kobe, Area::Tokyo, 1.6);
        assert_eq!(table.get(Area::Kobe, Area::Tokyo), Some(1.6));
        assert_eq!(table.get(Area::Tokyo, Area::Kobe), None);
    }

    #[test]
    fn test_default_table_is_symmetric_for_travel_pairs() {
        let table = AreaMultiplierTable::default_table();
        assert_eq!(table.get(Area::Kobe, Area::Mito), Some(1.7));
        assert_eq!(table.get(Area::Mito, Area::Kobe), Some(1.7));
        assert_eq!(table.get(Area::Osaka, Area::Osaka), Some(1.0));
        assert_eq!(table.get(Area::Online, Area::Online), Some(1.0));
    }

    #[test]
    fn test_default_pairs_count() {
        // 7 same-area + 8 into ONLINE + 7 out of ONLINE + 21 symmetric pairs
        assert_eq!(default_pairs().len(), 7 + 8 + 7 + 42);
        assert_eq!(AreaMultiplierTable::default_table().len(), 64);
    }

    #[test]
    fn test_table_from_rows() {
        let rows = vec![AreaMultiplier {
            id: "m1".to_string(),
            from_area: Area::Nara,
            to_area: Area::Tokyo,
            multiplier: 1.5,
        }];
        let table: AreaMultiplierTable = rows.iter().collect();
        assert_eq!(table.get(Area::Nara, Area::Tokyo), Some(1.5));
    }
}
