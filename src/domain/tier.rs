//! Reward tier definitions.

use serde::{Deserialize, Serialize};

/// A perk unlocked by a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierBenefit {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub sort_order: i64,
}

/// A named reward bracket unlocked once a cumulative score reaches `min_score`.
///
/// Lower `sort_order` means a higher tier; whoever configures tiers keeps
/// `sort_order` and `min_score` co-varying. The classifier does not check it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierDefinition {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub color: String,
    pub icon: String,
    pub min_score: f64,
    pub sort_order: i64,
    pub description: Option<String>,
    #[serde(default)]
    pub benefits: Vec<TierBenefit>,
}

/// Display-only projection of a tier attached to ranking rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierSummary {
    pub name: String,
    pub slug: String,
    pub color: String,
    pub icon: String,
}

impl From<&TierDefinition> for TierSummary {
    fn from(tier: &TierDefinition) -> Self {
        Self {
            name: tier.name.clone(),
            slug: tier.slug.clone(),
            color: tier.color.clone(),
            icon: tier.icon.clone(),
        }
    }
}
