use crate::domain::TierDefinition;
use std::cmp::Ordering;

/// Highest tier whose `min_score` the score reaches (inclusive).
///
/// Returns `None` when the score is below every threshold.
pub fn determine_tier(score: f64, tiers: &[TierDefinition]) -> Option<&TierDefinition> {
    let mut sorted: Vec<&TierDefinition> = tiers.iter().collect();
    sorted.sort_by(|a, b| by_min_score_desc(a, b));
    sorted.into_iter().find(|t| t.min_score <= score)
}

/// The tier one step above `current` in `sort_order` order.
///
/// With no current tier, returns the entry tier (lowest `min_score`, then
/// lowest `sort_order`). Returns `None` at the top, or when `current` is not
/// part of `tiers`.
pub fn get_next_tier<'a>(
    current: Option<&TierDefinition>,
    tiers: &'a [TierDefinition],
) -> Option<&'a TierDefinition> {
    let Some(current) = current else {
        return tiers.iter().min_by(|a, b| {
            a.min_score
                .total_cmp(&b.min_score)
                .then_with(|| a.sort_order.cmp(&b.sort_order))
        });
    };

    let mut sorted: Vec<&TierDefinition> = tiers.iter().collect();
    sorted.sort_by_key(|t| t.sort_order);
    let idx = sorted.iter().position(|t| t.id == current.id)?;
    idx.checked_sub(1).map(|prev| sorted[prev])
}

/// Percentage progress from `current` toward `next`, clamped to [0, 100].
///
/// 100 at the top tier (no next), 0 with no current tier, and 100 when the
/// thresholds are equal or inverted.
pub fn calculate_tier_progress(
    score: f64,
    current: Option<&TierDefinition>,
    next: Option<&TierDefinition>,
) -> f64 {
    let Some(next) = next else {
        return 100.0;
    };
    let Some(current) = current else {
        return 0.0;
    };
    let range = next.min_score - current.min_score;
    if range <= 0.0 {
        return 100.0;
    }
    (((score - current.min_score) / range) * 100.0).clamp(0.0, 100.0)
}

fn by_min_score_desc(a: &TierDefinition, b: &TierDefinition) -> Ordering {
    b.min_score.total_cmp(&a.min_score)
}

/// Where a score sits on the tier ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct TierStanding<'a> {
    pub current: Option<&'a TierDefinition>,
    pub next: Option<&'a TierDefinition>,
    pub progress: f64,
}

/// Tier list pre-sorted once for classifying many scores.
///
/// Behaves exactly like [`determine_tier`] / [`get_next_tier`] without
/// re-sorting on every call.
#[derive(Debug, Clone)]
pub struct TierLadder<'a> {
    by_min_score_desc: Vec<&'a TierDefinition>,
    /// Top tier first.
    by_sort_order: Vec<&'a TierDefinition>,
    entry: Option<&'a TierDefinition>,
}

impl<'a> TierLadder<'a> {
    pub fn new(tiers: &'a [TierDefinition]) -> Self {
        let mut by_min_score = tiers.iter().collect::<Vec<_>>();
        by_min_score.sort_by(|a, b| by_min_score_desc(a, b));

        let mut by_sort_order = tiers.iter().collect::<Vec<_>>();
        by_sort_order.sort_by_key(|t| t.sort_order);

        Self {
            by_min_score_desc: by_min_score,
            by_sort_order,
            entry: get_next_tier(None, tiers),
        }
    }

    pub fn determine(&self, score: f64) -> Option<&'a TierDefinition> {
        self.by_min_score_desc
            .iter()
            .copied()
            .find(|t| t.min_score <= score)
    }

    /// Same answer as [`get_next_tier`], from the pre-sorted view.
    pub fn next_above(&self, current: Option<&TierDefinition>) -> Option<&'a TierDefinition> {
        let Some(current) = current else {
            return self.entry;
        };
        let idx = self.by_sort_order.iter().position(|t| t.id == current.id)?;
        idx.checked_sub(1).map(|prev| self.by_sort_order[prev])
    }

    pub fn standing(&self, score: f64) -> TierStanding<'a> {
        let current = self.determine(score);
        let next = self.next_above(current);
        TierStanding {
            current,
            next,
            progress: calculate_tier_progress(score, current, next),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(id: &str, min_score: f64, sort_order: i64) -> TierDefinition {
        TierDefinition {
            id: id.to_string(),
            name: id.to_uppercase(),
            slug: id.to_string(),
            color: "#000000".to_string(),
            icon: "star".to_string(),
            min_score,
            sort_order,
            description: None,
            benefits: vec![],
        }
    }

    fn ladder() -> Vec<TierDefinition> {
        vec![
            tier("bronze", 0.0, 3),
            tier("gold", 150.0, 1),
            tier("silver", 50.0, 2),
        ]
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let tiers = ladder();
        assert_eq!(determine_tier(50.0, &tiers).unwrap().id, "silver");
        assert_eq!(determine_tier(49.99, &tiers).unwrap().id, "bronze");
        assert_eq!(determine_tier(1000.0, &tiers).unwrap().id, "gold");
    }

    #[test]
    fn test_no_qualifying_tier() {
        let tiers = vec![tier("silver", 50.0, 2), tier("gold", 150.0, 1)];
        assert!(determine_tier(10.0, &tiers).is_none());
        assert!(determine_tier(10.0, &[]).is_none());
    }

    #[test]
    fn test_next_tier_moves_up() {
        let tiers = ladder();
        let bronze = &tiers[0];
        let silver = &tiers[2];
        let gold = &tiers[1];
        assert_eq!(get_next_tier(Some(bronze), &tiers).unwrap().id, "silver");
        assert_eq!(get_next_tier(Some(silver), &tiers).unwrap().id, "gold");
        assert!(get_next_tier(Some(gold), &tiers).is_none());
    }

    #[test]
    fn test_next_tier_without_current_is_entry_tier() {
        let tiers = vec![tier("silver", 50.0, 2), tier("gold", 150.0, 1)];
        assert_eq!(get_next_tier(None, &tiers).unwrap().id, "silver");
        assert!(get_next_tier(None, &[]).is_none());
    }

    #[test]
    fn test_next_tier_for_foreign_tier_is_none() {
        let tiers = ladder();
        let stranger = tier("platinum", 500.0, 0);
        assert!(get_next_tier(Some(&stranger), &tiers).is_none());
    }

    #[test]
    fn test_progress_interpolates() {
        let current = tier("silver", 50.0, 2);
        let next = tier("gold", 150.0, 1);
        assert_eq!(calculate_tier_progress(100.0, Some(&current), Some(&next)), 50.0);
        assert_eq!(calculate_tier_progress(400.0, Some(&current), Some(&next)), 100.0);
        assert_eq!(calculate_tier_progress(0.0, Some(&current), Some(&next)), 0.0);
    }

    #[test]
    fn test_progress_edge_cases() {
        let current = tier("silver", 50.0, 2);
        let same = tier("silver-2", 50.0, 1);
        assert_eq!(calculate_tier_progress(60.0, Some(&current), None), 100.0);
        assert_eq!(calculate_tier_progress(60.0, None, Some(&current)), 0.0);
        assert_eq!(calculate_tier_progress(60.0, Some(&current), Some(&same)), 100.0);
    }

    #[test]
    fn test_ladder_matches_free_functions() {
        let tiers = ladder();
        let ladder = TierLadder::new(&tiers);
        for score in [-1.0, 0.0, 49.0, 50.0, 100.0, 150.0, 999.0] {
            assert_eq!(
                ladder.determine(score).map(|t| &t.id),
                determine_tier(score, &tiers).map(|t| &t.id)
            );
        }

        let standing = ladder.standing(100.0);
        assert_eq!(standing.current.unwrap().id, "silver");
        assert_eq!(standing.next.unwrap().id, "gold");
        assert_eq!(standing.progress, 50.0);
    }

    #[test]
    fn test_ladder_next_matches_get_next_tier() {
        let tiers = ladder();
        let stranger = tier("platinum", 500.0, 0);
        let ladder = TierLadder::new(&tiers);

        let mut candidates: Vec<Option<&TierDefinition>> = tiers.iter().map(Some).collect();
        candidates.push(None);
        candidates.push(Some(&stranger));
        for current in candidates {
            assert_eq!(
                ladder.next_above(current).map(|t| &t.id),
                get_next_tier(current, &tiers).map(|t| &t.id)
            );
        }

        assert!(TierLadder::new(&[]).next_above(None).is_none());
    }
}
