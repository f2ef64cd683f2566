use super::{FanScoreResult, RankedResult};

/// Sort results by `total_score` descending.
///
/// The sort is stable, so exact ties keep the order `calculate` produced
/// (first appearance of each fan in the batch).
pub fn sort_by_total_desc(results: &mut [FanScoreResult]) {
    results.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
}

/// Assign competition ranks ("1224" style) to results already sorted by
/// `total_score` descending.
///
/// An entry tied with its predecessor shares its rank; any other entry is
/// ranked by its 1-based position.
pub fn assign_ranks(sorted: Vec<FanScoreResult>) -> Vec<RankedResult> {
    let mut ranked: Vec<RankedResult> = Vec::with_capacity(sorted.len());
    for (idx, result) in sorted.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some(prev) if prev.result.total_score == result.total_score => prev.rank,
            _ => idx as u32 + 1,
        };
        ranked.push(RankedResult { rank, result });
    }
    ranked
}

/// Sort then rank.
pub fn rank_results(mut results: Vec<FanScoreResult>) -> Vec<RankedResult> {
    sort_by_total_desc(&mut results);
    assign_ranks(results)
}
