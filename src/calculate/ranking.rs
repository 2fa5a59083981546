//! Standard competition ranking ("1224" ranking).

use crate::models::Ranked;

/// Rank items by descending score.
///
/// Equal scores share a rank and the next distinct score takes its 1-based
/// position, so `[50, 50, 30]` ranks `[1, 1, 3]`. Items with equal scores
/// keep their input order.
pub fn competition_rank<T>(items: Vec<T>, score: impl Fn(&T) -> u32) -> Vec<Ranked<T>> {
    let mut scored: Vec<(u32, T)> = items.into_iter().map(|item| (score(&item), item)).collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut ranked: Vec<Ranked<T>> = Vec::with_capacity(scored.len());
    for (position, (score, item)) in scored.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some(prev) if prev.score == score => prev.rank,
            _ => position as u32 + 1,
        };
        ranked.push(Ranked { rank, score, item });
    }
    ranked
}

/// Ranks for a bare score list, in sorted order.
pub fn ranks_for_scores(scores: &[u32]) -> Vec<u32> {
    competition_rank(scores.to_vec(), |s| *s)
        .into_iter()
        .map(|r| r.rank)
        .collect()
}
