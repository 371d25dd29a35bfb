//! crates/toffee_core/src/prioritize.rs
//!
//! Ranks a flashcard deck so struggling and never-seen cards surface
//! first. Pure function; the review session applies it once when a pass
//! begins.

use std::collections::HashMap;

use crate::domain::CardStat;

/// A card paired with its position in the source deck and its computed
/// struggle score. The original index is the card's stable identity:
/// stats are keyed by it, and display reordering never renumbers them.
#[derive(Debug, Clone)]
pub struct RankedCard<T> {
    pub card: T,
    pub original_index: usize,
    pub score: f64,
}

/// Laplace-smoothed struggle ratio in `(0, 1]`. A card that has never
/// been viewed scores `1.0` and sorts first.
pub fn struggle_score(stat: &CardStat) -> f64 {
    if stat.views == 0 {
        1.0
    } else {
        f64::from(stat.hard + 1) / f64::from(stat.views + 2)
    }
}

/// Orders `cards` by descending struggle score. Stat entries for indices
/// outside the deck are ignored; absent entries mean a never-seen card.
/// The sort is stable, so ties keep their original relative order.
pub fn prioritize<T>(cards: Vec<T>, stats: &HashMap<usize, CardStat>) -> Vec<RankedCard<T>> {
    let mut ranked: Vec<RankedCard<T>> = cards
        .into_iter()
        .enumerate()
        .map(|(i, card)| {
            let stat = stats.get(&i).copied().unwrap_or_default();
            RankedCard {
                card,
                original_index: i,
                score: struggle_score(&stat),
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}
