use crate::domain::model::{Leaderboard, RecipeRef, LEADERBOARD_SIZE};

/// Merges a household's stored leaderboard with freshly ranked candidates.
///
/// `candidates` must be ordered by live cook count, highest first. Heads are
/// compared pairwise: a shared head is taken once, otherwise the candidate
/// wins when its cook count is at least the stored entry's. Whatever room is
/// left afterwards is filled from the remaining candidates. The result keeps
/// acceptance order.
pub fn merge_popular_recipes(current: &Leaderboard, candidates: &Leaderboard) -> Leaderboard {
    let current = current.entries();
    let candidates = candidates.entries();

    if candidates.is_empty() {
        return Leaderboard::from_merged(current.to_vec());
    }

    let mut merged: Vec<RecipeRef> = Vec::with_capacity(LEADERBOARD_SIZE);
    let (mut ci, mut si) = (0, 0);

    while ci < candidates.len() && si < current.len() && merged.len() < LEADERBOARD_SIZE {
        let candidate = candidates[ci];
        let stored = current[si];

        if candidate.id == stored.id {
            merged.push(candidate);
            ci += 1;
            si += 1;
        } else if candidate.cook_count >= stored.cook_count {
            merged.push(candidate);
            ci += 1;
        } else {
            merged.push(stored);
            si += 1;
        }
    }

    let room = LEADERBOARD_SIZE - merged.len();
    merged.extend(candidates[ci..].iter().copied().take(room));

    Leaderboard::from_merged(merged)
}
