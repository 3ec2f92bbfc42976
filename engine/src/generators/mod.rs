//! Generator variants.
//!
//! One module per source of decision outcomes. All variants implement
//! [`crate::generator::DecisionGenerator`] and are interchangeable at the
//! round driver's discretion.

mod gaff_author;
mod live;
mod persistent_init;
mod replay;
mod scene_init;
mod selection;

pub use gaff_author::GaffAuthoringGenerator;
pub use live::LiveGenerator;
pub use persistent_init::PersistentInitGenerator;
pub use replay::StreamReplayGenerator;
pub use scene_init::SceneInitGenerator;
pub use selection::PlayerSelectionGenerator;

/// Map a rank to the `rank`-th candidate in `0..index_count` that is not in
/// `used`. A rank past the remaining population clamps to the final unused
/// candidate.
pub(crate) fn nth_unused(index_count: u64, used: &[u64], rank: u64) -> u64 {
    let mut remaining = rank;
    let mut last = 0;
    for candidate in 0..index_count {
        if used.contains(&candidate) {
            continue;
        }
        if remaining == 0 {
            return candidate;
        }
        remaining -= 1;
        last = candidate;
    }
    last
}

/// Map a boundary value to the weighted candidate whose bucket contains it,
/// skipping used candidates when duplicates are disallowed. Zero-weight
/// candidates are never selected. A value at or past the eligible total
/// clamps to the final eligible candidate.
pub(crate) fn weighted_at(
    weights: &[u64],
    used: &[u64],
    allow_duplicates: bool,
    value: u64,
) -> u64 {
    let mut boundary = 0u64;
    let mut last = 0u64;
    for (candidate, &weight) in weights.iter().enumerate() {
        let candidate = candidate as u64;
        if !allow_duplicates && used.contains(&candidate) {
            continue;
        }
        if weight == 0 {
            continue;
        }
        if value < boundary + weight {
            return candidate;
        }
        boundary += weight;
        last = candidate;
    }
    last
}

/// Total weight of candidates still eligible for selection.
pub(crate) fn eligible_weight(weights: &[u64], used: &[u64], allow_duplicates: bool) -> u64 {
    weights
        .iter()
        .enumerate()
        .filter(|(candidate, _)| allow_duplicates || !used.contains(&(*candidate as u64)))
        .map(|(_, &weight)| weight)
        .sum()
}
