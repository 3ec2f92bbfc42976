//! Decision-to-stream encoding.
//!
//! Converts realized decisions into canonical `u64` stream values. The
//! canonical form is stable irrespective of which concrete candidates were
//! chosen, which is what makes a recorded stream replayable against a
//! different candidate population of the same size.
//!
//! The inverse mapping lives in the stream-replay generator; this module
//! only encodes. The recorder shares these helpers so its log is
//! byte-compatible with [`encode_decision`] output.
//!
//! The weighted and unweighted no-duplicate paths are deliberately distinct
//! encodings: weighted emits the cumulative weight of lower unused indexes,
//! unweighted emits the pick's rank within the remaining candidates.

use spindle_types::{Decision, DecisionDef, DecisionResult};

/// Encode a boolean decision. `true` emits `0`; `false` emits the weight of
/// the branch not taken, which lets a decoder recover the result by
/// comparing the value against `true_weight`.
pub fn encode_flag(true_weight: u64, result: bool, out: &mut Vec<u64>) {
    out.push(if result { 0 } else { true_weight });
}

/// Encode a weighted index selection: for each realized index, the
/// cumulative weight of all lower indexes still in play ("lower boundary").
///
/// With duplicates disallowed, previously realized indexes drop out of the
/// boundary sum for subsequent picks (sampling without replacement). With
/// duplicates allowed, boundaries are computed against the full set every
/// time.
pub fn encode_weighted(weights: &[u64], allow_duplicates: bool, picks: &[u64], out: &mut Vec<u64>) {
    let mut used: Vec<u64> = Vec::new();
    for &pick in picks {
        let mut boundary = 0u64;
        for (index, &weight) in weights.iter().enumerate() {
            let index = index as u64;
            if index >= pick {
                break;
            }
            if allow_duplicates || !used.contains(&index) {
                boundary += weight;
            }
        }
        out.push(boundary);
        if !allow_duplicates {
            used.push(pick);
        }
    }
}

/// Encode an unweighted index selection.
///
/// With duplicates allowed, indexes are emitted verbatim. Otherwise each
/// realized index is shifted down by the number of distinct prior realized
/// indexes numerically below it, yielding its rank within the remaining
/// candidates.
pub fn encode_unweighted(allow_duplicates: bool, picks: &[u64], out: &mut Vec<u64>) {
    if allow_duplicates {
        out.extend_from_slice(picks);
        return;
    }
    let mut used: Vec<u64> = Vec::new();
    for &pick in picks {
        let below = used.iter().filter(|&&prior| prior < pick).count() as u64;
        out.push(pick - below);
        used.push(pick);
    }
}

/// Encode a variable-count selection: the realized count beyond `min_count`
/// first, then the selection under the unweighted rule.
pub fn encode_picks(min_count: u64, allow_duplicates: bool, picks: &[u64], out: &mut Vec<u64>) {
    out.push(picks.len() as u64 - min_count);
    encode_unweighted(allow_duplicates, picks, out);
}

/// Encode one realized decision, appending its canonical values to `out`.
/// A cycle encodes many decisions into one stream, in evaluation order.
pub fn encode_decision(decision: &Decision, out: &mut Vec<u64>) {
    match (decision.def(), decision.result()) {
        (DecisionDef::Simple { true_weight }, DecisionResult::Flag(flag)) => {
            encode_flag(*true_weight, *flag, out)
        }
        (
            DecisionDef::WeightsIndexes {
                weights,
                allow_duplicates,
            },
            DecisionResult::Indexes(picks),
        )
        | (
            DecisionDef::WeightedIndexes {
                weights,
                allow_duplicates,
            },
            DecisionResult::Indexes(picks),
        ) => encode_weighted(weights, *allow_duplicates, picks, out),
        (
            DecisionDef::Indexes {
                allow_duplicates, ..
            },
            DecisionResult::Indexes(picks),
        ) => encode_unweighted(*allow_duplicates, picks, out),
        (
            DecisionDef::PickIndexes {
                min_count,
                allow_duplicates,
                ..
            },
            DecisionResult::Indexes(picks),
        ) => encode_picks(*min_count, *allow_duplicates, picks, out),
        // Shape mismatches are rejected by Decision::new.
        _ => unreachable!("decision result shape validated at construction"),
    }
}
