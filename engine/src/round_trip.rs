//! Recording and replay properties that hold across generator variants.

use crate::generator::{DecisionContext, DecisionGenerator};
use crate::generators::{
    GaffAuthoringGenerator, LiveGenerator, PersistentInitGenerator, PlayerSelectionGenerator,
    SceneInitGenerator, StreamReplayGenerator,
};
use crate::recorder::RecordingGenerator;
use crate::rng::RandSource;
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use spindle_types::{PlayerSelection, SelectionScope};
use std::collections::BTreeMap;

fn rng(seed: u64) -> RandSource<StdRng> {
    RandSource(StdRng::seed_from_u64(seed))
}

/// A fixed decision sequence exercising every call shape, flattening the
/// realized values so two runs can be compared.
fn drive(generator: &mut dyn DecisionGenerator) -> Vec<u64> {
    let mut trace = Vec::new();
    trace.push(
        generator
            .get_decision(3, 7, DecisionContext::Key("base:respin"))
            .unwrap() as u64,
    );
    trace.extend(
        generator
            .choose_indexes(10, 3, false, DecisionContext::Key("base:reels"))
            .unwrap(),
    );
    trace.extend(
        generator
            .choose_weighted(&[4, 0, 2, 9], 2, true, DecisionContext::Key("base:symbols"))
            .unwrap(),
    );
    trace.extend(
        generator
            .pick_indexes(10, 1, 4, false, DecisionContext::Key("bonus:pick_gems"))
            .unwrap(),
    );
    trace
}

/// Record a drive through `inner`, then drive a stream replay of the log and
/// check the realized values match.
fn assert_replay_reproduces(inner: Box<dyn DecisionGenerator + '_>) {
    let mut recorder = RecordingGenerator::new(inner);
    let original = drive(&mut recorder);
    let mut replay = StreamReplayGenerator::new(recorder.into_log());
    assert_eq!(drive(&mut replay), original);
}

fn gem_selection() -> BTreeMap<String, PlayerSelection> {
    let mut map = BTreeMap::new();
    map.insert(
        "bonus:pick_gems".to_string(),
        PlayerSelection {
            scope: SelectionScope::Cycle,
            indexes: vec![3, 1],
        },
    );
    map
}

#[test]
fn live_recordings_replay() {
    for seed in 0..32 {
        assert_replay_reproduces(Box::new(PlayerSelectionGenerator::new(
            LiveGenerator::new(rng(seed)),
            gem_selection(),
        )));
    }
}

#[test]
fn scene_init_recordings_replay() {
    let guided = PlayerSelectionGenerator::new(SceneInitGenerator, gem_selection());
    assert_replay_reproduces(Box::new(guided));
}

#[test]
fn persistent_init_recordings_replay() {
    assert_replay_reproduces(Box::new(PersistentInitGenerator::new(rng(11))));
}

#[test]
fn gaff_authored_recordings_replay() {
    assert_replay_reproduces(Box::new(GaffAuthoringGenerator::new(LiveGenerator::new(
        rng(17),
    ))));
}

#[test]
fn replayed_streams_re_record_identically() {
    // Recording a replay yields the original stream back.
    let mut recorder = RecordingGenerator::new(Box::new(PlayerSelectionGenerator::new(
        LiveGenerator::new(rng(23)),
        gem_selection(),
    )));
    drive(&mut recorder);
    let stream = recorder.into_log();

    let mut re_recorder =
        RecordingGenerator::new(Box::new(StreamReplayGenerator::new(stream.clone())));
    drive(&mut re_recorder);
    assert_eq!(re_recorder.into_log(), stream);
}

proptest! {
    // Any live draw sequence survives an encode and decode round trip.
    #[test]
    fn live_streams_replay_exactly(
        seed in any::<u64>(),
        true_weight in 1u64..100,
        false_weight in 1u64..100,
        index_count in 4u64..40,
        weights in proptest::collection::vec(1u64..20, 2..8),
        allow_duplicates in any::<bool>(),
    ) {
        let ctx = DecisionContext::Key("prop");
        let mut live = LiveGenerator::new(rng(seed));
        let mut recorder = RecordingGenerator::new(Box::new(&mut live));

        let flag = recorder.get_decision(true_weight, false_weight, ctx).unwrap();
        let picks = recorder
            .choose_indexes(index_count, 3, allow_duplicates, ctx)
            .unwrap();
        let weighted = recorder
            .choose_weighted(&weights, 2, allow_duplicates, ctx)
            .unwrap();
        let variable = recorder
            .pick_indexes(index_count, 0, 3, allow_duplicates, ctx)
            .unwrap();

        let mut replay = StreamReplayGenerator::new(recorder.into_log());
        prop_assert_eq!(
            replay.get_decision(true_weight, false_weight, ctx).unwrap(),
            flag
        );
        prop_assert_eq!(
            replay.choose_indexes(index_count, 3, allow_duplicates, ctx).unwrap(),
            picks
        );
        prop_assert_eq!(
            replay.choose_weighted(&weights, 2, allow_duplicates, ctx).unwrap(),
            weighted
        );
        prop_assert_eq!(
            replay.pick_indexes(index_count, 0, 3, allow_duplicates, ctx).unwrap(),
            variable
        );
    }
}
