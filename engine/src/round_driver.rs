//! Round orchestration.
//!
//! The driver owns the durable [`GameSnapshot`], assembles the generator
//! stack for each cycle, and persists state after every mutation. Three
//! evaluation modes share one code path through [`CycleEvaluator`]: live
//! (fresh randomness, recorded), gaff (an injected stream trialed first),
//! and history (replaying a committed stream with no mutation).

use crate::generator::{DecisionGenerator, GeneratorError};
use crate::generators::{LiveGenerator, PlayerSelectionGenerator, StreamReplayGenerator};
use crate::recorder::{CountingGenerator, RecordingGenerator};
use crate::rng::RngSource;
use crate::state::Nvram;
use anyhow::Context as _;
use bytes::BytesMut;
use commonware_codec::{DecodeExt as _, EncodeSize, Write};
use spindle_types::{
    GameSnapshot, PlayerSelection, SelectionScope, MAX_CARRY_OVER_BYTES, MAX_CONTEXT_LEN,
    MAX_CYCLE_STREAMS, MAX_SELECTIONS, MAX_SELECTION_INDEXES, MAX_STREAM_LEN,
};
use std::fmt;
use tracing::{debug, warn};

/// NVRAM key of the in-progress game.
pub const CURRENT_GAME_KEY: &str = "game/current";
/// NVRAM key of the last completed game.
pub const PREVIOUS_GAME_KEY: &str = "game/previous";

/// The rule engine's view of one cycle: consume decisions from the supplied
/// generator and produce an outcome. Implementations must be re-runnable
/// (a rejected gaff trial is retried against live randomness) and must make
/// the same generator calls in the same order for a given game state.
pub trait CycleEvaluator {
    type Outcome;

    fn evaluate(
        &mut self,
        generator: &mut dyn DecisionGenerator,
    ) -> Result<Self::Outcome, GeneratorError>;
}

/// Failure of a driver operation.
#[derive(Debug)]
pub enum CycleError {
    /// The rule engine's generator usage violated a contract (missing or
    /// out-of-range player selection, or a replay stream exhausted in
    /// history mode).
    Generator(GeneratorError),
    /// A replay was requested for a cycle that was never recorded.
    UnknownCycle { cycle: usize, available: usize },
    /// A mutation would grow the snapshot past what its codec will decode
    /// back. Rejected before any state changes, so the persisted blob
    /// always restores.
    LimitExceeded {
        what: &'static str,
        len: usize,
        max: usize,
    },
    /// NVRAM access or snapshot decode failed.
    Storage(anyhow::Error),
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generator(err) => write!(f, "generator contract violated: {err}"),
            Self::UnknownCycle { cycle, available } => {
                write!(f, "no recorded cycle {cycle} (have {available})")
            }
            Self::LimitExceeded { what, len, max } => {
                write!(f, "{what} length {len} exceeds snapshot limit {max}")
            }
            Self::Storage(err) => write!(f, "storage failure: {err:#}"),
        }
    }
}

impl std::error::Error for CycleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Generator(err) => Some(err),
            Self::UnknownCycle { .. } | Self::LimitExceeded { .. } => None,
            Self::Storage(err) => Some(err.as_ref()),
        }
    }
}

impl From<GeneratorError> for CycleError {
    fn from(err: GeneratorError) -> Self {
        Self::Generator(err)
    }
}

impl From<anyhow::Error> for CycleError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err)
    }
}

/// Orchestrates game rounds over a durable store and an entropy source.
pub struct RoundDriver<S, R> {
    store: S,
    rng: R,
    current: GameSnapshot,
    previous: Option<GameSnapshot>,
    pending_gaff: Option<Vec<u64>>,
    skip_feature: bool,
}

impl<S: Nvram, R: RngSource> RoundDriver<S, R> {
    /// Restore driver state from the store, or start fresh if nothing was
    /// persisted yet.
    pub fn new(store: S, rng: R) -> Result<Self, CycleError> {
        let current = match store.read(CURRENT_GAME_KEY).context("read current game")? {
            Some(blob) => {
                GameSnapshot::decode(blob.as_slice()).context("decode current game")?
            }
            None => GameSnapshot::default(),
        };
        let previous = match store.read(PREVIOUS_GAME_KEY).context("read previous game")? {
            Some(blob) => {
                Some(GameSnapshot::decode(blob.as_slice()).context("decode previous game")?)
            }
            None => None,
        };
        debug!(
            cycles = current.cycle_streams.len(),
            has_previous = previous.is_some(),
            "round driver restored"
        );
        Ok(Self {
            store,
            rng,
            current,
            previous,
            pending_gaff: None,
            skip_feature: false,
        })
    }

    /// Route player-driven picks to deterministic placeholder answers
    /// instead of requiring recorded selections.
    pub fn set_skip_feature(&mut self, skip_feature: bool) {
        self.skip_feature = skip_feature;
    }

    pub fn stake_index(&self) -> u32 {
        self.current.stake_index
    }

    pub fn set_stake_index(&mut self, stake_index: u32) -> Result<(), CycleError> {
        self.current.stake_index = stake_index;
        self.persist_current()
    }

    /// Record a player's choice for a decision context before the cycle that
    /// consumes it runs.
    pub fn record_selection(
        &mut self,
        context: &str,
        indexes: Vec<u64>,
        scope: SelectionScope,
    ) -> Result<(), CycleError> {
        Self::check_limit("selection context", context.len(), MAX_CONTEXT_LEN)?;
        Self::check_limit("selection indexes", indexes.len(), MAX_SELECTION_INDEXES)?;
        if !self.current.selections.contains_key(context) {
            Self::check_limit(
                "selection count",
                self.current.selections.len() + 1,
                MAX_SELECTIONS,
            )?;
        }
        self.current
            .selections
            .insert(context.to_string(), PlayerSelection { scope, indexes });
        self.persist_current()
    }

    pub fn selection(&self, context: &str) -> Option<&PlayerSelection> {
        self.current.selections.get(context)
    }

    pub fn carry_over(&self) -> &[u8] {
        &self.current.carry_over
    }

    /// Store the rule engine's opaque inter-cycle state.
    pub fn set_carry_over(&mut self, carry_over: Vec<u8>) -> Result<(), CycleError> {
        Self::check_limit("carry-over", carry_over.len(), MAX_CARRY_OVER_BYTES)?;
        self.current.carry_over = carry_over;
        self.persist_current()
    }

    /// Stage a decision stream for the next `play_cycle` call. Replaces any
    /// previously staged stream.
    pub fn inject_gaff(&mut self, stream: Vec<u64>) {
        self.pending_gaff = Some(stream);
    }

    pub fn pending_gaff(&self) -> Option<&[u64]> {
        self.pending_gaff.as_deref()
    }

    pub fn cycle_count(&self) -> usize {
        self.current.cycle_streams.len()
    }

    pub fn cycle_stream(&self, cycle: usize) -> Option<&[u64]> {
        self.current.cycle_streams.get(cycle).map(Vec::as_slice)
    }

    /// Archive the finished game and start a new one. The stake index
    /// carries over; selections, carry-over, and recorded cycles do not.
    pub fn begin_game(&mut self) -> Result<(), CycleError> {
        let stake_index = self.current.stake_index;
        let finished = std::mem::take(&mut self.current);
        self.current.stake_index = stake_index;
        self.previous = Some(finished);
        self.pending_gaff = None;
        self.persist_both()
    }

    /// Evaluate the next cycle. A staged gaff stream is trialed first and
    /// must be consumed exactly; on length mismatch or exhaustion the trial
    /// is discarded and the cycle falls back to live randomness. The
    /// committed stream is appended to the game's history and cycle-scoped
    /// selections are cleared.
    pub fn play_cycle<E: CycleEvaluator>(
        &mut self,
        evaluator: &mut E,
    ) -> Result<E::Outcome, CycleError> {
        if let Some(candidate) = self.pending_gaff.take() {
            if let Some(outcome) = Self::trial_gaff(evaluator, &candidate)? {
                debug!(
                    cycle = self.current.cycle_streams.len(),
                    len = candidate.len(),
                    "cycle evaluated from injected stream"
                );
                return self.commit_cycle(candidate, outcome);
            }
        }
        self.play_live(evaluator)
    }

    /// Re-evaluate an already committed cycle of the current game. Does not
    /// mutate driver state; the evaluator must make the same calls it made
    /// when the cycle was recorded.
    pub fn replay_cycle<E: CycleEvaluator>(
        &self,
        evaluator: &mut E,
        cycle: usize,
    ) -> Result<E::Outcome, CycleError> {
        Self::replay_from(evaluator, &self.current.cycle_streams, cycle)
    }

    /// Like [`replay_cycle`](Self::replay_cycle), against the archived
    /// previous game.
    pub fn replay_previous_cycle<E: CycleEvaluator>(
        &self,
        evaluator: &mut E,
        cycle: usize,
    ) -> Result<E::Outcome, CycleError> {
        let streams = self
            .previous
            .as_ref()
            .map(|s| s.cycle_streams.as_slice())
            .unwrap_or(&[]);
        Self::replay_from(evaluator, streams, cycle)
    }

    fn replay_from<E: CycleEvaluator>(
        evaluator: &mut E,
        streams: &[Vec<u64>],
        cycle: usize,
    ) -> Result<E::Outcome, CycleError> {
        let stream = streams.get(cycle).ok_or(CycleError::UnknownCycle {
            cycle,
            available: streams.len(),
        })?;
        debug!(cycle, len = stream.len(), "replaying recorded cycle");
        let mut replay = StreamReplayGenerator::new(stream.clone());
        evaluator.evaluate(&mut replay).map_err(CycleError::Generator)
    }

    /// Trial-evaluate a candidate stream. `Ok(None)` means the candidate was
    /// rejected and the caller should fall back to live randomness; contract
    /// violations other than exhaustion propagate.
    fn trial_gaff<E: CycleEvaluator>(
        evaluator: &mut E,
        candidate: &[u64],
    ) -> Result<Option<E::Outcome>, CycleError> {
        let replay = StreamReplayGenerator::new(candidate.to_vec());
        let mut counting = CountingGenerator::new(replay);
        match evaluator.evaluate(&mut counting) {
            Ok(outcome) => {
                let consumed = counting.consumed();
                if consumed == candidate.len() {
                    Ok(Some(outcome))
                } else {
                    warn!(
                        consumed,
                        supplied = candidate.len(),
                        "injected stream length mismatch, falling back to live"
                    );
                    Ok(None)
                }
            }
            Err(GeneratorError::StreamExhausted { cursor, len }) => {
                warn!(cursor, len, "injected stream exhausted, falling back to live");
                Ok(None)
            }
            Err(err) => Err(CycleError::Generator(err)),
        }
    }

    fn play_live<E: CycleEvaluator>(
        &mut self,
        evaluator: &mut E,
    ) -> Result<E::Outcome, CycleError> {
        let selections = self.current.selections.clone();
        let live = LiveGenerator::new(&mut self.rng);
        let guided =
            PlayerSelectionGenerator::new(live, selections).with_skip_feature(self.skip_feature);
        let mut recorder = RecordingGenerator::new(Box::new(guided));
        let outcome = evaluator
            .evaluate(&mut recorder)
            .map_err(CycleError::Generator)?;
        let stream = recorder.into_log();
        debug!(
            cycle = self.current.cycle_streams.len(),
            len = stream.len(),
            "cycle evaluated live"
        );
        self.commit_cycle(stream, outcome)
    }

    fn commit_cycle<T>(&mut self, stream: Vec<u64>, outcome: T) -> Result<T, CycleError> {
        Self::check_limit("cycle stream", stream.len(), MAX_STREAM_LEN)?;
        Self::check_limit(
            "cycle count",
            self.current.cycle_streams.len() + 1,
            MAX_CYCLE_STREAMS,
        )?;
        self.current.cycle_streams.push(stream);
        self.current.clear_selections(SelectionScope::Cycle);
        self.persist_current()?;
        Ok(outcome)
    }

    // The snapshot codec refuses to decode lists past its bounds, so every
    // mutation that grows one is checked here before it happens.
    fn check_limit(what: &'static str, len: usize, max: usize) -> Result<(), CycleError> {
        if len > max {
            return Err(CycleError::LimitExceeded { what, len, max });
        }
        Ok(())
    }

    fn persist_current(&mut self) -> Result<(), CycleError> {
        Self::persist(&mut self.store, CURRENT_GAME_KEY, &self.current)
    }

    fn persist_both(&mut self) -> Result<(), CycleError> {
        if let Some(previous) = &self.previous {
            Self::persist(&mut self.store, PREVIOUS_GAME_KEY, previous)?;
        }
        Self::persist(&mut self.store, CURRENT_GAME_KEY, &self.current)
    }

    fn persist(store: &mut S, key: &str, snapshot: &GameSnapshot) -> Result<(), CycleError> {
        let mut buf = BytesMut::with_capacity(snapshot.encode_size());
        snapshot.write(&mut buf);
        store
            .write(key, buf.as_ref())
            .with_context(|| format!("persist {key}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{ScriptedCall, ScriptedEvaluator};
    use crate::rng::RandSource;
    use crate::state::Memory;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng(seed: u64) -> RandSource<StdRng> {
        RandSource(StdRng::seed_from_u64(seed))
    }

    fn basic_evaluator() -> ScriptedEvaluator {
        ScriptedEvaluator::new(vec![
            ScriptedCall::Decision {
                true_weight: 1,
                false_weight: 3,
            },
            ScriptedCall::Choose {
                index_count: 8,
                pick_count: 2,
                allow_duplicates: false,
            },
            ScriptedCall::ChooseWeighted {
                weights: vec![5, 0, 3, 2],
                pick_count: 1,
                allow_duplicates: true,
            },
        ])
    }

    #[test]
    fn live_cycle_records_and_replays() {
        let mut driver = RoundDriver::new(Memory::default(), rng(7)).unwrap();
        let outcome = driver.play_cycle(&mut basic_evaluator()).unwrap();

        assert_eq!(driver.cycle_count(), 1);
        // Decision(1) + 2 picks + 1 weighted pick.
        assert_eq!(driver.cycle_stream(0).unwrap().len(), 4);

        let replayed = driver.replay_cycle(&mut basic_evaluator(), 0).unwrap();
        assert_eq!(replayed, outcome);
    }

    #[test]
    fn replay_of_unknown_cycle_fails() {
        let driver = RoundDriver::new(Memory::default(), rng(7)).unwrap();
        let err = driver
            .replay_cycle(&mut basic_evaluator(), 0)
            .unwrap_err();
        assert!(matches!(
            err,
            CycleError::UnknownCycle {
                cycle: 0,
                available: 0
            }
        ));
    }

    #[test]
    fn exact_gaff_stream_is_committed_verbatim() {
        let mut driver = RoundDriver::new(Memory::default(), rng(7)).unwrap();
        // flag true (0 < 1), ranks 2 and 0, weighted value 6 (index 2's
        // bucket, the zero-weight index 1 contributing nothing).
        let gaff = vec![0, 2, 0, 6];
        driver.inject_gaff(gaff.clone());

        let outcome = driver.play_cycle(&mut basic_evaluator()).unwrap();
        assert_eq!(outcome, vec![1, 2, 0, 2]);
        assert_eq!(driver.cycle_stream(0).unwrap(), gaff.as_slice());
        assert!(driver.pending_gaff().is_none());
    }

    #[test]
    fn short_gaff_stream_falls_back_to_live() {
        let mut driver = RoundDriver::new(Memory::default(), rng(7)).unwrap();
        driver.inject_gaff(vec![0, 2]);

        let outcome = driver.play_cycle(&mut basic_evaluator()).unwrap();
        assert_eq!(driver.cycle_count(), 1);
        assert_eq!(driver.cycle_stream(0).unwrap().len(), 4);
        assert!(driver.pending_gaff().is_none());

        // The committed stream is the live one, so history replays it.
        let replayed = driver.replay_cycle(&mut basic_evaluator(), 0).unwrap();
        assert_eq!(replayed, outcome);
    }

    #[test]
    fn long_gaff_stream_falls_back_to_live() {
        let mut driver = RoundDriver::new(Memory::default(), rng(7)).unwrap();
        driver.inject_gaff(vec![0, 2, 0, 6, 99, 99]);

        driver.play_cycle(&mut basic_evaluator()).unwrap();
        assert_eq!(driver.cycle_stream(0).unwrap().len(), 4);
        assert_ne!(driver.cycle_stream(0).unwrap(), &[0, 2, 0, 6, 99, 99][..]);
    }

    #[test]
    fn garbage_gaff_count_falls_back_to_live() {
        let mut driver = RoundDriver::new(Memory::default(), rng(7)).unwrap();
        driver
            .record_selection("bonus:pick_gems", vec![3, 1], SelectionScope::Cycle)
            .unwrap();
        // A count value no real recording could produce: clamped during the
        // trial, the stream then runs dry and the cycle is played live.
        driver.inject_gaff(vec![u64::MAX]);

        let mut evaluator = ScriptedEvaluator::new(vec![ScriptedCall::Pick {
            index_count: 10,
            min_count: 1,
            max_count: 4,
            allow_duplicates: false,
            context: "bonus:pick_gems".to_string(),
        }]);
        let outcome = driver.play_cycle(&mut evaluator).unwrap();
        assert_eq!(outcome, vec![2, 3, 1]);
        assert!(driver.pending_gaff().is_none());
    }

    #[test]
    fn selection_cap_keeps_snapshots_restorable() {
        let mut store = Memory::default();
        {
            let mut driver = RoundDriver::new(&mut store, rng(7)).unwrap();
            for i in 0..spindle_types::MAX_SELECTIONS {
                driver
                    .record_selection(&format!("pick:{i}"), vec![0], SelectionScope::Game)
                    .unwrap();
            }
            let err = driver
                .record_selection("pick:overflow", vec![0], SelectionScope::Game)
                .unwrap_err();
            assert!(matches!(err, CycleError::LimitExceeded { .. }));
            // Replacing an existing context is still fine at the cap.
            driver
                .record_selection("pick:0", vec![1], SelectionScope::Game)
                .unwrap();
        }

        let restored = RoundDriver::new(&mut store, rng(9)).unwrap();
        assert_eq!(
            restored.selection("pick:0").unwrap().indexes,
            vec![1],
            "every accepted persist must decode back"
        );
    }

    #[test]
    fn oversized_mutations_are_rejected_before_any_change() {
        let mut driver = RoundDriver::new(Memory::default(), rng(7)).unwrap();

        let err = driver
            .set_carry_over(vec![0; spindle_types::MAX_CARRY_OVER_BYTES + 1])
            .unwrap_err();
        assert!(matches!(err, CycleError::LimitExceeded { .. }));
        assert!(driver.carry_over().is_empty());

        let err = driver
            .record_selection(
                "bonus:pick_gems",
                vec![0; spindle_types::MAX_SELECTION_INDEXES + 1],
                SelectionScope::Cycle,
            )
            .unwrap_err();
        assert!(matches!(err, CycleError::LimitExceeded { .. }));
        assert!(driver.selection("bonus:pick_gems").is_none());
    }

    #[test]
    fn missing_selection_fails_the_cycle() {
        let mut driver = RoundDriver::new(Memory::default(), rng(7)).unwrap();
        let mut evaluator = ScriptedEvaluator::new(vec![ScriptedCall::Pick {
            index_count: 10,
            min_count: 1,
            max_count: 4,
            allow_duplicates: false,
            context: "bonus:pick_gems".to_string(),
        }]);

        let err = driver.play_cycle(&mut evaluator).unwrap_err();
        assert!(matches!(
            err,
            CycleError::Generator(GeneratorError::MissingSelection { .. })
        ));
        assert_eq!(driver.cycle_count(), 0, "failed cycles commit nothing");
    }

    #[test]
    fn recorded_selection_answers_picks_and_cycle_scope_clears() {
        let mut driver = RoundDriver::new(Memory::default(), rng(7)).unwrap();
        driver
            .record_selection("bonus:pick_gems", vec![3, 1], SelectionScope::Cycle)
            .unwrap();
        driver
            .record_selection("side_bet:choice", vec![0], SelectionScope::Game)
            .unwrap();

        let mut evaluator = ScriptedEvaluator::new(vec![ScriptedCall::Pick {
            index_count: 10,
            min_count: 1,
            max_count: 4,
            allow_duplicates: false,
            context: "bonus:pick_gems".to_string(),
        }]);
        let outcome = driver.play_cycle(&mut evaluator).unwrap();
        assert_eq!(outcome, vec![2, 3, 1]);

        assert!(driver.selection("bonus:pick_gems").is_none());
        assert!(driver.selection("side_bet:choice").is_some());

        // Stream holds count-minus-min then rank form: [1, 3, 1].
        assert_eq!(driver.cycle_stream(0).unwrap(), &[1, 3, 1][..]);
        let replayed = driver.replay_cycle(&mut evaluator, 0).unwrap();
        assert_eq!(replayed, outcome);
    }

    #[test]
    fn skip_feature_answers_picks_with_placeholders() {
        let mut driver = RoundDriver::new(Memory::default(), rng(7)).unwrap();
        driver.set_skip_feature(true);
        let mut evaluator = ScriptedEvaluator::new(vec![ScriptedCall::Pick {
            index_count: 10,
            min_count: 2,
            max_count: 4,
            allow_duplicates: false,
            context: "bonus:pick_gems".to_string(),
        }]);
        let outcome = driver.play_cycle(&mut evaluator).unwrap();
        assert_eq!(outcome, vec![2, 0, 1]);
    }

    #[test]
    fn begin_game_archives_and_keeps_stake() {
        let mut driver = RoundDriver::new(Memory::default(), rng(7)).unwrap();
        driver.set_stake_index(3).unwrap();
        driver.set_carry_over(vec![1, 2]).unwrap();
        let outcome = driver.play_cycle(&mut basic_evaluator()).unwrap();

        driver.begin_game().unwrap();
        assert_eq!(driver.stake_index(), 3);
        assert_eq!(driver.cycle_count(), 0);
        assert!(driver.carry_over().is_empty());

        let replayed = driver
            .replay_previous_cycle(&mut basic_evaluator(), 0)
            .unwrap();
        assert_eq!(replayed, outcome);
    }

    #[test]
    fn begin_game_discards_staged_gaff() {
        let mut driver = RoundDriver::new(Memory::default(), rng(7)).unwrap();
        driver.inject_gaff(vec![0, 2, 0, 6]);
        driver.begin_game().unwrap();
        assert!(driver.pending_gaff().is_none());
    }

    #[test]
    fn state_survives_a_restart() {
        let mut store = Memory::default();
        let outcome = {
            let mut driver = RoundDriver::new(&mut store, rng(7)).unwrap();
            driver.set_stake_index(2).unwrap();
            driver
                .record_selection("side_bet:choice", vec![0], SelectionScope::Game)
                .unwrap();
            driver.set_carry_over(vec![9]).unwrap();
            driver.play_cycle(&mut basic_evaluator()).unwrap()
        };

        let restored = RoundDriver::new(&mut store, rng(99)).unwrap();
        assert_eq!(restored.stake_index(), 2);
        assert_eq!(restored.carry_over(), &[9]);
        assert!(restored.selection("side_bet:choice").is_some());
        assert_eq!(restored.cycle_count(), 1);

        // Replay needs no entropy, so the different seed is irrelevant.
        let replayed = restored.replay_cycle(&mut basic_evaluator(), 0).unwrap();
        assert_eq!(replayed, outcome);
    }

    #[test]
    fn previous_game_survives_a_restart() {
        let mut store = Memory::default();
        let outcome = {
            let mut driver = RoundDriver::new(&mut store, rng(7)).unwrap();
            let outcome = driver.play_cycle(&mut basic_evaluator()).unwrap();
            driver.begin_game().unwrap();
            outcome
        };

        let restored = RoundDriver::new(&mut store, rng(99)).unwrap();
        let replayed = restored
            .replay_previous_cycle(&mut basic_evaluator(), 0)
            .unwrap();
        assert_eq!(replayed, outcome);
    }
}
