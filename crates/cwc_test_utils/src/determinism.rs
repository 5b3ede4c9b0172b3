//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Replays, spectators and agent debugging all rely on a match being a pure
//! function of its configuration and the replies it receives. Sources of
//! non-determinism include:
//!
//! - **Reply arrival order**: The core must not care which agent answers
//!   first. Tests deliver the same replies in both orders.
//!
//! - **`HashMap` iteration order**: Rust's default hasher is randomized.
//!   Players are always iterated in squad order.
//!
//! - **Wall-clock time**: The core never reads a clock. Deadlines live in
//!   the server.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Kinematic steps are reproducible
//! 2. **Property tests**: Random intentions still produce deterministic outputs
//! 3. **Integration tests**: Full scripted matches are reproducible

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::fixtures::TestMatch;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps taken per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the scenario
/// * `steps` - Number of steps to take per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```
/// use cwc_test_utils::determinism::verify_determinism;
/// use cwc_test_utils::fixtures::test_match;
///
/// let result = verify_determinism(
///     3,   // Run 3 times
///     100, // 100 ticks each
///     test_match,
///     |game| game.tick(),
///     |game| game.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Tick two identically set-up matches side by side, finding the first
/// tick at which their state hashes differ.
///
/// # Returns
///
/// `None` if the matches stay identical, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> TestMatch,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        first.tick();
        second.tick();

        if first.state_hash() != second.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for kinematics and match testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing.
pub mod strategies {
    use cwc_core::config::Pitch;
    use cwc_core::kinematics::MAX_ENERGY;
    use cwc_core::math::Vec2;
    use cwc_core::player::{DynamicState, Intentions, PlayerType, StaticState};
    use proptest::prelude::*;

    /// Any direction in degrees, including values outside [0, 360).
    pub fn arb_direction() -> impl Strategy<Value = f64> {
        -1080.0f64..1080.0f64
    }

    /// A tick length in seconds, from tiny to a full second.
    pub fn arb_tick_seconds() -> impl Strategy<Value = f64> {
        0.0001f64..1.0f64
    }

    /// A point on the default pitch.
    pub fn arb_position() -> impl Strategy<Value = Vec2> {
        let pitch = Pitch::default();
        (0.0..=pitch.width, 0.0..=pitch.height).prop_map(|(x, y)| Vec2::new(x, y))
    }

    /// An ability value in the documented 0..=100 range.
    pub fn arb_ability() -> impl Strategy<Value = f64> {
        0.0f64..=100.0f64
    }

    /// Static state with a random running ability.
    pub fn arb_abilities() -> impl Strategy<Value = StaticState> {
        arb_ability().prop_map(|running_ability| StaticState {
            running_ability,
            ..StaticState::new(0, PlayerType::Player)
        })
    }

    /// Dynamic state anywhere on the pitch, facing anywhere.
    pub fn arb_dynamic_state() -> impl Strategy<Value = DynamicState> {
        (arb_position(), 0.0f64..360.0f64, 0.0..=MAX_ENERGY).prop_map(
            |(position, direction, energy)| DynamicState {
                position,
                direction,
                energy,
            },
        )
    }

    /// Any intention.
    pub fn arb_intentions() -> impl Strategy<Value = Intentions> {
        prop_oneof![
            Just(Intentions::None),
            arb_direction().prop_map(|direction| Intentions::Turn { direction }),
            arb_position().prop_map(|destination| Intentions::Move { destination }),
        ]
    }

    /// A sequence of intentions.
    pub fn arb_intention_sequence(max_len: usize) -> impl Strategy<Value = Vec<Intentions>> {
        proptest::collection::vec(arb_intentions(), 0..max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{
        complete_phase, empty_reply, kickoff_reply, move_to, play_reply, started_match, test_match,
    };
    use cwc_core::protocol::{AgentId, RequestKind};
    use cwc_core::team::TeamNumber;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_detects_non_determinism() {
        let counter = std::cell::Cell::new(0u64);
        let result = verify_determinism(
            2,
            1,
            || {
                counter.set(counter.get() + 1);
                counter.get()
            },
            |_| {},
            |n| *n,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 2);
    }

    #[test]
    fn test_idle_match_determinism() {
        verify_determinism(3, 500, test_match, |game| game.tick(), |game| game.state_hash())
            .assert_deterministic();
    }

    #[test]
    fn test_scripted_match_has_no_divergence() {
        let setup = || {
            let (mut game, _) = started_match(TeamNumber::One);
            complete_phase(
                &mut game,
                kickoff_reply(&[(0, 20.0, 10.0, 45.0)]),
                kickoff_reply(&[(6, 80.0, 40.0, 200.0)]),
            );
            complete_phase(
                &mut game,
                play_reply(&[(0, move_to(60.0, 30.0))]),
                play_reply(&[(6, move_to(10.0, 5.0))]),
            );
            game
        };
        assert!(find_first_divergence(setup, 300).is_none());
    }

    #[test]
    fn test_reply_order_does_not_matter() {
        let run = |agent1_first: bool| {
            let (mut game, phase) = started_match(TeamNumber::Two);
            let replies = [
                (AgentId::Agent1, kickoff_reply(&[(2, 30.0, 25.0, 0.0)])),
                (AgentId::Agent2, empty_reply(RequestKind::Kickoff)),
            ];
            let ordered: Vec<_> = if agent1_first {
                replies.into_iter().collect()
            } else {
                replies.into_iter().rev().collect()
            };
            for (agent, reply) in ordered {
                game.deliver(phase, agent, reply);
            }
            game.state_hash()
        };
        assert_eq!(run(true), run(false));
    }

    #[test]
    fn test_compute_hash_stable() {
        assert_eq!(compute_hash(&(1u32, "a")), compute_hash(&(1u32, "a")));
        assert_ne!(compute_hash(&1u32), compute_hash(&2u32));
    }
}
