//! Condition evaluation.
//!
//! The evaluator reads game state and never writes it. Its only mutable
//! state is the random source consulted by `random_chance` leaves.

use fw_core::{Condition, GameState, Scalar};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    /// Draw the next value.
    fn next_f64(&mut self) -> f64;
}

/// A [`RandomSource`] backed by a seedable standard RNG.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Deterministic draws from a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Evaluates condition trees against a game state.
pub struct ConditionEvaluator {
    rng: Box<dyn RandomSource>,
}

impl std::fmt::Debug for ConditionEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionEvaluator").finish_non_exhaustive()
    }
}

impl ConditionEvaluator {
    /// Create an evaluator drawing from the given random source.
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self { rng }
    }

    /// Create an evaluator with a deterministic seeded source.
    pub fn seeded(seed: u64) -> Self {
        Self::new(Box::new(SeededRandom::new(seed)))
    }

    /// Whether every condition holds. An empty list is true.
    ///
    /// Stops at the first condition that fails, so later `random_chance`
    /// leaves are not drawn.
    pub fn evaluate(&mut self, conditions: &[Condition], state: &GameState) -> bool {
        conditions.iter().all(|c| self.check(c, state))
    }

    /// Evaluate a single condition tree.
    pub fn check(&mut self, condition: &Condition, state: &GameState) -> bool {
        match condition {
            Condition::FlagSet { flag, value } => state.flag(flag) == *value,
            Condition::HasItem { item, quantity } => state.inventory.count(item) >= *quantity,
            Condition::StatCompare { stat, op, value } => match state.stat(stat) {
                Some(current) => op.holds(current.current.cmp(value)),
                None => {
                    debug!(stat = %stat, "stat condition on undefined stat");
                    false
                }
            },
            Condition::VariableCompare {
                variable,
                op,
                value,
            } => {
                let zero = Scalar::Integer(0);
                let current = state.variable(variable).unwrap_or(&zero);
                match current.compare(value) {
                    Some(ordering) => op.holds(ordering),
                    None => {
                        debug!(variable = %variable, %current, %value, "incomparable variable values");
                        false
                    }
                }
            }
            Condition::CurrentScene { scene } => state.is_in_scene(scene),
            Condition::AchievementUnlocked { achievement } => state.is_unlocked(achievement),
            Condition::RandomChance { probability } => {
                if *probability <= 0.0 {
                    false
                } else if *probability >= 1.0 {
                    true
                } else {
                    self.rng.next_f64() < *probability
                }
            }
            Condition::And { conditions } => self.evaluate(conditions, state),
            Condition::Or { conditions } => conditions.iter().any(|c| self.check(c, state)),
            Condition::Not { condition } => !self.check(condition, state),
            Condition::Unknown => {
                warn!("unknown condition kind evaluates to false");
                false
            }
        }
    }
}
