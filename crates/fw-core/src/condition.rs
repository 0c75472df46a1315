//! Condition trees for choices, effect guards, and achievement triggers.
//!
//! A list of conditions is an implicit AND. Evaluation lives in the engine;
//! this module only defines the shape authors write.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Scalar;

/// A comparison operator used by stat and variable conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    /// Equal to.
    #[serde(rename = "=", alias = "==")]
    Equal,
    /// Strictly greater than.
    #[serde(rename = ">")]
    Greater,
    /// Strictly less than.
    #[serde(rename = "<")]
    Less,
    /// Greater than or equal to.
    #[serde(rename = ">=")]
    GreaterOrEqual,
    /// Less than or equal to.
    #[serde(rename = "<=")]
    LessOrEqual,
}

impl Comparison {
    /// Whether an ordering of `left` relative to `right` satisfies the operator.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::Greater => ordering == Ordering::Greater,
            Self::Less => ordering == Ordering::Less,
            Self::GreaterOrEqual => ordering != Ordering::Less,
            Self::LessOrEqual => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equal => "=",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
        };
        f.write_str(s)
    }
}

fn default_true() -> bool {
    true
}

fn default_quantity() -> u32 {
    1
}

/// A boolean predicate over the game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// A flag has the given value (absent flags are false).
    FlagSet {
        /// Flag name.
        flag: String,
        /// Expected value.
        #[serde(default = "default_true")]
        value: bool,
    },
    /// The inventory holds at least `quantity` of an item.
    HasItem {
        /// Item id.
        item: String,
        /// Minimum quantity.
        #[serde(default = "default_quantity")]
        quantity: u32,
    },
    /// A stat's current value compares against a constant.
    StatCompare {
        /// Stat id.
        stat: String,
        /// Comparison operator.
        op: Comparison,
        /// Right-hand side.
        value: i32,
    },
    /// A variable compares against a constant (missing variables read as 0).
    VariableCompare {
        /// Variable name.
        variable: String,
        /// Comparison operator.
        op: Comparison,
        /// Right-hand side.
        value: Scalar,
    },
    /// The player is currently in the given scene.
    CurrentScene {
        /// Scene id.
        scene: String,
    },
    /// An achievement has been unlocked.
    AchievementUnlocked {
        /// Achievement id.
        achievement: String,
    },
    /// True with the given probability (0.0 to 1.0). Draws from the engine RNG.
    RandomChance {
        /// Probability of success.
        probability: f64,
    },
    /// All nested conditions hold.
    And {
        /// Nested conditions.
        conditions: Vec<Condition>,
    },
    /// At least one nested condition holds.
    Or {
        /// Nested conditions.
        conditions: Vec<Condition>,
    },
    /// The nested condition does not hold.
    Not {
        /// Nested condition.
        condition: Box<Condition>,
    },
    /// A condition kind this engine version does not know. Always false.
    #[serde(other)]
    Unknown,
}

impl Condition {
    /// A flag must be set.
    pub fn flag(flag: impl Into<String>) -> Self {
        Self::FlagSet {
            flag: flag.into(),
            value: true,
        }
    }

    /// The inventory must hold at least `quantity` of `item`.
    pub fn has_item(item: impl Into<String>, quantity: u32) -> Self {
        Self::HasItem {
            item: item.into(),
            quantity,
        }
    }

    /// A stat must compare against `value`.
    pub fn stat(stat: impl Into<String>, op: Comparison, value: i32) -> Self {
        Self::StatCompare {
            stat: stat.into(),
            op,
            value,
        }
    }

    /// A variable must compare against `value`.
    pub fn variable(variable: impl Into<String>, op: Comparison, value: impl Into<Scalar>) -> Self {
        Self::VariableCompare {
            variable: variable.into(),
            op,
            value: value.into(),
        }
    }

    /// Logical AND.
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self::And { conditions }
    }

    /// Logical OR.
    pub fn any(conditions: Vec<Condition>) -> Self {
        Self::Or { conditions }
    }

    /// Logical NOT.
    pub fn negate(condition: Condition) -> Self {
        Self::Not {
            condition: Box::new(condition),
        }
    }

    /// The snake_case tag of this condition, as written in content.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::FlagSet { .. } => "flag_set",
            Self::HasItem { .. } => "has_item",
            Self::StatCompare { .. } => "stat_compare",
            Self::VariableCompare { .. } => "variable_compare",
            Self::CurrentScene { .. } => "current_scene",
            Self::AchievementUnlocked { .. } => "achievement_unlocked",
            Self::RandomChance { .. } => "random_chance",
            Self::And { .. } => "and",
            Self::Or { .. } => "or",
            Self::Not { .. } => "not",
            Self::Unknown => "unknown",
        }
    }

    /// Visit this condition and every nested condition, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Condition)) {
        visit(self);
        match self {
            Self::And { conditions } | Self::Or { conditions } => {
                for c in conditions {
                    c.walk(visit);
                }
            }
            Self::Not { condition } => condition.walk(visit),
            _ => {}
        }
    }
}
