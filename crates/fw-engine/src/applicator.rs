//! Ordered, guarded effect application.

use fw_core::{Effect, EffectKind, NotificationKind};
use tracing::{debug, warn};

use crate::achievements::AchievementEngine;
use crate::evaluator::ConditionEvaluator;
use crate::ports::AudioPort;
use crate::store::StateStore;

/// Everything an effect may touch, borrowed for one application pass.
pub struct EffectContext<'a> {
    /// The state to mutate.
    pub store: &'a mut StateStore,
    /// Evaluates per-effect guards.
    pub evaluator: &'a mut ConditionEvaluator,
    /// Handles achievement unlocks and progress.
    pub achievements: &'a AchievementEngine,
    /// Receives sound and music requests.
    pub audio: &'a mut dyn AudioPort,
}

/// What an application pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Effects that took effect.
    pub applied: usize,
    /// The last notification requested by the effects.
    pub message: Option<String>,
    /// Presentation hint for `message`.
    pub message_kind: Option<NotificationKind>,
}

/// Applies effect lists in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectApplicator;

impl EffectApplicator {
    /// Apply effects in list order.
    ///
    /// Each effect's guard conditions are evaluated against the state as it
    /// is at that point, so earlier effects can enable later ones. An effect
    /// that is skipped or fails is logged and left out of the count; the
    /// rest of the list still runs.
    pub fn apply(&self, effects: &[Effect], ctx: &mut EffectContext<'_>) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();
        for effect in effects {
            if !ctx.evaluator.evaluate(&effect.conditions, ctx.store.state()) {
                debug!(effect = effect.kind.kind_name(), "effect guard not met");
                continue;
            }
            if self.apply_one(&effect.kind, ctx, &mut outcome) {
                outcome.applied += 1;
            }
        }
        outcome
    }

    fn apply_one(
        &self,
        kind: &EffectKind,
        ctx: &mut EffectContext<'_>,
        outcome: &mut ApplyOutcome,
    ) -> bool {
        match kind {
            EffectKind::SetFlag { flag, value } => {
                ctx.store.set_flag(flag, *value);
                true
            }
            EffectKind::ToggleFlag { flag } => {
                ctx.store.toggle_flag(flag);
                true
            }
            EffectKind::SetVariable { variable, value } => {
                ctx.store.set_variable(variable, value.clone());
                true
            }
            EffectKind::ModifyVariable { variable, amount } => {
                if ctx.store.modify_variable(variable, amount).is_some() {
                    true
                } else {
                    warn!(variable = %variable, %amount, "cannot add to non-numeric variable");
                    false
                }
            }
            EffectKind::SetStat {
                stat,
                value,
                allow_over_max,
                allow_under_min,
            } => self.stat_result(
                stat,
                ctx.store
                    .set_stat_value(stat, *value, *allow_over_max, *allow_under_min),
            ),
            EffectKind::ModifyStat {
                stat,
                amount,
                allow_over_max,
                allow_under_min,
            } => self.stat_result(
                stat,
                ctx.store
                    .modify_stat(stat, *amount, *allow_over_max, *allow_under_min),
            ),
            EffectKind::AddItem { item, quantity } => match ctx.store.add_item(item, *quantity) {
                Ok(_) => true,
                Err(e) => {
                    warn!(item = %item, error = %e, "cannot add item");
                    false
                }
            },
            EffectKind::RemoveItem { item, quantity } => {
                let removed = ctx.store.remove_item(item, *quantity);
                if removed == 0 {
                    debug!(item = %item, "nothing to remove");
                }
                removed > 0
            }
            // An already-unlocked achievement is a no-op unless forced.
            EffectKind::UnlockAchievement { achievement, force } => ctx
                .achievements
                .unlock_achievement(achievement, *force, ctx.store),
            EffectKind::ProgressAchievement {
                achievement,
                amount,
            } => {
                if ctx.store.achievement(achievement).is_none() {
                    warn!(achievement = %achievement, "progress on undefined achievement");
                    return false;
                }
                ctx.achievements
                    .progress_achievement(achievement, *amount, ctx.store);
                true
            }
            EffectKind::PlaySound { sound } => {
                ctx.audio.play_sound(sound);
                true
            }
            EffectKind::PlayMusic { track } => {
                ctx.audio.play_music(track);
                true
            }
            EffectKind::ShowNotification { message, kind } => {
                outcome.message = Some(message.clone());
                outcome.message_kind = Some(*kind);
                true
            }
            EffectKind::Unknown => {
                warn!("unknown effect kind ignored");
                false
            }
        }
    }

    fn stat_result(&self, stat: &str, result: Option<fw_core::StatValue>) -> bool {
        if result.is_none() {
            warn!(stat = %stat, "effect on undefined stat");
        }
        result.is_some()
    }
}
