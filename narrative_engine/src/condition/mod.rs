//! Condition evaluation - pure predicates over world state.

use game_state::WorldState;
use serde::{Deserialize, Serialize};

pub(crate) fn default_true() -> bool {
    true
}

/// A predicate over the world state, used to gate event firing.
///
/// Evaluation is total and side-effect free. Unknown identifiers resolve to
/// absent/false, and a kind this engine version does not recognize
/// deserializes to [`Condition::Unknown`] and evaluates false, so one
/// malformed definition cannot abort the scan of a room's events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// The named event has never fired.
    FirstVisit { event: String },

    /// The flag holds the required value and the named event has never
    /// fired. A conjunction, not a separate mechanism: the flag and the
    /// visit id may differ.
    FirstVisitAfterFlag {
        flag: String,
        #[serde(default = "default_true")]
        required: bool,
        event: String,
    },

    /// The flag equals the required value. Absent flags read as false.
    FlagEquals {
        flag: String,
        #[serde(default = "default_true")]
        required: bool,
    },

    /// Item membership matches `required` ("must NOT have" when false).
    HasItem {
        item: String,
        #[serde(default = "default_true")]
        required: bool,
    },

    /// Quest-completed membership matches `required`.
    QuestCompleted {
        quest: String,
        #[serde(default = "default_true")]
        required: bool,
    },

    /// Quest-active membership matches `required`.
    QuestActive {
        quest: String,
        #[serde(default = "default_true")]
        required: bool,
    },

    /// At least this many companions ever recruited.
    MinRecruits { count: usize },

    /// At least this much gold held.
    MinGold { amount: u32 },

    /// Player level at or above the threshold.
    MinLevel { level: u32 },

    /// Timer completion matches `required`. A timer never started reads as
    /// incomplete.
    TimerComplete {
        timer: String,
        #[serde(default = "default_true")]
        required: bool,
    },

    /// Catch-all for condition kinds this engine version does not know.
    /// Always evaluates false.
    #[serde(other)]
    Unknown,
}

impl Condition {
    /// Evaluate against the current world state. Total, never mutates.
    pub fn evaluate(&self, world: &WorldState) -> bool {
        match self {
            Condition::FirstVisit { event } => !world.has_event_triggered(event),
            Condition::FirstVisitAfterFlag {
                flag,
                required,
                event,
            } => world.flag(flag) == *required && !world.has_event_triggered(event),
            Condition::FlagEquals { flag, required } => world.flag(flag) == *required,
            Condition::HasItem { item, required } => world.has_item(item) == *required,
            Condition::QuestCompleted { quest, required } => {
                world.is_quest_completed(quest) == *required
            }
            Condition::QuestActive { quest, required } => {
                world.is_quest_active(quest) == *required
            }
            Condition::MinRecruits { count } => world.recruits.len() >= *count,
            Condition::MinGold { amount } => world.gold >= *amount,
            Condition::MinLevel { level } => world.player_level >= *level,
            Condition::TimerComplete { timer, required } => {
                world.timers.is_complete(timer, &world.clock) == *required
            }
            Condition::Unknown => false,
        }
    }

    /// AND-combine a list with short-circuit evaluation.
    ///
    /// The empty list is vacuously true.
    pub fn all_met(conditions: &[Condition], world: &WorldState) -> bool {
        conditions.iter().all(|c| c.evaluate(world))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_flag_reads_false() {
        let world = WorldState::new();
        assert!(Condition::FlagEquals {
            flag: "never_set".into(),
            required: false,
        }
        .evaluate(&world));
        assert!(!Condition::FlagEquals {
            flag: "never_set".into(),
            required: true,
        }
        .evaluate(&world));
    }

    #[test]
    fn test_must_not_have_item() {
        let mut world = WorldState::new();
        let banned = Condition::HasItem {
            item: "cursed_idol".into(),
            required: false,
        };
        assert!(banned.evaluate(&world));

        world.grant_item("cursed_idol");
        assert!(!banned.evaluate(&world));
    }

    #[test]
    fn test_first_visit_tracks_triggered_set() {
        let mut world = WorldState::new();
        let cond = Condition::FirstVisit {
            event: "cave_in".into(),
        };
        assert!(cond.evaluate(&world));

        world.mark_event_triggered("cave_in");
        assert!(!cond.evaluate(&world));
    }

    #[test]
    fn test_first_visit_after_flag_is_a_conjunction() {
        let mut world = WorldState::new();
        let cond = Condition::FirstVisitAfterFlag {
            flag: "heard_rumor".into(),
            required: true,
            event: "rumor_payoff".into(),
        };

        // Flag not yet set.
        assert!(!cond.evaluate(&world));

        world.set_flag("heard_rumor", true);
        assert!(cond.evaluate(&world));

        world.mark_event_triggered("rumor_payoff");
        assert!(!cond.evaluate(&world));
    }

    #[test]
    fn test_numeric_thresholds() {
        let mut world = WorldState::new();
        world.grant_gold(50);
        world.player_level = 4;
        world.recruit("mira");
        world.recruit("torben");

        assert!(Condition::MinGold { amount: 50 }.evaluate(&world));
        assert!(!Condition::MinGold { amount: 51 }.evaluate(&world));
        assert!(Condition::MinLevel { level: 4 }.evaluate(&world));
        assert!(!Condition::MinLevel { level: 5 }.evaluate(&world));
        assert!(Condition::MinRecruits { count: 2 }.evaluate(&world));
        assert!(!Condition::MinRecruits { count: 3 }.evaluate(&world));
    }

    #[test]
    fn test_quest_membership() {
        let mut world = WorldState::new();
        world.activate_quest("clear_the_mine");

        assert!(Condition::QuestActive {
            quest: "clear_the_mine".into(),
            required: true,
        }
        .evaluate(&world));
        assert!(Condition::QuestCompleted {
            quest: "clear_the_mine".into(),
            required: false,
        }
        .evaluate(&world));

        world.complete_quest("clear_the_mine");
        assert!(Condition::QuestCompleted {
            quest: "clear_the_mine".into(),
            required: true,
        }
        .evaluate(&world));
    }

    #[test]
    fn test_timer_condition() {
        let mut world = WorldState::new();
        let waiting = Condition::TimerComplete {
            timer: "ferry".into(),
            required: false,
        };
        let ready = Condition::TimerComplete {
            timer: "ferry".into(),
            required: true,
        };

        // Never started: reads incomplete.
        assert!(waiting.evaluate(&world));
        assert!(!ready.evaluate(&world));

        let now = world.clock;
        world.timers.start("ferry", &now, 6.0);
        world.advance_time(6.0);
        assert!(ready.evaluate(&world));
        assert!(!waiting.evaluate(&world));
    }

    #[test]
    fn test_unknown_kind_parses_and_fails_closed() {
        let cond: Condition = toml::from_str("kind = \"moon_phase\"\nphase = \"full\"").unwrap();
        assert_eq!(cond, Condition::Unknown);
        assert!(!cond.evaluate(&WorldState::new()));
    }

    #[test]
    fn test_required_defaults_to_true() {
        let cond: Condition = toml::from_str("kind = \"has_item\"\nitem = \"rope\"").unwrap();
        assert_eq!(
            cond,
            Condition::HasItem {
                item: "rope".into(),
                required: true,
            }
        );
    }

    #[test]
    fn test_empty_list_is_vacuously_true() {
        let world = WorldState::new();
        assert!(Condition::all_met(&[], &world));
    }

    #[test]
    fn test_all_met_is_a_conjunction() {
        let mut world = WorldState::new();
        world.grant_item("rope");
        let conditions = vec![
            Condition::HasItem {
                item: "rope".into(),
                required: true,
            },
            Condition::MinGold { amount: 10 },
        ];
        assert!(!Condition::all_met(&conditions, &world));

        world.grant_gold(10);
        assert!(Condition::all_met(&conditions, &world));
    }
}
