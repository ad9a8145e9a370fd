//! Event trigger scanning on room entry.

use game_state::WorldState;
use tracing::info;

use crate::action::{execute_all, SideEffect};
use crate::condition::Condition;
use crate::content::{ContentLibrary, EventDef};

/// The winning event of one room-entry scan, already executed.
#[derive(Debug, Clone)]
pub struct FiredEvent {
    pub event_id: String,
    /// Side effects the host must observe, in execution order.
    pub effects: Vec<SideEffect>,
    /// Dialogue tree to hand control to, if the event names one.
    pub dialogue: Option<String>,
}

/// Scan the events bound to the room just entered and fire the winner.
///
/// Selection: exhausted one-shots are dropped, then events whose condition
/// list fails, then the single highest-priority survivor fires. Ties go to
/// the first-defined event - selection is authored-order dependent and the
/// candidate list is never re-sorted. A one-shot's id is recorded before
/// its actions run, so re-entry during a dialogue it started cannot
/// re-trigger it.
///
/// No event firing is the normal case and is silent: `None`, no message.
pub fn scan_room_entry(library: &ContentLibrary, world: &mut WorldState) -> Option<FiredEvent> {
    let room = world.current_room.clone();

    let mut winner: Option<&EventDef> = None;
    for event in library.events_for_room(&room) {
        if event.one_shot && world.has_event_triggered(&event.id) {
            continue;
        }
        if !Condition::all_met(&event.conditions, world) {
            continue;
        }
        match winner {
            Some(best) if event.priority <= best.priority => {}
            _ => winner = Some(event),
        }
    }

    let event = winner?;
    info!(event = %event.id, room = %room, "event fired");

    if event.one_shot {
        world.mark_event_triggered(&event.id);
    }
    let effects = execute_all(&event.actions, world);

    Some(FiredEvent {
        event_id: event.id.clone(),
        effects,
        dialogue: event.dialogue.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    fn world_in(room: &str) -> WorldState {
        let mut world = WorldState::new();
        world.current_room = room.to_string();
        world
    }

    #[test]
    fn test_silence_is_the_normal_case() {
        let library = ContentLibrary::new();
        let mut world = world_in("empty_field");
        assert!(scan_room_entry(&library, &mut world).is_none());
    }

    #[test]
    fn test_higher_priority_wins() {
        let mut library = ContentLibrary::new();
        library.add_event(EventDef::new("low", "gate").with_priority(1));
        library.add_event(EventDef::new("high", "gate").with_priority(5));

        let mut world = world_in("gate");
        let fired = scan_room_entry(&library, &mut world).unwrap();
        assert_eq!(fired.event_id, "high");
    }

    #[test]
    fn test_equal_priority_goes_to_first_defined() {
        let mut library = ContentLibrary::new();
        library.add_event(EventDef::new("first", "gate").with_priority(3));
        library.add_event(EventDef::new("second", "gate").with_priority(3));

        let mut world = world_in("gate");
        let fired = scan_room_entry(&library, &mut world).unwrap();
        assert_eq!(fired.event_id, "first");
    }

    #[test]
    fn test_failed_conditions_disqualify() {
        let mut library = ContentLibrary::new();
        library.add_event(
            EventDef::new("locked", "gate")
                .with_priority(10)
                .with_condition(Condition::FlagEquals {
                    flag: "gate_open".into(),
                    required: true,
                }),
        );
        library.add_event(EventDef::new("fallback", "gate"));

        let mut world = world_in("gate");
        let fired = scan_room_entry(&library, &mut world).unwrap();
        assert_eq!(fired.event_id, "fallback");

        world.set_flag("gate_open", true);
        let fired = scan_room_entry(&library, &mut world).unwrap();
        assert_eq!(fired.event_id, "locked");
    }

    #[test]
    fn test_one_shot_never_refires() {
        let mut library = ContentLibrary::new();
        library.add_event(
            EventDef::new("cutscene", "bridge")
                .one_shot()
                .with_action(Action::GrantGold { amount: 10 }),
        );

        let mut world = world_in("bridge");
        assert!(scan_room_entry(&library, &mut world).is_some());
        assert!(scan_room_entry(&library, &mut world).is_none());
        assert!(scan_room_entry(&library, &mut world).is_none());
        assert_eq!(world.gold, 10);
    }

    #[test]
    fn test_one_shot_recorded_before_actions_run() {
        // An event whose own condition list would still pass mid-execution
        // must already be in the triggered set when its actions run.
        let mut library = ContentLibrary::new();
        library.add_event(
            EventDef::new("ambush", "pass")
                .one_shot()
                .with_dialogue("bandit_leader"),
        );

        let mut world = world_in("pass");
        let fired = scan_room_entry(&library, &mut world).unwrap();
        assert_eq!(fired.dialogue.as_deref(), Some("bandit_leader"));
        // Recorded independent of dialogue completion.
        assert!(world.has_event_triggered("ambush"));
    }

    #[test]
    fn test_repeatable_event_fires_every_entry() {
        let mut library = ContentLibrary::new();
        library.add_event(
            EventDef::new("draft", "hall").with_action(Action::DisplayMessage {
                text: "A cold draft.".into(),
            }),
        );

        let mut world = world_in("hall");
        for _ in 0..3 {
            let fired = scan_room_entry(&library, &mut world).unwrap();
            assert_eq!(
                fired.effects,
                vec![SideEffect::Message("A cold draft.".into())]
            );
        }
    }

    #[test]
    fn test_events_in_other_rooms_are_ignored() {
        let mut library = ContentLibrary::new();
        library.add_event(EventDef::new("elsewhere", "crypt"));

        let mut world = world_in("garden");
        assert!(scan_room_entry(&library, &mut world).is_none());
    }
}
