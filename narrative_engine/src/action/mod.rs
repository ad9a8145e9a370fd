//! Action execution - ordered, fail-closed mutation of world state.

use game_state::WorldState;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A state-mutating or side-effecting operation executed by events or
/// dialogue choices.
///
/// Missing or unusable parameters make the single action a no-op, never a
/// crash: content is authored by non-engineers and one bad entry must not
/// block its siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Unconditionally overwrite a flag.
    SetFlag {
        #[serde(default)]
        flag: String,
        #[serde(default)]
        value: bool,
    },

    /// Add an item to the inventory. Set semantics; granting a held item is
    /// a no-op.
    GrantItem {
        #[serde(default)]
        item: String,
    },

    /// Best-effort removal; absent items are a no-op.
    RemoveItem {
        #[serde(default)]
        item: String,
    },

    /// Add gold.
    GrantGold {
        #[serde(default)]
        amount: u32,
    },

    /// Remove gold, clamping at zero.
    RemoveGold {
        #[serde(default)]
        amount: u32,
    },

    /// Record an ability by name. Stub: no further semantics yet.
    GrantAbility {
        #[serde(default)]
        ability: String,
    },

    /// Overwrite the current room. The emitted [`SideEffect::Travel`] tells
    /// the host to re-run room-entry logic, not merely note the write.
    ForceTravel {
        #[serde(default)]
        room: String,
    },

    /// Move a recruited companion into the active party. No-op when the
    /// name is not on the recruit roster, is already in the party, or the
    /// party is full.
    AddPartyMember {
        #[serde(default)]
        name: String,
    },

    /// Remove a companion from the active party.
    RemovePartyMember {
        #[serde(default)]
        name: String,
    },

    /// Place an NPC in a room. The room collaborator owns NPC presence;
    /// this mutates nothing here and only emits a side effect.
    SpawnNpc {
        #[serde(default)]
        npc: String,
        #[serde(default)]
        room: String,
    },

    /// Remove an NPC from a room. Side effect only, like [`Action::SpawnNpc`].
    RemoveNpc {
        #[serde(default)]
        npc: String,
        #[serde(default)]
        room: String,
    },

    /// Advance the in-game clock. The emitted [`SideEffect::TimeAdvanced`]
    /// is the fan-out hook for quest re-evaluation by the host.
    AdvanceTime {
        #[serde(default)]
        hours: f32,
    },

    /// Ally with a faction. Idempotent.
    AllyFaction {
        #[serde(default)]
        faction: String,
    },

    /// Break a faction alliance. Idempotent.
    BreakAlliance {
        #[serde(default)]
        faction: String,
    },

    /// Unlock a region for travel. Idempotent.
    UnlockRegion {
        #[serde(default)]
        region: String,
    },

    /// Lock a region. Idempotent.
    LockRegion {
        #[serde(default)]
        region: String,
    },

    /// Start (or restart) a named timer at the current clock reading.
    StartTimer {
        #[serde(default)]
        timer: String,
        #[serde(default)]
        hours: f32,
    },

    /// Signal the combat collaborator. State changes from the fight come
    /// back only through flags and inventory set by that collaborator.
    TriggerCombat {
        #[serde(default)]
        npc: String,
    },

    /// Emit a text line. Pure side effect, no state mutation.
    DisplayMessage {
        #[serde(default)]
        text: String,
    },

    /// Catch-all for action kinds this engine version does not know.
    /// Skipped; siblings still run.
    #[serde(other)]
    Unknown,
}

/// A host-observable consequence of action execution.
///
/// Cross-subsystem reactions (travel, combat, NPC presence, the time
/// fan-out) surface as values the host subscribes to rather than direct
/// calls, keeping the engine's dependency graph acyclic.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    /// A text line for the presentation layer.
    Message(String),
    /// The current room changed; the host must re-run room-entry logic.
    Travel { room: String },
    /// The clock moved; the host should re-evaluate quest completion.
    TimeAdvanced { hours: f32 },
    NpcSpawned { npc: String, room: String },
    NpcRemoved { npc: String, room: String },
    CombatTriggered { npc: String },
    AbilityGranted { ability: String },
}

impl Action {
    /// Apply this action to the world. Returns the side effect it emitted,
    /// if any. Total: unusable parameters degrade to a no-op.
    pub fn execute(&self, world: &mut WorldState) -> Option<SideEffect> {
        match self {
            Action::SetFlag { flag, value } => {
                if !flag.is_empty() {
                    world.set_flag(flag.clone(), *value);
                }
                None
            }
            Action::GrantItem { item } => {
                if !item.is_empty() {
                    world.grant_item(item.clone());
                }
                None
            }
            Action::RemoveItem { item } => {
                world.remove_item(item);
                None
            }
            Action::GrantGold { amount } => {
                world.grant_gold(*amount);
                None
            }
            Action::RemoveGold { amount } => {
                world.remove_gold(*amount);
                None
            }
            Action::GrantAbility { ability } => {
                if ability.is_empty() {
                    return None;
                }
                world.abilities.insert(ability.clone());
                Some(SideEffect::AbilityGranted {
                    ability: ability.clone(),
                })
            }
            Action::ForceTravel { room } => {
                if room.is_empty() {
                    return None;
                }
                world.current_room = room.clone();
                Some(SideEffect::Travel { room: room.clone() })
            }
            Action::AddPartyMember { name } => {
                if !world.add_party_member(name) {
                    debug!(name = %name, "party add refused");
                }
                None
            }
            Action::RemovePartyMember { name } => {
                world.remove_party_member(name);
                None
            }
            Action::SpawnNpc { npc, room } => {
                if npc.is_empty() {
                    return None;
                }
                Some(SideEffect::NpcSpawned {
                    npc: npc.clone(),
                    room: room.clone(),
                })
            }
            Action::RemoveNpc { npc, room } => {
                if npc.is_empty() {
                    return None;
                }
                Some(SideEffect::NpcRemoved {
                    npc: npc.clone(),
                    room: room.clone(),
                })
            }
            Action::AdvanceTime { hours } => {
                if !hours.is_finite() || *hours <= 0.0 {
                    return None;
                }
                world.advance_time(*hours);
                Some(SideEffect::TimeAdvanced { hours: *hours })
            }
            Action::AllyFaction { faction } => {
                if !faction.is_empty() {
                    world.ally_faction(faction.clone());
                }
                None
            }
            Action::BreakAlliance { faction } => {
                world.break_alliance(faction);
                None
            }
            Action::UnlockRegion { region } => {
                if !region.is_empty() {
                    world.unlock_region(region.clone());
                }
                None
            }
            Action::LockRegion { region } => {
                world.lock_region(region);
                None
            }
            Action::StartTimer { timer, hours } => {
                if !timer.is_empty() && hours.is_finite() && *hours > 0.0 {
                    let now = world.clock;
                    world.timers.start(timer.clone(), &now, *hours);
                }
                None
            }
            Action::TriggerCombat { npc } => {
                if npc.is_empty() {
                    return None;
                }
                Some(SideEffect::CombatTriggered { npc: npc.clone() })
            }
            Action::DisplayMessage { text } => {
                if text.is_empty() {
                    return None;
                }
                Some(SideEffect::Message(text.clone()))
            }
            Action::Unknown => {
                warn!("skipping unknown action kind");
                None
            }
        }
    }
}

/// Apply a list of actions in order, collecting emitted side effects.
///
/// Sequential, not transactional: an action that no-ops never blocks its
/// siblings, at the accepted cost of silent partial application over
/// partially malformed content.
pub fn execute_all(actions: &[Action], world: &mut WorldState) -> Vec<SideEffect> {
    actions.iter().filter_map(|a| a.execute(world)).collect()
}
