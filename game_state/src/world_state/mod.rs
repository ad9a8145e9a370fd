//! World state management - the single mutable record of narrative facts.

mod conversation;

pub use conversation::*;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::clock::GameClock;
use crate::timers::TimerRegistry;

/// Maximum number of companions in the active party.
pub const PARTY_CAPACITY: usize = 3;

/// The complete persistent state of one playthrough.
///
/// Owned by the session and serialized wholesale on save; every engine
/// component is a stateless service parameterized by this store. Lookups
/// treat absent keys as false/absent and never fail on unknown identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    /// Named boolean quest flags. Absent means false.
    pub flags: HashMap<String, bool>,

    /// Held item identifiers. Set semantics, no counts.
    pub inventory: HashSet<String>,

    /// Ability identifiers granted so far.
    pub abilities: HashSet<String>,

    /// Factions currently allied with the player.
    pub allied_factions: HashSet<String>,

    /// Regions currently open for travel.
    pub unlocked_regions: HashSet<String>,

    /// Every companion ever recruited, in recruitment order.
    pub recruits: Vec<String>,

    /// Companions in the active party, at most [`PARTY_CAPACITY`].
    pub party: Vec<String>,

    pub gold: u32,
    pub player_level: u32,

    /// Room the player currently occupies.
    pub current_room: String,

    /// Position on the in-game calendar.
    pub clock: GameClock,

    /// Identifiers of one-shot events that have already fired.
    pub triggered_events: HashSet<String>,

    /// Per-NPC dialogue bookkeeping, keyed by NPC id.
    pub conversations: HashMap<String, ConversationRecord>,

    /// Quests finished.
    pub completed_quests: HashSet<String>,

    /// Quests accepted and still open.
    pub active_quests: HashSet<String>,

    /// Active named timers.
    pub timers: TimerRegistry,
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            flags: HashMap::new(),
            inventory: HashSet::new(),
            abilities: HashSet::new(),
            allied_factions: HashSet::new(),
            unlocked_regions: HashSet::new(),
            recruits: Vec::new(),
            party: Vec::new(),
            gold: 0,
            player_level: 1,
            current_room: String::new(),
            clock: GameClock::default(),
            triggered_events: HashSet::new(),
            conversations: HashMap::new(),
            completed_quests: HashSet::new(),
            active_quests: HashSet::new(),
            timers: TimerRegistry::new(),
        }
    }
}

impl WorldState {
    /// Create a fresh world state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a flag. Absent flags read as false.
    pub fn flag(&self, id: &str) -> bool {
        self.flags.get(id).copied().unwrap_or(false)
    }

    /// Set a flag, overwriting any previous value.
    pub fn set_flag(&mut self, id: impl Into<String>, value: bool) {
        self.flags.insert(id.into(), value);
    }

    /// Whether an item is held.
    pub fn has_item(&self, id: &str) -> bool {
        self.inventory.contains(id)
    }

    /// Add an item to the inventory. Granting a held item is a no-op.
    pub fn grant_item(&mut self, id: impl Into<String>) {
        self.inventory.insert(id.into());
    }

    /// Best-effort removal; returns whether the item was held.
    pub fn remove_item(&mut self, id: &str) -> bool {
        self.inventory.remove(id)
    }

    /// Add gold, saturating at the type limit.
    pub fn grant_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Remove gold, clamping at zero.
    pub fn remove_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_sub(amount);
    }

    /// Record a companion on the recruit roster. Re-recruiting is a no-op.
    pub fn recruit(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.recruits.contains(&name) {
            self.recruits.push(name);
        }
    }

    /// Whether a companion is on the recruit roster.
    pub fn is_recruited(&self, name: &str) -> bool {
        self.recruits.iter().any(|n| n == name)
    }

    /// Move a recruited companion into the active party.
    ///
    /// Returns false without mutating when the name is not on the roster,
    /// is already in the party, or the party is full.
    pub fn add_party_member(&mut self, name: &str) -> bool {
        if !self.is_recruited(name)
            || self.party.iter().any(|n| n == name)
            || self.party.len() >= PARTY_CAPACITY
        {
            return false;
        }
        self.party.push(name.to_string());
        true
    }

    /// Remove a companion from the active party. Absent names are a no-op.
    pub fn remove_party_member(&mut self, name: &str) -> bool {
        let before = self.party.len();
        self.party.retain(|n| n != name);
        self.party.len() != before
    }

    /// Ally with a faction. Idempotent.
    pub fn ally_faction(&mut self, id: impl Into<String>) {
        self.allied_factions.insert(id.into());
    }

    /// Break an alliance. Absent factions are a no-op.
    pub fn break_alliance(&mut self, id: &str) {
        self.allied_factions.remove(id);
    }

    /// Unlock a region for travel. Idempotent.
    pub fn unlock_region(&mut self, id: impl Into<String>) {
        self.unlocked_regions.insert(id.into());
    }

    /// Lock a region. Absent regions are a no-op.
    pub fn lock_region(&mut self, id: &str) {
        self.unlocked_regions.remove(id);
    }

    /// Mark a quest as accepted.
    pub fn activate_quest(&mut self, id: impl Into<String>) {
        self.active_quests.insert(id.into());
    }

    /// Mark a quest as finished, closing it if it was active.
    pub fn complete_quest(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.active_quests.remove(&id);
        self.completed_quests.insert(id);
    }

    /// Whether a quest has been finished.
    pub fn is_quest_completed(&self, id: &str) -> bool {
        self.completed_quests.contains(id)
    }

    /// Whether a quest is accepted and still open.
    pub fn is_quest_active(&self, id: &str) -> bool {
        self.active_quests.contains(id)
    }

    /// Advance the in-game clock, rolling days as needed.
    pub fn advance_time(&mut self, hours: f32) {
        self.clock.advance(hours);
    }

    /// Record that a one-shot event has fired.
    pub fn mark_event_triggered(&mut self, id: impl Into<String>) {
        self.triggered_events.insert(id.into());
    }

    /// Whether an event id is in the triggered set.
    pub fn has_event_triggered(&self, id: &str) -> bool {
        self.triggered_events.contains(id)
    }

    /// Dialogue bookkeeping for an NPC, if any conversation ever happened.
    pub fn conversation(&self, npc: &str) -> Option<&ConversationRecord> {
        self.conversations.get(npc)
    }

    /// Mutable dialogue bookkeeping for an NPC, created on first access.
    pub fn conversation_mut(&mut self, npc: &str) -> &mut ConversationRecord {
        self.conversations.entry(npc.to_string()).or_default()
    }

    /// Whether a dialogue node has ever been entered with an NPC.
    pub fn has_visited_node(&self, npc: &str, node: &str) -> bool {
        self.conversations
            .get(npc)
            .is_some_and(|record| record.has_visited(node))
    }
}
