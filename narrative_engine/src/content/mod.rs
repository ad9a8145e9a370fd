//! Authored content - immutable event and dialogue definitions.
//!
//! Content is declared as static data tables keyed by identifier, either
//! built in code or loaded from TOML. No schema validation happens at load
//! beyond what deserialization enforces: a reference to a nonexistent node,
//! room, or item is inert until actually evaluated or executed, at which
//! point it resolves to false/no-op rather than erroring.

mod tree;

pub use tree::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::action::Action;
use crate::condition::Condition;
use crate::error::EngineError;

/// An immutable event definition bound to a room.
///
/// Authored at load time and never mutated afterwards; only the
/// triggered-ids set in the world state records that a one-shot fired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDef {
    pub id: String,
    /// Room whose entry this event is scanned on.
    pub room: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub one_shot: bool,
    /// Dialogue tree handed control after the actions run.
    #[serde(default)]
    pub dialogue: Option<String>,
    /// AND-combined, evaluated in order with short-circuit.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Executed in order; a no-op member never blocks the rest.
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl EventDef {
    /// Create an event bound to a room.
    pub fn new(id: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            room: room.into(),
            priority: 0,
            one_shot: false,
            dialogue: None,
            conditions: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Set the selection priority. Higher wins; ties go to authored order.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Mark the event as firing at most once per save.
    pub fn one_shot(mut self) -> Self {
        self.one_shot = true;
        self
    }

    /// Hand control to a dialogue tree after the actions run.
    pub fn with_dialogue(mut self, tree: impl Into<String>) -> Self {
        self.dialogue = Some(tree.into());
        self
    }

    /// Add a condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add an action.
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

/// Raw TOML document shape: `[[event]]` tables plus `[dialogue.<id>]`
/// trees. The `npc` field of a tree defaults to the tree's own key.
#[derive(Debug, Deserialize)]
struct ContentDoc {
    #[serde(default)]
    event: Vec<EventDef>,
    #[serde(default)]
    dialogue: HashMap<String, RawTree>,
}

#[derive(Debug, Deserialize)]
struct RawTree {
    npc: Option<String>,
    #[serde(default)]
    nodes: HashMap<String, DialogueNode>,
}

/// Immutable post-load store of all authored content.
///
/// Events are indexed by trigger room with authored order preserved; the
/// trigger engine's tie-break depends on that order and the lists are
/// never re-sorted.
#[derive(Debug, Clone, Default)]
pub struct ContentLibrary {
    events_by_room: HashMap<String, Vec<EventDef>>,
    trees: HashMap<String, DialogueTree>,
    /// NPC id -> tree id, for "talk" lookups.
    npc_trees: HashMap<String, String>,
}

impl ContentLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event, preserving authored order within its room.
    pub fn add_event(&mut self, event: EventDef) {
        self.events_by_room
            .entry(event.room.clone())
            .or_default()
            .push(event);
    }

    /// Register a dialogue tree under an identifier.
    pub fn add_tree(&mut self, id: impl Into<String>, tree: DialogueTree) {
        let id = id.into();
        self.npc_trees.insert(tree.npc.clone(), id.clone());
        self.trees.insert(id, tree);
    }

    /// All events bound to a room, in authored order.
    pub fn events_for_room(&self, room: &str) -> &[EventDef] {
        self.events_by_room
            .get(room)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Look up a dialogue tree by identifier.
    pub fn tree(&self, id: &str) -> Option<&DialogueTree> {
        self.trees.get(id)
    }

    /// The tree id answering a "talk" request for an NPC, if any.
    pub fn tree_id_for_npc(&self, npc: &str) -> Option<&str> {
        self.npc_trees.get(npc).map(|s| s.as_str())
    }

    /// Total number of registered events.
    pub fn event_count(&self) -> usize {
        self.events_by_room.values().map(|v| v.len()).sum()
    }

    /// Total number of registered dialogue trees.
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Load a library from a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, EngineError> {
        let doc: ContentDoc = toml::from_str(raw)?;
        let mut library = Self::new();
        for event in doc.event {
            library.add_event(event);
        }
        for (id, raw_tree) in doc.dialogue {
            let npc = raw_tree.npc.unwrap_or_else(|| id.clone());
            let tree = DialogueTree {
                npc,
                nodes: raw_tree.nodes,
            };
            library.add_tree(id, tree);
        }
        Ok(library)
    }
}
