//! Dialogue tree definitions - per-NPC graphs of nodes and guarded choices.

use game_state::WorldState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::action::Action;
use crate::condition::default_true;

/// A named graph of dialogue nodes for one NPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueTree {
    /// NPC whose conversation history this tree reads and writes.
    pub npc: String,
    /// Nodes keyed by identifier.
    #[serde(default)]
    pub nodes: HashMap<String, DialogueNode>,
}

impl DialogueTree {
    /// Create an empty tree for an NPC.
    pub fn new(npc: impl Into<String>) -> Self {
        Self {
            npc: npc.into(),
            nodes: HashMap::new(),
        }
    }

    /// Add a node under an identifier.
    pub fn with_node(mut self, id: impl Into<String>, node: DialogueNode) -> Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Look up a node by identifier.
    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        self.nodes.get(id)
    }
}

/// One node of a dialogue tree: display text, an optional action run on
/// entry (before choices are shown), and an ordered choice list.
///
/// A node with no choices ends the conversation; "end" is a convention,
/// not a reserved keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueNode {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub entry_action: Option<Action>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl DialogueNode {
    /// Create a node with display text and no choices.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            entry_action: None,
            choices: Vec::new(),
        }
    }

    /// Set the action run when the node is entered.
    pub fn with_entry_action(mut self, action: Action) -> Self {
        self.entry_action = Some(action);
        self
    }

    /// Add a choice.
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }
}

/// A selectable choice: label, target node, guards controlling visibility,
/// and an optional action run on selection before the transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    /// Target node identifier. A dangling target ends the conversation at
    /// evaluation time rather than erroring at load.
    pub next: String,
    #[serde(default)]
    pub guards: Vec<Guard>,
    #[serde(default)]
    pub action: Option<Action>,
}

impl Choice {
    /// Create a choice with a label and target node.
    pub fn new(label: impl Into<String>, next: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            next: next.into(),
            guards: Vec::new(),
            action: None,
        }
    }

    /// Add a guard.
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// Set the action run on selection.
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }
}

/// A visibility predicate on a choice, evaluated fresh every time the
/// owning node is entered and re-checked at selection time.
///
/// Guards range over the inventory, this NPC's visited-node history (which
/// supports one-time-reveal topics without separate flags), and timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Guard {
    /// Item membership matches `required`.
    HasItem {
        item: String,
        #[serde(default = "default_true")]
        required: bool,
    },

    /// The referenced node has been entered at least once with this NPC,
    /// in any conversation.
    Discussed { node: String },

    /// The referenced node has never been entered with this NPC.
    NotDiscussed { node: String },

    /// Timer completion matches `required`.
    TimerComplete {
        timer: String,
        #[serde(default = "default_true")]
        required: bool,
    },

    /// Unrecognized guard kind; hides the choice.
    #[serde(other)]
    Unknown,
}

impl Guard {
    /// Evaluate against the world and one NPC's conversation history.
    pub fn is_satisfied(&self, world: &WorldState, npc: &str) -> bool {
        match self {
            Guard::HasItem { item, required } => world.has_item(item) == *required,
            Guard::Discussed { node } => world.has_visited_node(npc, node),
            Guard::NotDiscussed { node } => !world.has_visited_node(npc, node),
            Guard::TimerComplete { timer, required } => {
                world.timers.is_complete(timer, &world.clock) == *required
            }
            Guard::Unknown => false,
        }
    }

    /// AND-combine a guard list; empty lists always pass.
    pub fn all_satisfied(guards: &[Guard], world: &WorldState, npc: &str) -> bool {
        guards.iter().all(|g| g.is_satisfied(world, npc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_builder() {
        let tree = DialogueTree::new("innkeeper").with_node(
            "greeting",
            DialogueNode::new("Welcome to the Gilded Swan.")
                .with_choice(Choice::new("Goodbye.", "end")),
        );

        assert_eq!(tree.npc, "innkeeper");
        assert!(tree.node("greeting").is_some());
        assert!(tree.node("missing").is_none());
    }

    #[test]
    fn test_discussed_guard_reads_npc_history() {
        let mut world = WorldState::new();
        let reveal = Guard::Discussed {
            node: "ask_about_ruins".into(),
        };
        let tease = Guard::NotDiscussed {
            node: "ask_about_ruins".into(),
        };

        assert!(!reveal.is_satisfied(&world, "scholar"));
        assert!(tease.is_satisfied(&world, "scholar"));

        world
            .conversation_mut("scholar")
            .mark_visited("ask_about_ruins");

        assert!(reveal.is_satisfied(&world, "scholar"));
        assert!(!tease.is_satisfied(&world, "scholar"));

        // History is per-NPC.
        assert!(!reveal.is_satisfied(&world, "innkeeper"));
    }

    #[test]
    fn test_inventory_guard() {
        let mut world = WorldState::new();
        let guard = Guard::HasItem {
            item: "ferry_token".into(),
            required: true,
        };
        assert!(!guard.is_satisfied(&world, "ferryman"));

        world.grant_item("ferry_token");
        assert!(guard.is_satisfied(&world, "ferryman"));
    }

    #[test]
    fn test_unknown_guard_hides_choice() {
        let guard: Guard = toml::from_str("kind = \"alignment\"\nvalue = \"good\"").unwrap();
        assert_eq!(guard, Guard::Unknown);
        assert!(!guard.is_satisfied(&WorldState::new(), "anyone"));
    }

    #[test]
    fn test_empty_guard_list_passes() {
        let world = WorldState::new();
        assert!(Guard::all_satisfied(&[], &world, "anyone"));
    }
}
