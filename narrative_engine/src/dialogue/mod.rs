//! The branching dialogue state machine.
//!
//! One conversation is active at a time, entered either by an explicit
//! "talk" input or by an event handoff. States are node identifiers within
//! one NPC's tree; the terminal state is any node whose surviving choice
//! list is empty. Choice visibility is computed fresh on every node entry
//! and re-checked at selection time.

use game_state::WorldState;
use tracing::{debug, warn};

use crate::action::SideEffect;
use crate::content::{Choice, ContentLibrary, Guard};
use crate::error::EngineError;

/// Root shown on the first ever conversation with an NPC.
pub const FIRST_GREETING: &str = "first_greeting";
/// Root shown on every later conversation.
pub const REPEAT_GREETING: &str = "repeat_greeting";
/// Legacy root, the fallback when a specialized greeting node is absent.
pub const GREETING: &str = "greeting";

/// One presented step of a conversation.
#[derive(Debug, Clone, Default)]
pub struct DialogueTurn {
    /// The entered node's display text. Empty for a silent node.
    pub text: String,
    /// Labels of the choices offered, in authored order.
    pub choices: Vec<String>,
    /// Side effects emitted by the actions this step ran, in order.
    pub effects: Vec<SideEffect>,
    /// Whether the conversation is over.
    pub ended: bool,
}

/// A single active conversation with one NPC.
///
/// The engine holds only the current node pointer between inputs, and that
/// pointer is mirrored into the world state's conversation record, so a
/// save taken between choices restores cleanly.
#[derive(Debug, Clone)]
pub struct Conversation {
    npc: String,
    tree_id: String,
    node: String,
    /// Indices into the current node's choice list, as offered. Selection
    /// resolves against this, not the raw list, so hidden choices cannot
    /// be picked by number.
    offered: Vec<usize>,
}

impl Conversation {
    /// Start a conversation with an NPC, selecting the root by convention:
    /// `first_greeting` when never greeted, `repeat_greeting` thereafter,
    /// legacy `greeting` when the specialized node is absent.
    ///
    /// Returns `None` when the NPC has no tree or no usable root; talking
    /// to a stranger is silent, not an error.
    pub fn begin(
        npc: &str,
        library: &ContentLibrary,
        world: &mut WorldState,
    ) -> Option<(Conversation, DialogueTurn)> {
        let tree_id = library.tree_id_for_npc(npc)?.to_string();
        Self::begin_tree(&tree_id, library, world)
    }

    /// Start a conversation from an explicit tree id (event handoff).
    pub fn begin_tree(
        tree_id: &str,
        library: &ContentLibrary,
        world: &mut WorldState,
    ) -> Option<(Conversation, DialogueTurn)> {
        let tree = library.tree(tree_id)?;
        let npc = tree.npc.clone();

        let greeted = world.conversation(&npc).is_some_and(|r| r.greeted);
        let preferred = if greeted { REPEAT_GREETING } else { FIRST_GREETING };
        let root = if tree.node(preferred).is_some() {
            preferred
        } else {
            GREETING
        };
        tree.node(root)?;

        world.conversation_mut(&npc).greeted = true;

        let mut conversation = Conversation {
            npc,
            tree_id: tree_id.to_string(),
            node: root.to_string(),
            offered: Vec::new(),
        };
        let turn = conversation.present(library, world, true);
        Some((conversation, turn))
    }

    /// Re-attach to a conversation restored from a save: present the
    /// recorded node again without re-running its entry action.
    pub fn resume(
        npc: &str,
        library: &ContentLibrary,
        world: &mut WorldState,
    ) -> Option<(Conversation, DialogueTurn)> {
        let node = world.conversation(npc)?.current_node.clone()?;
        let tree_id = library.tree_id_for_npc(npc)?.to_string();
        library.tree(&tree_id)?.node(&node)?;

        let mut conversation = Conversation {
            npc: npc.to_string(),
            tree_id,
            node,
            offered: Vec::new(),
        };
        let turn = conversation.present(library, world, false);
        Some((conversation, turn))
    }

    /// The NPC this conversation is with.
    pub fn npc(&self) -> &str {
        &self.npc
    }

    /// The node the conversation currently stands at.
    pub fn current_node(&self) -> &str {
        &self.node
    }

    /// Resolve a player selection against the offered choices and take the
    /// transition.
    ///
    /// Selection is a 1-based index or an exact label match. Input that
    /// resolves to nothing offered - including a choice whose guard has
    /// since gone false - is [`EngineError::InvalidChoice`]: the host
    /// re-prompts and no state changes.
    pub fn choose(
        &mut self,
        selection: &str,
        library: &ContentLibrary,
        world: &mut WorldState,
    ) -> Result<DialogueTurn, EngineError> {
        let choice = self
            .resolve_selection(selection, library, world)
            .ok_or_else(|| EngineError::InvalidChoice {
                input: selection.to_string(),
            })?;

        let mut effects = Vec::new();
        if let Some(action) = &choice.action {
            effects.extend(action.execute(world));
        }

        debug!(npc = %self.npc, from = %self.node, to = %choice.next, "dialogue transition");
        self.node = choice.next;

        let mut turn = self.present(library, world, true);
        // Selection-action effects happened before the transition.
        effects.append(&mut turn.effects);
        turn.effects = effects;
        Ok(turn)
    }

    fn resolve_selection(
        &self,
        selection: &str,
        library: &ContentLibrary,
        world: &WorldState,
    ) -> Option<Choice> {
        let node = library.tree(&self.tree_id)?.node(&self.node)?;
        let input = selection.trim();

        let picked = input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.offered.get(i).copied())
            .or_else(|| {
                self.offered
                    .iter()
                    .copied()
                    .find(|&i| node.choices.get(i).is_some_and(|c| c.label == input))
            })?;

        let choice = node.choices.get(picked)?;
        // Guards are re-checked at selection time; a choice whose guard
        // went false since presentation cannot be taken.
        if !Guard::all_satisfied(&choice.guards, world, &self.npc) {
            return None;
        }
        Some(choice.clone())
    }

    /// Enter (or re-present) the current node: run its entry action, mark
    /// it visited, compute the surviving choices fresh, and update the
    /// world's conversation record.
    ///
    /// A dangling node id ends the conversation silently. Entry actions
    /// run once per entry; re-presenting after an invalid input does not
    /// re-enter, but looping back through a transition does.
    fn present(
        &mut self,
        library: &ContentLibrary,
        world: &mut WorldState,
        run_entry: bool,
    ) -> DialogueTurn {
        let Some(node) = library
            .tree(&self.tree_id)
            .and_then(|tree| tree.node(&self.node))
            .cloned()
        else {
            warn!(npc = %self.npc, node = %self.node, "dangling dialogue node; ending conversation");
            world.conversation_mut(&self.npc).current_node = None;
            self.offered.clear();
            return DialogueTurn {
                ended: true,
                ..DialogueTurn::default()
            };
        };

        world.conversation_mut(&self.npc).mark_visited(&self.node);

        let mut effects = Vec::new();
        if run_entry {
            if let Some(action) = &node.entry_action {
                effects.extend(action.execute(world));
            }
        }

        self.offered = node
            .choices
            .iter()
            .enumerate()
            .filter(|(_, c)| Guard::all_satisfied(&c.guards, world, &self.npc))
            .map(|(i, _)| i)
            .collect();

        let choices: Vec<String> = self
            .offered
            .iter()
            .map(|&i| node.choices[i].label.clone())
            .collect();
        let ended = choices.is_empty();

        let record = world.conversation_mut(&self.npc);
        record.current_node = if ended { None } else { Some(self.node.clone()) };

        DialogueTurn {
            text: node.text.clone(),
            choices,
            effects,
            ended,
        }
    }
}
