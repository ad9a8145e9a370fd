//! Session facade - one player, one world, one active conversation.
//!
//! The session is the host boundary: it accepts one input per turn (a room
//! entry, a "talk", or a choice selection), runs it to completion, and
//! returns ordered text lines, the currently valid choice labels, and the
//! side effects the collaborating subsystems own. Nothing is suspended
//! across inputs except the current room and node pointers, which live in
//! the world state and therefore survive a save at any point.

use game_state::{SaveError, SaveGame, SessionId, WorldState};
use tracing::warn;

use crate::action::SideEffect;
use crate::content::ContentLibrary;
use crate::dialogue::{Conversation, DialogueTurn};
use crate::error::EngineError;
use crate::trigger::scan_room_entry;

/// Upper bound on force-travel chains followed within one input, so cyclic
/// authored content degrades to a stop instead of a hang.
const MAX_TRAVEL_HOPS: usize = 8;

/// Everything one processed input produced.
#[derive(Debug, Clone, Default)]
pub struct TurnOutput {
    /// Ordered text lines for the presentation layer.
    pub lines: Vec<String>,
    /// Labels the player may pick from next, empty outside dialogue.
    pub choices: Vec<String>,
    /// Non-text side effects for the host: NPC presence changes, combat
    /// signals, travel notices, the time fan-out.
    pub signals: Vec<SideEffect>,
}

impl TurnOutput {
    /// Whether the session is waiting on a dialogue selection.
    pub fn in_dialogue(&self) -> bool {
        !self.choices.is_empty()
    }
}

/// A running playthrough: world state, authored content, and at most one
/// active conversation.
#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    library: ContentLibrary,
    world: WorldState,
    conversation: Option<Conversation>,
}

impl GameSession {
    /// Start a session over a content library with a fresh world.
    pub fn new(library: ContentLibrary) -> Self {
        Self {
            id: SessionId::new(),
            library,
            world: WorldState::new(),
            conversation: None,
        }
    }

    /// Replace the starting world (saved campaigns, test fixtures).
    pub fn with_world(mut self, world: WorldState) -> Self {
        self.world = world;
        self
    }

    /// The session's identifier, stamped on every save.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Read access to the world state.
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Mutable access for collaborators that write state directly, such as
    /// the combat resolver reporting an outcome.
    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    /// Process a room entry: move the player, scan for events, follow any
    /// forced travel, and open a dialogue if the winning event names one.
    pub fn enter_room(&mut self, room: &str) -> TurnOutput {
        self.end_conversation();
        let mut out = TurnOutput::default();
        self.run_room_entry(room.to_string(), &mut out);
        out
    }

    /// Process a "talk" input. Silent when the NPC has no dialogue.
    pub fn talk_to(&mut self, npc: &str) -> TurnOutput {
        self.end_conversation();
        let mut out = TurnOutput::default();
        if let Some((conversation, turn)) = Conversation::begin(npc, &self.library, &mut self.world)
        {
            self.finish_dialogue_turn(conversation, turn, &mut out);
        }
        out
    }

    /// Process a dialogue selection, by 1-based index or exact label.
    ///
    /// Invalid input returns an error and changes nothing; the host should
    /// re-prompt with the previously offered choices.
    pub fn choose(&mut self, selection: &str) -> Result<TurnOutput, EngineError> {
        let Some(mut conversation) = self.conversation.take() else {
            return Err(EngineError::NoConversation);
        };

        match conversation.choose(selection, &self.library, &mut self.world) {
            Ok(turn) => {
                let mut out = TurnOutput::default();
                self.finish_dialogue_turn(conversation, turn, &mut out);
                Ok(out)
            }
            Err(err) => {
                self.conversation = Some(conversation);
                Err(err)
            }
        }
    }

    /// Snapshot the world as a JSON save.
    pub fn save(&self) -> Result<String, SaveError> {
        SaveGame::new(self.id, self.world.clone()).to_json()
    }

    /// Restore a save, resuming a mid-dialogue conversation when exactly
    /// one NPC record holds a current node.
    pub fn restore(&mut self, raw: &str) -> Result<TurnOutput, SaveError> {
        let save = SaveGame::from_json(raw)?;
        self.id = save.session;
        self.world = save.world;
        self.conversation = None;

        let mut out = TurnOutput::default();
        let active: Vec<String> = self
            .world
            .conversations
            .iter()
            .filter(|(_, record)| record.current_node.is_some())
            .map(|(npc, _)| npc.clone())
            .collect();
        if let [npc] = active.as_slice() {
            if let Some((conversation, turn)) =
                Conversation::resume(npc, &self.library, &mut self.world)
            {
                self.finish_dialogue_turn(conversation, turn, &mut out);
            }
        }
        Ok(out)
    }

    /// Enter rooms along a travel chain, scanning events at each hop.
    fn run_room_entry(&mut self, room: String, out: &mut TurnOutput) {
        let mut destination = room;
        for _ in 0..MAX_TRAVEL_HOPS {
            self.world.current_room = destination.clone();

            let Some(fired) = scan_room_entry(&self.library, &mut self.world) else {
                return;
            };
            let travel = Self::absorb_effects(fired.effects, out);

            if let Some(tree_id) = fired.dialogue {
                if let Some((conversation, turn)) =
                    Conversation::begin_tree(&tree_id, &self.library, &mut self.world)
                {
                    self.finish_dialogue_turn(conversation, turn, out);
                }
                return;
            }

            match travel {
                Some(next) => destination = next,
                None => return,
            }
        }
        warn!(hops = MAX_TRAVEL_HOPS, "travel chain cut off");
    }

    /// Fold a dialogue step into the turn output and decide what the
    /// conversation does next: continue, end and re-check room events, or
    /// tear down for forced travel.
    fn finish_dialogue_turn(
        &mut self,
        conversation: Conversation,
        turn: DialogueTurn,
        out: &mut TurnOutput,
    ) {
        let travel = Self::absorb_effects(turn.effects, out);
        if !turn.text.is_empty() {
            out.lines.push(turn.text);
        }

        if let Some(room) = travel {
            // Forced travel tears the conversation down mid-flight.
            self.world
                .conversation_mut(conversation.npc())
                .current_node = None;
            self.run_room_entry(room, out);
            return;
        }

        if turn.ended {
            // The host re-checks room-level events once a conversation is
            // over; a waiting event may fire in the same turn.
            self.run_room_entry(self.world.current_room.clone(), out);
        } else {
            out.choices = turn.choices;
            self.conversation = Some(conversation);
        }
    }

    /// Route side effects: messages become lines, travel is returned for
    /// the caller to follow, everything else is surfaced to the host.
    fn absorb_effects(effects: Vec<SideEffect>, out: &mut TurnOutput) -> Option<String> {
        let mut travel = None;
        for effect in effects {
            match effect {
                SideEffect::Message(text) => out.lines.push(text),
                SideEffect::Travel { room } => {
                    out.signals.push(SideEffect::Travel { room: room.clone() });
                    travel = Some(room);
                }
                other => out.signals.push(other),
            }
        }
        travel
    }

    fn end_conversation(&mut self) {
        if let Some(conversation) = self.conversation.take() {
            self.world
                .conversation_mut(conversation.npc())
                .current_node = None;
        }
    }
}
