//! # Game State
//!
//! The "Ledger" crate - the single source of truth for persistent world facts:
//! quest flags, inventory, factions, the party roster, the in-game clock, named
//! timers, and per-NPC dialogue bookkeeping. This crate holds no engine logic;
//! the interpreters in `narrative_engine` are stateless services parameterized
//! by the state defined here.

pub mod clock;
pub mod save;
pub mod timers;
pub mod world_state;

pub use clock::*;
pub use save::*;
pub use timers::*;
pub use world_state::*;
