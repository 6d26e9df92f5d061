//! Rules engine: game state, turn sequencing, priority, the stack and
//! state-based actions

pub mod actions;
pub mod casting;
pub mod combat;
pub mod config;
pub mod controller;
pub mod events;
pub mod game_loop;
pub mod layers;
pub mod logger;
pub mod payment;
pub mod phase;
pub mod priority;
pub mod random_controller;
pub mod resolution;
pub mod sba;
pub mod scripted_controller;
pub mod sequencer;
pub mod stack;
pub mod state;
pub mod triggers;
pub mod zero_controller;

pub use actions::{Action, ActionOutcome, SpecialAction};
pub use casting::{check_timing, spell_timing, TimingContext};
pub use combat::CombatState;
pub use config::EngineConfig;
pub use controller::{ActionSource, GameStateView, PlayerSnapshot};
pub use events::GameEvent;
pub use game_loop::{GameEndReason, GameLoop, GameResult};
pub use layers::Characteristics;
pub use logger::{GameLogger, LogEntry, OutputFormat, OutputMode, VerbosityLevel};
pub use payment::PaymentPlan;
pub use phase::{Phase, Step, StepEntryAction, TurnStructure, TURN_SEQUENCE};
pub use priority::{PassOutcome, PriorityState};
pub use random_controller::RandomController;
pub use resolution::{CustomEffectFn, EffectContext, EffectRegistry};
pub use sba::{DestroyReason, GraveyardReason, StateBasedAction};
pub use scripted_controller::ScriptedController;
pub use sequencer::{DecisionKind, PendingDecision};
pub use stack::{ChosenTarget, SourceSnapshot, Stack, StackItem, StackItemKind};
pub use state::{GameOutcome, GameState};
pub use triggers::PendingTrigger;
pub use zero_controller::ZeroController;
