pub mod conversation;
pub mod orchestrator;

pub use conversation::{Conversation, ConversationError};
pub use orchestrator::{Agent, RunOutcome};
