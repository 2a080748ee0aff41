//! Shopping assistant for the marketplace.
//!
//! Answers questions about the catalog either through a hosted
//! OpenAI-compatible model, primed with ranked offer groups, or through a
//! local pattern-matching responder that runs the same aggregation. Model
//! failures always degrade to the local path.

pub mod assistant;
pub mod client;
pub mod error;
pub mod local;
pub mod prompt;
pub mod types;

mod retry;

pub use assistant::{Assistant, HISTORY_TURNS};
pub use client::{OpenRouterClient, EMPTY_COMPLETION_REPLY};
pub use error::ChatError;
pub use local::LocalResponder;
pub use prompt::build_system_prompt;
pub use types::{ChatContext, ChatMessage, ChatRole, ProductLink, Reply, ReplySource};
