//! Chat-completion client for the hosted language model.

pub mod client;
pub mod types;

pub use client::{CompletionClient, CompletionError, GroqClient};
pub use types::ChatMessage;
