//! Scholarly literature retrieval and prompt-context assembly.

pub mod client;
pub mod context;
pub mod types;

pub use client::{LiteratureSource, SemanticScholarClient};
pub use context::LiteratureOutcome;
