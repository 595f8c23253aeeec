//! Three-phase planning pipeline: search terms, literature retrieval, plan synthesis.

pub mod engine;
mod lang;
pub mod prompts;

pub use engine::{PipelineError, PlanReport, PlanRequest, run};
pub use lang::Lang;
