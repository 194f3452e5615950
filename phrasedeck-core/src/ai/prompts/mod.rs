//! Prompt templates for the vision model.

pub mod score_images;
pub mod search_query;

pub use score_images::{render_score_prompt, SCORE_PREFILL, SCORE_SYSTEM_PROMPT};
pub use search_query::{render_query_plan_prompt, QUERY_PLAN_PREFILL, QUERY_PLAN_SYSTEM_PROMPT};
