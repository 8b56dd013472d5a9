//! Responsibility boundaries:
//! - prompt.rs: sourced / no-URL review prompts
//! - rubric.rs: content-quality rubric prompts and criteria
//! - client.rs: the single outbound call

pub(crate) mod client;
pub(crate) mod prompt;
pub(crate) mod rubric;
