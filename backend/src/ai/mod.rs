//! AI service boundary: HTTP client plus fallback values.

mod client;
pub mod fallback;

pub use client::{AiClient, AiError, MAX_CHAT_MESSAGE_CHARS};
pub use fallback::{with_fallback, Estimated, ProjectEstimate};
