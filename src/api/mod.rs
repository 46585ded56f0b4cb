// ABOUTME: Control-plane HTTP client - the agent's only outbound integration beyond the runtime.
// ABOUTME: Stateless beyond the auth header; safe to share across every long-lived task.

mod client;
mod dto;
mod error;

pub use client::ApiClient;
pub use dto::{ComponentRecord, ServerRecord};
pub use error::{ApiError, ApiErrorKind};
