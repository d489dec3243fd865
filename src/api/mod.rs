//! Survey platform Web API access
//!
//! Fetches one page of a paginated collection at a time. Transient TLS failures
//! are retried after operator confirmation; a declined retry is reported as
//! [`PageOutcome::Aborted`](crate::survey::PageOutcome) rather than an error.

pub mod client;
pub mod constants;
pub mod retry;

pub use client::{RetryPrompt, SurveyClient};
pub use retry::TransportFault;
