//! Value objects representing immutable request inputs.

pub mod request_context;

// Re-export commonly used types
pub use request_context::{IssueRequest, RequestContext};
