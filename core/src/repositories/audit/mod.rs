//! Security event sink module.

pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub use r#trait::SecurityEventSink;

mod noop;
pub use noop::NoOpSecurityEventSink;

#[cfg(test)]
mod mock;
#[cfg(test)]
pub use mock::RecordingSecurityEventSink;
