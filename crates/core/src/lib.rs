//! Core logic for the augur oracle satellite service.
//!
//! Everything in this crate can be exercised without a live transport:
//!
//! - `protocol`: the JSON message envelope spoken with the coordinator.
//! - `codec`: newline-delimited framing over any byte stream.
//! - `answers`: the fixed oracle answer set.
//! - `oracle`: random answer selection with at-most-once delivery.
//! - `choreography`: mapping answers to actuator directive sequences.

pub mod answers;
pub mod choreography;
pub mod codec;
pub mod oracle;
pub mod protocol;
