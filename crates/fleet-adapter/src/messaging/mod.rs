//! Messaging Adapters
//!
//! | Direction | Messages | Adapter |
//! |-----------|----------|---------|
//! | in  | vehicle / user events | [`EventConsumer`] |
//! | out | issue events | [`LoggingPublisher`], [`OutboxPublisher`] |

pub mod consumer;
pub mod dto;
pub mod publisher;

pub use consumer::{EventConsumer, ReplaySummary};
pub use dto::{decode, encode, DecodeError, Envelope};
pub use publisher::{LoggingPublisher, OutboxPublisher};
