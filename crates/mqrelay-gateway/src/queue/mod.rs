//! In-memory durable channel engine.
//!
//! Three independent at-least-once queues with SQS-shaped primitives:
//! enqueue / long-poll receive / explicit delete, visibility timeout
//! redelivery, and a dead-letter buffer for poison messages.

pub mod broker;
pub mod channel;

pub use broker::{Broker, PublishReceipt};
pub use channel::{
    Channel, ChannelConfig, QueuedMessage, ReceiptToken, ReceivedMessage, MAX_RECEIVE_BATCH,
};
