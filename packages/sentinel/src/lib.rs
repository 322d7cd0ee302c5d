//! Mempool Sentinel Library
//!
//! Classifies pending Terra transactions aimed at tracked exchange, mint and
//! money-market contracts, and publishes the reconstructed intents to a local
//! pub/sub broker for a trading system to react to.

pub mod classify;
pub mod config;
pub mod dispatch;
pub mod event;
pub mod gate;
pub mod message;
pub mod oracle;
pub mod payload;
pub mod publisher;
pub mod query;
pub mod registry;
pub mod sentinel;
pub mod snapshot;
pub mod telemetry;

// Re-export commonly used types
pub use classify::{Outcome, SkipReason};
pub use config::{ConfigError, LogConfig, SentinelConfig};
pub use dispatch::Classifier;
pub use event::{ClassifiedEvent, EventPayload, Topic};
pub use message::{DecodedMessage, JsonTxDecoder, TxDecoder, TxHash};
pub use publisher::{EventSink, RedisPublisher};
pub use query::{QueryError, StateQuerier};
pub use registry::{AddressRegistry, Venue};
pub use sentinel::Sentinel;
pub use snapshot::SnapshotBuilder;
