//! Redis Publisher
//!
//! Publishes classified events to the local pub/sub broker: one `PUBLISH` per
//! event, the topic label as channel and the MessagePack payload as message.
//!
//! Publishing never blocks the caller. Frames go through a bounded channel to a
//! single writer task that owns the connection and sends them in order. When the
//! channel is full or the writer is gone the frame is dropped and counted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::SentinelConfig;
use crate::event::{ClassifiedEvent, Topic};

/// Errors that can occur during publishing
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("Publish queue full")]
    QueueFull,

    #[error("Publisher writer stopped")]
    Closed,

    #[error("Max connection attempts ({0}) exceeded")]
    MaxConnectAttemptsExceeded(u32),
}

/// One encoded event on its way to the broker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub topic: Topic,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn encode(event: &ClassifiedEvent) -> Result<Self, PublishError> {
        Ok(Self {
            topic: event.topic,
            payload: event.encode()?,
        })
    }
}

/// Destination for classified events
///
/// Implementations must not block; delivery is best effort.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &ClassifiedEvent);
}

/// Fire-and-forget publisher handle
///
/// Cheap to clone; all clones feed the same writer.
#[derive(Debug, Clone)]
pub struct RedisPublisher {
    frames: mpsc::Sender<Frame>,
    dropped: Arc<AtomicU64>,
}

impl RedisPublisher {
    /// Create a handle and the receiving end its writer drains
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (frames, rx) = mpsc::channel(capacity.max(1));
        let publisher = Self {
            frames,
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (publisher, rx)
    }

    /// Connect to the broker and spawn the writer task
    ///
    /// Retries the initial connection with exponential backoff; once connected
    /// nothing is ever retried.
    pub async fn connect(config: &SentinelConfig) -> Result<(Self, JoinHandle<()>), PublishError> {
        let client = redis::Client::open(config.endpoint.as_str())?;

        let mut attempt = 0;
        let connection = loop {
            match client.get_multiplexed_async_connection().await {
                Ok(connection) => break connection,
                Err(e) => {
                    attempt += 1;
                    if attempt >= config.max_connect_attempts {
                        error!("Giving up on {} after {} attempts: {}", config.endpoint, attempt, e);
                        return Err(PublishError::MaxConnectAttemptsExceeded(attempt));
                    }
                    let delay = config.backoff_delay(attempt);
                    warn!(
                        "Connection to {} failed ({}), retrying in {:?}",
                        config.endpoint, e, delay
                    );
                    sleep(delay).await;
                }
            }
        };
        info!("Connected to {}", config.endpoint);

        let (publisher, rx) = Self::channel(config.channel_capacity);
        let writer = tokio::spawn(run_writer(connection, rx));
        Ok((publisher, writer))
    }

    /// Queue an event without waiting
    pub fn try_publish(&self, event: &ClassifiedEvent) -> Result<(), PublishError> {
        let frame = Frame::encode(event)?;
        self.frames.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => PublishError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => PublishError::Closed,
        })
    }

    /// Frames dropped so far
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl EventSink for RedisPublisher {
    fn publish(&self, event: &ClassifiedEvent) {
        if let Err(e) = self.try_publish(event) {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(topic = %event.topic, dropped, "Event dropped: {}", e);
        }
    }
}

/// Drain frames into the broker until every handle is gone
pub async fn run_writer(mut connection: MultiplexedConnection, mut frames: mpsc::Receiver<Frame>) {
    while let Some(frame) = frames.recv().await {
        let result: Result<i64, _> = connection.publish(frame.topic.label(), frame.payload).await;
        if let Err(e) = result {
            warn!(topic = %frame.topic, "Publish failed: {}", e);
        }
    }
    info!("Publisher writer stopped");
}
