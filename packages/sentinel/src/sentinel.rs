//! Host-facing entry points.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::SentinelConfig;
use crate::dispatch::Classifier;
use crate::event::ClassifiedEvent;
use crate::message::TxDecoder;
use crate::publisher::{EventSink, PublishError, RedisPublisher};
use crate::query::StateQuerier;
use crate::registry::AddressRegistry;
use crate::snapshot::SnapshotBuilder;

/// Classifier wired to an event sink
///
/// `check_tx` is called on the host's transaction-check path and never fails;
/// the host's accept/reject decision does not depend on it.
#[derive(Clone)]
pub struct Sentinel {
    classifier: Classifier,
    sink: Arc<dyn EventSink>,
}

impl Sentinel {
    pub fn new(classifier: Classifier, sink: Arc<dyn EventSink>) -> Self {
        Self { classifier, sink }
    }

    /// Load catalogs from the configured directory and connect the publisher
    ///
    /// Catalog problems are logged and leave the affected catalogs empty.
    pub async fn launch(
        config: &SentinelConfig,
        decoder: Arc<dyn TxDecoder>,
        querier: Arc<dyn StateQuerier>,
    ) -> Result<(Self, JoinHandle<()>), PublishError> {
        let registry = AddressRegistry::load(&config.config_path());
        let (publisher, writer) = RedisPublisher::connect(config).await?;
        let classifier = Classifier::new(Arc::new(registry), decoder, querier);
        info!(endpoint = %config.endpoint, "Sentinel ready");
        Ok((Self::new(classifier, Arc::new(publisher)), writer))
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Classify a pending transaction and publish its events; returns how many
    pub fn check_tx(&self, raw: &[u8]) -> usize {
        self.emit(self.classifier.classify(raw))
    }

    /// Build and publish every snapshot; returns how many were published
    pub fn snapshot(&self) -> usize {
        let builder = SnapshotBuilder::new(self.classifier.registry(), self.classifier.querier());
        let published = self.emit(builder.snapshot_all());
        debug!(published, "Snapshots published");
        published
    }

    fn emit(&self, events: Vec<ClassifiedEvent>) -> usize {
        for event in &events {
            self.sink.publish(event);
        }
        events.len()
    }
}
