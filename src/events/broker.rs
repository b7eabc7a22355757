// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process topic broker.
//!
//! Topics are created before the broker is shared and never removed. Each
//! record receives a monotonically increasing offset within its topic and is
//! fanned out to every live subscription. Consumer groups acknowledge
//! offsets; the broker keeps the last acknowledged offset per group.
//!
//! Records published while no subscription exists are not retained.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, warn};

/// Records buffered per subscription before a slow consumer starts lagging.
const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    #[error("event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Topic provisioning parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicConfig {
    pub name: String,
    pub partitions: u32,
    pub replication_factor: u16,
}

impl TopicConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partitions: 1,
            replication_factor: 1,
        }
    }
}

/// A published record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub topic: String,
    pub offset: u64,
    pub key: String,
    pub value: String,
}

struct Topic {
    config: TopicConfig,
    sender: broadcast::Sender<Record>,
    /// Next offset to assign. Held while sending so delivery follows offset order.
    next_offset: Mutex<u64>,
    /// Last acknowledged offset per consumer group.
    committed: RwLock<HashMap<String, u64>>,
}

/// Registry of topics shared by producers and consumers.
pub struct TopicBroker {
    topics: HashMap<String, Arc<Topic>>,
    capacity: usize,
}

impl Default for TopicBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicBroker {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Create a topic. Returns `false` if it already exists.
    pub fn create_topic(&mut self, config: TopicConfig) -> bool {
        if self.topics.contains_key(&config.name) {
            return false;
        }
        let (sender, _) = broadcast::channel(self.capacity);
        self.topics.insert(
            config.name.clone(),
            Arc::new(Topic {
                config,
                sender,
                next_offset: Mutex::new(0),
                committed: RwLock::new(HashMap::new()),
            }),
        );
        true
    }

    pub fn has_topic(&self, name: &str) -> bool {
        self.topics.contains_key(name)
    }

    pub fn topic_config(&self, name: &str) -> Option<&TopicConfig> {
        self.topics.get(name).map(|t| &t.config)
    }

    fn topic(&self, name: &str) -> Result<&Arc<Topic>, EventError> {
        self.topics
            .get(name)
            .ok_or_else(|| EventError::UnknownTopic(name.to_string()))
    }

    /// Append a record to `topic` and return its offset.
    pub async fn publish(
        &self,
        topic: &str,
        key: String,
        value: String,
    ) -> Result<u64, EventError> {
        let t = self.topic(topic)?;
        let mut next_offset = t.next_offset.lock().await;
        let offset = *next_offset;
        *next_offset += 1;

        let record = Record {
            topic: topic.to_string(),
            offset,
            key,
            value,
        };
        if t.sender.send(record).is_err() {
            debug!(topic = %topic, offset, "No active subscription, record dropped");
        }
        Ok(offset)
    }

    /// Subscribe to `topic` on behalf of consumer `group`.
    ///
    /// The subscription sees records published after this call.
    pub fn subscribe(&self, topic: &str, group: &str) -> Result<Subscription, EventError> {
        let t = self.topic(topic)?;
        Ok(Subscription {
            topic: Arc::clone(t),
            group: group.to_string(),
            receiver: t.sender.subscribe(),
        })
    }

    /// Last offset acknowledged by `group` on `topic`.
    pub async fn committed_offset(&self, topic: &str, group: &str) -> Option<u64> {
        let t = self.topics.get(topic)?;
        t.committed.read().await.get(group).copied()
    }
}

/// A consumer group's view of a topic.
pub struct Subscription {
    topic: Arc<Topic>,
    group: String,
    receiver: broadcast::Receiver<Record>,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic.config.name
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Wait for the next record. Returns `None` once the topic is closed.
    pub async fn next(&mut self) -> Option<Record> {
        loop {
            match self.receiver.recv().await {
                Ok(record) => return Some(record),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        topic = %self.topic.config.name,
                        group = %self.group,
                        skipped,
                        "Consumer lagged behind, records skipped"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Commit `offset` for this subscription's group.
    pub async fn acknowledge(&self, offset: u64) {
        let mut committed = self.topic.committed.write().await;
        let entry = committed.entry(self.group.clone()).or_insert(offset);
        *entry = (*entry).max(offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broker_with(topic: &str) -> TopicBroker {
        let mut broker = TopicBroker::new();
        assert!(broker.create_topic(TopicConfig::new(topic)));
        broker
    }

    #[test]
    fn topics_are_created_once() {
        let mut broker = broker_with("books");
        assert!(!broker.create_topic(TopicConfig::new("books")));
        let config = broker.topic_config("books").unwrap();
        assert_eq!(config.partitions, 1);
        assert_eq!(config.replication_factor, 1);
    }

    #[tokio::test]
    async fn unknown_topic_is_an_error() {
        let broker = TopicBroker::new();
        assert!(matches!(
            broker.publish("missing", "k".into(), "v".into()).await,
            Err(EventError::UnknownTopic(_))
        ));
        assert!(broker.subscribe("missing", "group").is_err());
    }

    #[tokio::test]
    async fn offsets_increase_and_records_reach_subscribers() {
        let broker = broker_with("books");
        let mut sub = broker.subscribe("books", "group").unwrap();

        assert_eq!(broker.publish("books", "k1".into(), "v1".into()).await.unwrap(), 0);
        assert_eq!(broker.publish("books", "k2".into(), "v2".into()).await.unwrap(), 1);

        let first = sub.next().await.unwrap();
        let second = sub.next().await.unwrap();
        assert_eq!((first.offset, first.value.as_str()), (0, "v1"));
        assert_eq!((second.offset, second.key.as_str()), (1, "k2"));
    }

    #[tokio::test]
    async fn publishing_without_subscribers_still_assigns_offsets() {
        let broker = broker_with("books");
        assert_eq!(broker.publish("books", "k".into(), "v".into()).await.unwrap(), 0);
        assert_eq!(broker.publish("books", "k".into(), "v".into()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn acknowledgements_are_tracked_per_group() {
        let broker = broker_with("books");
        let a = broker.subscribe("books", "a").unwrap();
        let b = broker.subscribe("books", "b").unwrap();

        a.acknowledge(3).await;
        a.acknowledge(1).await;
        b.acknowledge(0).await;

        assert_eq!(broker.committed_offset("books", "a").await, Some(3));
        assert_eq!(broker.committed_offset("books", "b").await, Some(0));
        assert_eq!(broker.committed_offset("books", "c").await, None);
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_to_newest_records() {
        let mut broker = TopicBroker::with_capacity(2);
        broker.create_topic(TopicConfig::new("books"));
        let mut sub = broker.subscribe("books", "group").unwrap();

        for i in 0..4 {
            broker
                .publish("books", format!("k{i}"), format!("v{i}"))
                .await
                .unwrap();
        }

        assert_eq!(sub.next().await.unwrap().offset, 2);
        assert_eq!(sub.next().await.unwrap().offset, 3);
    }
}
