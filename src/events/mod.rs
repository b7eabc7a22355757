// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Book Events
//!
//! Side channel that publishes an event for every created book and logs the
//! events it reads back.
//!
//! ```text
//! POST /books ──► BookEventProducer ──► [book topic] ──► BookEventConsumer
//!                                                        (log + acknowledge)
//! ```
//!
//! Topics live on an in-process [`TopicBroker`] and are provisioned once at
//! startup with one partition and a replication factor of one.

pub mod broker;
pub mod consumer;
pub mod producer;
pub mod schema;

pub use broker::{EventError, Record, Subscription, TopicBroker, TopicConfig};
pub use consumer::BookEventConsumer;
pub use producer::BookEventProducer;
pub use schema::{BookKey, BookValue};

use tracing::info;

use crate::config::TopicsConfig;

/// Create the book topic and the error topic.
pub fn provision_topics(broker: &mut TopicBroker, topics: &TopicsConfig) {
    for name in [&topics.input_output_topic, &topics.error_topic] {
        if !broker.create_topic(TopicConfig::new(name.as_str())) {
            continue;
        }
        if let Some(config) = broker.topic_config(name) {
            info!(
                topic = %config.name,
                partitions = config.partitions,
                replication_factor = config.replication_factor,
                "Topic provisioned"
            );
        }
    }
}
