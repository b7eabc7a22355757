// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Publishes book-creation events.

use std::sync::Arc;

use tracing::info;

use super::broker::{EventError, TopicBroker};
use super::schema::{BookKey, BookValue};
use crate::models::Book;

/// Producer bound to the book topic.
#[derive(Clone)]
pub struct BookEventProducer {
    broker: Arc<TopicBroker>,
    topic: String,
}

impl BookEventProducer {
    pub fn new(broker: Arc<TopicBroker>, topic: impl Into<String>) -> Self {
        Self {
            broker,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn broker(&self) -> &TopicBroker {
        &self.broker
    }

    /// Publish `book` and return the record offset.
    pub async fn send(&self, book: &Book) -> Result<u64, EventError> {
        let key = serde_json::to_string(&BookKey::from(book))?;
        let value = serde_json::to_string(&BookValue::from(book))?;

        info!(topic = %self.topic, key = %key, value = %value, "Producing book event");
        let offset = self.broker.publish(&self.topic, key, value).await?;
        info!(topic = %self.topic, offset, "Book event sent");

        Ok(offset)
    }
}
