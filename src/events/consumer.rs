// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Book Event Listener
//!
//! Background task that reads book-creation events from the book topic,
//! logs each record and acknowledges its offset for the consumer group.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown. The
//! record being handled when the token fires is finished first.

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::broker::Subscription;

/// Consumer of the book topic.
pub struct BookEventConsumer {
    subscription: Subscription,
}

impl BookEventConsumer {
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// Run until the cancellation token is triggered or the topic closes.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(consumer.run(shutdown.clone()));
    /// ```
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            topic = %self.subscription.topic(),
            group = %self.subscription.group(),
            "Book event listener starting"
        );

        loop {
            let record = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Book event listener shutting down");
                    return;
                }
                record = self.subscription.next() => record,
            };

            let Some(record) = record else {
                info!("Book topic closed, listener stopping");
                return;
            };

            info!(
                "Read the data from offset: {}. Payload: {}",
                record.offset, record.value
            );
            self.subscription.acknowledge(record.offset).await;
        }
    }
}
