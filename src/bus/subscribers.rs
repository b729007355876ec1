// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Mutex, PoisonError};

use super::topic;
use super::BusMessage;
use crate::traits::TopicHandler;

/// Per-pattern handler table shared by a bus adapter and its delivery loop.
///
/// Each component registers its own handler; nobody wraps or replaces another
/// component's handler.
#[derive(Default)]
pub struct SubscriberTable {
    entries: Mutex<Vec<(String, TopicHandler)>>,
}

impl SubscriberTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, pattern: &str, handler: TopicHandler) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((pattern.to_string(), handler));
    }

    /// Hands `message` to every matching handler in registration order.
    /// Returns how many handlers ran.
    pub fn deliver(&self, message: &BusMessage) -> usize {
        // Handlers may subscribe further patterns, so they run without the lock held.
        let handlers: Vec<TopicHandler> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(pattern, _)| topic::matches(pattern, &message.topic))
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in &handlers {
            handler(message);
        }
        handlers.len()
    }

    pub fn patterns(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(pattern, _)| pattern.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_deliver_only_to_matching_patterns() {
        let table = SubscriberTable::new();
        let announce_hits = Arc::new(AtomicUsize::new(0));
        let output_hits = Arc::new(AtomicUsize::new(0));

        let counter = announce_hits.clone();
        table.add(
            "plugin/announce",
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let counter = output_hits.clone();
        table.add(
            "plugin/+/output",
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let delivered = table.deliver(&BusMessage::new("plugin/device1/output", b"{}".to_vec()));

        assert_eq!(delivered, 1);
        assert_eq!(announce_hits.load(Ordering::SeqCst), 0);
        assert_eq!(output_hits.load(Ordering::SeqCst), 1);
        assert_eq!(table.patterns(), vec!["plugin/announce", "plugin/+/output"]);
    }
}
