// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;

use crate::errors::DispatchError;

type Waiters = HashMap<String, VecDeque<(u64, oneshot::Sender<Value>)>>;

/// Devices whose last unclaimed reply is remembered; the oldest is forgotten first.
pub const UNCLAIMED_CAPACITY: usize = 256;

/// Outstanding reply slots, keyed by `plugin/<device>`.
///
/// Several calls may wait on the same device; replies are handed out in registration
/// order. Replies nobody waits for are kept (last one per key, for at most
/// [`UNCLAIMED_CAPACITY`] keys) for inspection.
#[derive(Default)]
pub struct PendingReplies {
    waiters: Mutex<Waiters>,
    unclaimed: Mutex<VecDeque<(String, Value)>>,
    next_id: AtomicU64,
}

impl PendingReplies {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a single-use slot. The slot deregisters itself when dropped.
    pub fn register(self: &Arc<Self>, key: impl Into<String>) -> ReplySlot {
        let key = key.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();

        self.lock_waiters()
            .entry(key.clone())
            .or_default()
            .push_back((id, sender));

        ReplySlot {
            key,
            id,
            receiver,
            pending: Arc::clone(self),
        }
    }

    /// Hands `payload` to the oldest live slot for `key`.
    ///
    /// Returns `false` when no slot took it; the payload is then kept as unclaimed.
    pub fn deliver(&self, key: &str, payload: Value) -> bool {
        let mut payload = payload;
        {
            let mut waiters = self.lock_waiters();
            if let Some(queue) = waiters.get_mut(key) {
                while let Some((_, sender)) = queue.pop_front() {
                    match sender.send(payload) {
                        Ok(()) => {
                            if queue.is_empty() {
                                waiters.remove(key);
                            }
                            return true;
                        }
                        Err(returned) => payload = returned,
                    }
                }
                waiters.remove(key);
            }
        }

        let mut unclaimed = self.lock_unclaimed();
        unclaimed.retain(|(stored, _)| stored != key);
        unclaimed.push_back((key.to_string(), payload));
        while unclaimed.len() > UNCLAIMED_CAPACITY {
            unclaimed.pop_front();
        }
        false
    }

    pub fn outstanding(&self, key: &str) -> usize {
        self.lock_waiters().get(key).map_or(0, VecDeque::len)
    }

    pub fn last_unclaimed(&self, key: &str) -> Option<Value> {
        self.lock_unclaimed()
            .iter()
            .find(|(stored, _)| stored == key)
            .map(|(_, payload)| payload.clone())
    }

    fn release(&self, key: &str, id: u64) {
        let mut waiters = self.lock_waiters();
        if let Some(queue) = waiters.get_mut(key) {
            queue.retain(|(slot_id, _)| *slot_id != id);
            if queue.is_empty() {
                waiters.remove(key);
            }
        }
    }

    fn lock_waiters(&self) -> MutexGuard<'_, Waiters> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_unclaimed(&self) -> MutexGuard<'_, VecDeque<(String, Value)>> {
        self.unclaimed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One registered wait for a reply; removed from [`PendingReplies`] on drop.
pub struct ReplySlot {
    key: String,
    id: u64,
    receiver: oneshot::Receiver<Value>,
    pending: Arc<PendingReplies>,
}

impl ReplySlot {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Waits for the reply or the deadline, whichever comes first.
    pub async fn wait(mut self, timeout: Duration) -> Result<Value, DispatchError> {
        match tokio::time::timeout(timeout, &mut self.receiver).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(DispatchError::ReplyChannelClosed {
                key: self.key.clone(),
            }),
            Err(_) => Err(DispatchError::Timeout {
                key: self.key.clone(),
                timeout,
            }),
        }
    }
}

impl Drop for ReplySlot {
    fn drop(&mut self) {
        self.pending.release(&self.key, self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_delivered_reply_wakes_the_slot() {
        let pending = PendingReplies::new();
        let slot = pending.register("plugin/dev1");

        assert!(pending.deliver("plugin/dev1", json!({"data": 1})));

        assert_eq!(slot.wait(Duration::from_secs(1)).await, Ok(json!({"data": 1})));
        assert_eq!(pending.outstanding("plugin/dev1"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_cleans_up_the_slot() {
        let pending = PendingReplies::new();
        let slot = pending.register("plugin/dev1");
        assert_eq!(pending.outstanding("plugin/dev1"), 1);

        let result = slot.wait(Duration::from_millis(50)).await;

        assert_eq!(
            result,
            Err(DispatchError::Timeout {
                key: "plugin/dev1".to_string(),
                timeout: Duration::from_millis(50)
            })
        );
        assert_eq!(pending.outstanding("plugin/dev1"), 0);
    }

    #[test]
    fn test_dropped_slot_deregisters_and_reply_goes_unclaimed() {
        let pending = PendingReplies::new();
        drop(pending.register("plugin/dev1"));

        assert!(!pending.deliver("plugin/dev1", json!({"late": true})));
        assert_eq!(pending.last_unclaimed("plugin/dev1"), Some(json!({"late": true})));
    }

    #[tokio::test]
    async fn test_waiters_on_one_device_are_served_in_order() {
        let pending = PendingReplies::new();
        let first = pending.register("plugin/dev1");
        let second = pending.register("plugin/dev1");

        pending.deliver("plugin/dev1", json!(1));
        pending.deliver("plugin/dev1", json!(2));

        assert_eq!(first.wait(Duration::from_secs(1)).await, Ok(json!(1)));
        assert_eq!(second.wait(Duration::from_secs(1)).await, Ok(json!(2)));
    }

    #[test]
    fn test_unclaimed_replies_are_capped_oldest_first() {
        let pending = PendingReplies::new();

        for device in 0..UNCLAIMED_CAPACITY + 10 {
            pending.deliver(&format!("plugin/dev{}", device), json!(device));
        }
        // A repeat reply refreshes its key instead of growing the map
        pending.deliver("plugin/dev20", json!("again"));

        assert_eq!(pending.lock_unclaimed().len(), UNCLAIMED_CAPACITY);
        assert_eq!(pending.last_unclaimed("plugin/dev0"), None);
        assert_eq!(pending.last_unclaimed("plugin/dev9"), None);
        assert_eq!(pending.last_unclaimed("plugin/dev20"), Some(json!("again")));
        assert_eq!(
            pending.last_unclaimed(&format!("plugin/dev{}", UNCLAIMED_CAPACITY + 9)),
            Some(json!(UNCLAIMED_CAPACITY + 9))
        );
    }
}
