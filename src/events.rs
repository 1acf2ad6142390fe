//! Store events delivered to in-process subscribers.
//!
//! Every save attempt, reset and import is broadcast as a [`StoreEvent`] on
//! bounded crossbeam channels. Publishing never blocks the writer: a full
//! subscriber misses the event, a disconnected one is dropped.
//!
//! ```rust,ignore
//! let events = db.subscribe();
//! db.add_habit("Read", "📖")?;
//! if let Ok(StoreEvent::SaveFailed { message, .. }) = events.try_recv() {
//!     show_toast(&message);
//! }
//! ```

use std::sync::{Mutex, MutexGuard};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, trace};

use crate::gateway::SaveOutcome;

/// Something that happened to the persisted state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// A value was written under `key`.
    Saved {
        /// Storage key written.
        key: String,
        /// Bytes written.
        bytes: usize,
    },
    /// A write under `key` failed; the in-memory state is unaffected.
    SaveFailed {
        /// Storage key that was to be written.
        key: String,
        /// User-facing notice.
        message: String,
    },
    /// The document was replaced with defaults.
    Reset,
    /// A backup was imported.
    Imported,
}

impl StoreEvent {
    /// Builds the event describing a save attempt.
    pub fn from_outcome(key: &str, outcome: &SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Saved { bytes } => Self::Saved {
                key: key.to_string(),
                bytes: *bytes,
            },
            failure => Self::SaveFailed {
                key: key.to_string(),
                message: failure.notice().unwrap_or_default(),
            },
        }
    }
}

/// Fan-out of [`StoreEvent`]s to bounded subscriber channels.
#[derive(Debug)]
pub struct EventHub {
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
    capacity: usize,
}

impl EventHub {
    /// Creates a hub whose subscriber channels buffer `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    /// Registers a new subscriber.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = bounded(self.capacity);
        self.lock().push(tx);
        rx
    }

    /// Sends `event` to every live subscriber without blocking.
    pub fn publish(&self, event: StoreEvent) {
        let mut subscribers = self.lock();
        subscribers.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                trace!("Subscriber queue full, event dropped");
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("Subscriber disconnected, removing");
                false
            }
        });
    }

    /// Number of registered subscribers (disconnected ones are pruned on the
    /// next publish).
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Sender<StoreEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
