use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

use crate::error::StoreError;
use crate::status::Status;

/// A persisted status change. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub status: Status,
    pub power_watts: Option<f64>,
}

/// Append-only, time-ordered event log.
///
/// Implementations never update or delete rows. `append` is atomic: it
/// either stores the whole event or leaves the log unchanged.
pub trait EventStore {
    fn append(&self, event: &Event) -> Result<(), StoreError>;

    /// Most recent event by timestamp.
    fn last(&self) -> Result<Option<Event>, StoreError>;

    /// Every event, ascending by timestamp.
    fn all(&self) -> Result<Vec<Event>, StoreError>;
}

/// Volatile store backed by a `Vec`, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RefCell<Vec<Event>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl EventStore for MemoryEventStore {
    fn append(&self, event: &Event) -> Result<(), StoreError> {
        let mut events = self.events.borrow_mut();
        // keep ascending order even if a caller appends out of order
        let pos = events.partition_point(|e| e.timestamp <= event.timestamp);
        events.insert(pos, event.clone());
        Ok(())
    }

    fn last(&self) -> Result<Option<Event>, StoreError> {
        Ok(self.events.borrow().last().cloned())
    }

    fn all(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.events.borrow().clone())
    }
}

impl<S: EventStore + ?Sized> EventStore for &S {
    fn append(&self, event: &Event) -> Result<(), StoreError> {
        (**self).append(event)
    }

    fn last(&self) -> Result<Option<Event>, StoreError> {
        (**self).last()
    }

    fn all(&self) -> Result<Vec<Event>, StoreError> {
        (**self).all()
    }
}
