//! Deduplicating writer for the event log.
//!
//! Cron polls the plug every few minutes forever, so the recorder only
//! appends when the classified status differs from the last stored event.
//! The log therefore grows with the number of transitions, not polls.
//! There is no cached "current status"; every call asks the store.

use std::future::Future;

use serde::Serialize;

use crate::error::{CoreError, InvalidReading};
use crate::events::{Event, EventStore};
use crate::reading::Reading;
use crate::status::Classifier;

/// Anything that can produce one fresh [`Reading`] of the plug.
pub trait SampleSource {
    fn fetch_reading(&self) -> impl Future<Output = Result<Reading, CoreError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Unchanged,
}

/// What [`Recorder::record`] did with a reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// A status change was written.
    Appended(Event),
    /// Same status as `last`; nothing written.
    Skipped { reason: SkipReason, last: Event },
}

impl RecordOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, RecordOutcome::Appended(_))
    }

    /// The event that reflects the current status after this call.
    pub fn current(&self) -> &Event {
        match self {
            RecordOutcome::Appended(event) => event,
            RecordOutcome::Skipped { last, .. } => last,
        }
    }
}

pub struct Recorder<S> {
    store: S,
    classifier: Classifier,
}

impl<S: EventStore> Recorder<S> {
    pub fn new(store: S, classifier: Classifier) -> Self {
        Self { store, classifier }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Classify `reading` and append it if the status changed.
    ///
    /// # Errors
    /// - [`CoreError::InvalidReading`] if the reading cannot be classified, or
    ///   would append an event that is not later than the last one.
    /// - [`CoreError::Store`] if the log cannot be read or written. Nothing
    ///   is retried; the next scheduled poll is the retry.
    pub fn record(&self, reading: &Reading) -> Result<RecordOutcome, CoreError> {
        let status = self.classifier.classify(reading)?;

        if let Some(last) = self.store.last()? {
            if last.status == status {
                tracing::info!(%status, since = %last.timestamp, "status unchanged, skipping");
                return Ok(RecordOutcome::Skipped {
                    reason: SkipReason::Unchanged,
                    last,
                });
            }
            if reading.timestamp <= last.timestamp {
                return Err(InvalidReading::OutOfOrder {
                    at: reading.timestamp,
                    last: last.timestamp,
                }
                .into());
            }
        }

        let event = Event {
            timestamp: reading.timestamp,
            status,
            power_watts: reading.power_watts,
        };
        self.store.append(&event)?;
        tracing::info!(%status, at = %event.timestamp, watts = ?event.power_watts, "logged new status");
        Ok(RecordOutcome::Appended(event))
    }
}

/// Poll `source` once and record the result.
///
/// A failed poll returns before the store is touched.
pub async fn record_from<P, S>(source: &P, recorder: &Recorder<S>) -> Result<RecordOutcome, CoreError>
where
    P: SampleSource,
    S: EventStore,
{
    let reading = source.fetch_reading().await?;
    recorder.record(&reading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::events::MemoryEventStore;
    use crate::status::Status;
    use chrono::{TimeZone, Utc};

    fn at(secs: i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn recorder() -> Recorder<MemoryEventStore> {
        Recorder::new(MemoryEventStore::new(), Classifier::default())
    }

    #[test]
    fn first_reading_is_appended() {
        let rec = recorder();
        let outcome = rec.record(&Reading::new(at(10), true, Some(50.0))).unwrap();
        assert_eq!(
            outcome,
            RecordOutcome::Appended(Event {
                timestamp: at(10),
                status: Status::On,
                power_watts: Some(50.0),
            })
        );
    }

    #[test]
    fn same_status_is_skipped() {
        let rec = recorder();
        rec.record(&Reading::new(at(10), true, Some(50.0))).unwrap();
        let outcome = rec.record(&Reading::new(at(20), true, Some(60.0))).unwrap();
        assert!(matches!(
            outcome,
            RecordOutcome::Skipped { reason: SkipReason::Unchanged, ref last } if last.timestamp == at(10)
        ));
        assert_eq!(rec.store().len(), 1);
    }

    #[test]
    fn low_wattage_flicker_does_not_create_events() {
        let rec = recorder();
        rec.record(&Reading::new(at(10), false, None)).unwrap();
        // relay on but idle: still Off
        rec.record(&Reading::new(at(20), true, Some(0.3))).unwrap();
        rec.record(&Reading::new(at(30), true, Some(1.2))).unwrap();
        assert_eq!(rec.store().len(), 1);
    }

    #[test]
    fn invalid_reading_writes_nothing() {
        let rec = recorder();
        let mut r = Reading::new(at(10), true, Some(5.0));
        r.raw_status.power_on = None;
        assert!(matches!(rec.record(&r), Err(CoreError::InvalidReading(_))));
        assert!(rec.store().is_empty());
    }

    #[test]
    fn stale_transition_is_rejected() {
        let rec = recorder();
        rec.record(&Reading::new(at(30), true, Some(50.0))).unwrap();
        let err = rec.record(&Reading::new(at(20), false, None)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidReading(InvalidReading::OutOfOrder { .. })
        ));
        assert_eq!(rec.store().len(), 1);
    }

    /// Reads work, every write fails.
    struct ReadOnlyStore(MemoryEventStore);

    impl EventStore for ReadOnlyStore {
        fn append(&self, _event: &Event) -> Result<(), StoreError> {
            Err(StoreError::Locked)
        }

        fn last(&self) -> Result<Option<Event>, StoreError> {
            self.0.last()
        }

        fn all(&self) -> Result<Vec<Event>, StoreError> {
            self.0.all()
        }
    }

    #[test]
    fn failed_append_propagates_and_writes_nothing() {
        let inner = MemoryEventStore::new();
        inner
            .append(&Event {
                timestamp: at(10),
                status: Status::On,
                power_watts: Some(50.0),
            })
            .unwrap();
        let rec = Recorder::new(ReadOnlyStore(inner), Classifier::default());

        let err = rec.record(&Reading::new(at(20), false, None)).unwrap_err();
        assert!(matches!(err, CoreError::Store(StoreError::Locked)));
        assert_eq!(rec.store().all().unwrap().len(), 1);
        assert_eq!(rec.store().last().unwrap().unwrap().status, Status::On);
    }

    #[test]
    fn outcome_current_tracks_latest_status() {
        let rec = recorder();
        let first = rec.record(&Reading::new(at(10), true, Some(50.0))).unwrap();
        assert!(first.is_appended());
        let second = rec.record(&Reading::new(at(20), true, Some(50.0))).unwrap();
        assert!(!second.is_appended());
        assert_eq!(second.current().timestamp, at(10));
    }
}
