//! Status ranges derived from the event log.
//!
//! Every event opens a range that lasts until the next event. Because the
//! recorder never stores two consecutive events with the same status, no
//! merging is needed: one event, one range. The last range is open-ended
//! and represents the current status.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::StoreError;
use crate::events::{Event, EventStore};
use crate::status::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusRange {
    pub status: Status,
    pub start: DateTime<Utc>,
    /// `None` while the range is ongoing.
    pub end: Option<DateTime<Utc>>,
}

impl StatusRange {
    pub fn is_ongoing(&self) -> bool {
        self.end.is_none()
    }

    /// Length of the range; ongoing ranges are measured up to `now`.
    ///
    /// Never negative, even if `now` precedes `start`.
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        let end = self.end.unwrap_or(now);
        (end - self.start).max(Duration::zero())
    }
}

/// Lazy iterator of ranges over an ordered event slice.
///
/// A clone is an independent cursor at the same position. Call [`aggregate`]
/// again to walk the same log from the top.
#[derive(Debug, Clone)]
pub struct Ranges<'a> {
    events: &'a [Event],
    pos: usize,
}

impl<'a> Iterator for Ranges<'a> {
    type Item = StatusRange;

    fn next(&mut self) -> Option<StatusRange> {
        let event = self.events.get(self.pos)?;
        self.pos += 1;
        Some(StatusRange {
            status: event.status,
            start: event.timestamp,
            end: self.events.get(self.pos).map(|next| next.timestamp),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.events.len() - self.pos;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Ranges<'_> {}

/// Compress an ascending event sequence into status ranges.
pub fn aggregate(events: &[Event]) -> Ranges<'_> {
    Ranges { events, pos: 0 }
}

/// Every stored event, ascending by timestamp, unmodified.
pub fn read_all<S: EventStore + ?Sized>(store: &S) -> Result<Vec<Event>, StoreError> {
    store.all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn event(secs: i64, status: Status) -> Event {
        Event {
            timestamp: at(secs),
            status,
            power_watts: None,
        }
    }

    #[test]
    fn empty_log_has_no_ranges() {
        assert_eq!(aggregate(&[]).count(), 0);
    }

    #[test]
    fn single_event_is_open_ended() {
        let events = [event(10, Status::On)];
        let ranges: Vec<_> = aggregate(&events).collect();
        assert_eq!(
            ranges,
            vec![StatusRange {
                status: Status::On,
                start: at(10),
                end: None
            }]
        );
        assert!(ranges[0].is_ongoing());
    }

    #[test]
    fn each_range_ends_at_next_start() {
        let events = [
            event(10, Status::On),
            event(30, Status::Off),
            event(95, Status::On),
        ];
        let ranges: Vec<_> = aggregate(&events).collect();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].end, Some(at(30)));
        assert_eq!(ranges[1].end, Some(at(95)));
        assert_eq!(ranges[2].end, None);
        assert_eq!(ranges[1].duration(at(1000)), Duration::seconds(65));
        assert_eq!(ranges[2].duration(at(100)), Duration::seconds(5));
    }

    #[test]
    fn iterator_is_restartable_and_exact() {
        let events = [event(10, Status::On), event(30, Status::Off)];
        let it = aggregate(&events);
        assert_eq!(it.len(), 2);
        let again = it.clone();
        assert_eq!(it.collect::<Vec<_>>(), again.collect::<Vec<_>>());
        assert_eq!(
            aggregate(&events).collect::<Vec<_>>(),
            aggregate(&events).collect::<Vec<_>>()
        );
    }

    #[test]
    fn ongoing_duration_is_clamped() {
        let range = StatusRange {
            status: Status::On,
            start: at(100),
            end: None,
        };
        assert_eq!(range.duration(at(50)), Duration::zero());
    }
}
