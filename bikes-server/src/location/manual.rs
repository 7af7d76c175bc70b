//! Push-driven location source.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::StreamExt;
use futures::stream;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::source::{LocationErrorKind, LocationSource, LocationUpdate, LocationUpdates};

/// Latest event plus one queue per live subscriber.
#[derive(Debug)]
struct Feed {
    current: LocationUpdate,
    subscribers: Vec<mpsc::UnboundedSender<LocationUpdate>>,
}

/// Location source whose events are pushed in from outside.
///
/// The server publishes whatever the device reports. Until the first
/// report, the current value is `Err(Initial)`. Every subscriber receives
/// every event in publish order; bursts are queued, never coalesced.
#[derive(Debug)]
pub struct ManualLocationSource {
    feed: Mutex<Feed>,
    authorization_requested: AtomicBool,
    location_requests: AtomicUsize,
}

impl ManualLocationSource {
    pub fn new() -> Self {
        Self {
            feed: Mutex::new(Feed {
                current: Err(LocationErrorKind::Initial),
                subscribers: Vec::new(),
            }),
            authorization_requested: AtomicBool::new(false),
            location_requests: AtomicUsize::new(0),
        }
    }

    /// Publish a new location event to all subscribers.
    pub fn publish(&self, update: LocationUpdate) {
        match &update {
            Ok(coordinate) => debug!(%coordinate, "location update"),
            Err(kind) => debug!(error = %kind, "location error"),
        }

        let mut feed = self.feed();
        feed.current = update;
        // Dropped streams show up as closed queues
        feed.subscribers.retain(|tx| tx.send(update).is_ok());
    }

    /// Whether authorization has been requested since creation.
    pub fn authorization_requested(&self) -> bool {
        self.authorization_requested.load(Ordering::Relaxed)
    }

    /// Number of location requests made since creation.
    pub fn location_requests(&self) -> usize {
        self.location_requests.load(Ordering::Relaxed)
    }

    // Plain values only, so a poisoned lock is still consistent
    fn feed(&self) -> MutexGuard<'_, Feed> {
        self.feed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ManualLocationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationSource for ManualLocationSource {
    fn request_authorization(&self) {
        info!("location authorization requested");
        self.authorization_requested.store(true, Ordering::Relaxed);
    }

    fn request_location(&self) {
        let n = self.location_requests.fetch_add(1, Ordering::Relaxed) + 1;
        info!(requests = n, "location requested");
    }

    fn current(&self) -> LocationUpdate {
        self.feed().current
    }

    fn subscribe(&self) -> LocationUpdates {
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut feed = self.feed();
            // Seeded under the lock so no publish can slip in ahead of it
            let _ = tx.send(feed.current);
            feed.subscribers.push(tx);
        }

        stream::unfold(rx, |mut rx| async move {
            let update = rx.recv().await?;
            Some((update, rx))
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn starts_initial() {
        let source = ManualLocationSource::new();
        assert_eq!(source.current(), Err(LocationErrorKind::Initial));
    }

    #[test]
    fn publish_updates_current() {
        let source = ManualLocationSource::new();
        source.publish(Ok(coord(40.72, -73.95)));
        assert_eq!(source.current(), Ok(coord(40.72, -73.95)));

        source.publish(Err(LocationErrorKind::Denied));
        assert_eq!(source.current(), Err(LocationErrorKind::Denied));
    }

    #[test]
    fn requests_are_recorded() {
        let source = ManualLocationSource::new();
        assert!(!source.authorization_requested());
        source.request_authorization();
        source.request_location();
        source.request_location();
        assert!(source.authorization_requested());
        assert_eq!(source.location_requests(), 2);
    }

    #[tokio::test]
    async fn subscription_yields_current_then_changes() {
        let source = ManualLocationSource::new();
        let mut updates = source.subscribe();

        assert_eq!(updates.next().await, Some(Err(LocationErrorKind::Initial)));

        source.publish(Ok(coord(1.0, 2.0)));
        assert_eq!(updates.next().await, Some(Ok(coord(1.0, 2.0))));
    }

    #[tokio::test]
    async fn subscription_is_restartable() {
        let source = ManualLocationSource::new();
        source.publish(Ok(coord(1.0, 2.0)));

        // A late subscriber starts from the current value
        let mut late = source.subscribe();
        assert_eq!(late.next().await, Some(Ok(coord(1.0, 2.0))));
    }

    #[tokio::test]
    async fn subscription_ends_when_source_dropped() {
        let source = ManualLocationSource::new();
        let mut updates = source.subscribe();
        assert!(updates.next().await.is_some());

        drop(source);
        assert_eq!(updates.next().await, None);
    }

    #[tokio::test]
    async fn burst_is_delivered_in_order() {
        let source = ManualLocationSource::new();
        let mut updates = source.subscribe();

        source.publish(Ok(coord(1.0, 2.0)));
        source.publish(Err(LocationErrorKind::TransientError));
        source.publish(Ok(coord(3.0, 4.0)));

        assert_eq!(updates.next().await, Some(Err(LocationErrorKind::Initial)));
        assert_eq!(updates.next().await, Some(Ok(coord(1.0, 2.0))));
        assert_eq!(
            updates.next().await,
            Some(Err(LocationErrorKind::TransientError))
        );
        assert_eq!(updates.next().await, Some(Ok(coord(3.0, 4.0))));
    }

    #[tokio::test]
    async fn each_subscriber_sees_every_event() {
        let source = ManualLocationSource::new();
        let mut first = source.subscribe();
        source.publish(Ok(coord(1.0, 2.0)));
        let mut second = source.subscribe();
        source.publish(Err(LocationErrorKind::Denied));

        let first_seen: Vec<_> = (&mut first).take(3).collect().await;
        assert_eq!(
            first_seen,
            vec![
                Err(LocationErrorKind::Initial),
                Ok(coord(1.0, 2.0)),
                Err(LocationErrorKind::Denied),
            ]
        );

        let second_seen: Vec<_> = (&mut second).take(2).collect().await;
        assert_eq!(
            second_seen,
            vec![Ok(coord(1.0, 2.0)), Err(LocationErrorKind::Denied)]
        );
    }
}
