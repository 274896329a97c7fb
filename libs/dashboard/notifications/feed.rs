//! Notification panel state
//!
//! Keeps the newest user events (5 by default), each disappearing after
//! a fixed time (8 s by default) unless dismissed earlier. The connected
//! flag follows status envelopes only.

use super::channel::NotificationChannel;
use super::types::{Notification, NotificationKind, Severity, UserPayload};
use crate::config::FeedConfig;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use pulsesocket::{SocketEvent, Subscription};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Shared feed accessible by the channel subscriber and the renderer
pub type SharedNotificationFeed = Arc<RwLock<NotificationFeed>>;

/// One visible notification
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub id: u64,
    pub kind: NotificationKind,
    pub title: &'static str,
    pub message: String,
    pub user: Option<UserPayload>,
    /// Server timestamp, or receive time when the server sent none
    pub timestamp: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
}

impl FeedEntry {
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

#[derive(Debug, Clone)]
pub struct NotificationFeed {
    entries: VecDeque<FeedEntry>,
    capacity: usize,
    ttl: Duration,
    connected: bool,
    next_id: u64,
    total_received: u64,
}

impl NotificationFeed {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            ttl,
            connected: false,
            next_id: 1,
            total_received: 0,
        }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(config.capacity, config.ttl())
    }

    pub fn shared(self) -> SharedNotificationFeed {
        Arc::new(RwLock::new(self))
    }

    /// Subscribe a shared feed to the channel and connect it
    pub fn attach(feed: &SharedNotificationFeed, channel: &NotificationChannel) -> Subscription {
        let feed = Arc::clone(feed);
        channel.attach(move |event: &SocketEvent<Notification>| {
            feed.write().apply(event);
        })
    }

    /// Expire stale entries and copy the feed out for rendering
    ///
    /// The lock is released before this returns.
    pub fn snapshot(feed: &SharedNotificationFeed) -> NotificationFeed {
        let mut feed = feed.write();
        feed.expire();
        feed.clone()
    }

    pub fn apply(&mut self, event: &SocketEvent<Notification>) -> Option<u64> {
        self.apply_at(event, Utc::now())
    }

    /// Apply one event; returns the id of the entry it created, if any
    pub fn apply_at(&mut self, event: &SocketEvent<Notification>, now: DateTime<Utc>) -> Option<u64> {
        match event {
            SocketEvent::Status(status) => {
                self.connected = status.is_connected();
                None
            }
            SocketEvent::Message(notification) if notification.is_user_event() => {
                Some(self.push(notification, now))
            }
            SocketEvent::Message(notification) => {
                debug!("Ignoring non-user event '{}'", notification.event_type());
                None
            }
        }
    }

    fn push(&mut self, notification: &Notification, now: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.total_received += 1;

        let kind = notification.kind();
        self.entries.push_front(FeedEntry {
            id,
            kind,
            title: kind.title(),
            message: notification.display_message().to_string(),
            user: notification.user(),
            timestamp: notification.timestamp().unwrap_or(now),
            received_at: now,
        });
        self.entries.truncate(self.capacity);
        id
    }

    pub fn expire(&mut self) -> usize {
        self.expire_at(Utc::now())
    }

    /// Drop entries older than the ttl; returns how many were removed
    pub fn expire_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|entry| now - entry.received_at < ttl);
        before - self.entries.len()
    }

    /// Remove one entry by id
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        before != self.entries.len()
    }

    /// Remove the newest entry, returning its id
    pub fn dismiss_newest(&mut self) -> Option<u64> {
        self.entries.pop_front().map(|entry| entry.id)
    }

    /// Visible entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &FeedEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// User events seen since creation, including expired ones
    pub fn total_received(&self) -> u64 {
        self.total_received
    }
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::from_config(&FeedConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsesocket::StatusEnvelope;
    use serde_json::json;

    fn user_event(kind: &str, email: &str) -> SocketEvent<Notification> {
        SocketEvent::Message(
            Notification::from_value(json!({
                "type": kind,
                "data": {"email": email, "message": format!("{} {}", kind, email)}
            }))
            .unwrap(),
        )
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_connected_flag_follows_status() {
        let mut feed = NotificationFeed::default();
        assert!(!feed.is_connected());

        feed.apply(&SocketEvent::Status(StatusEnvelope::connected()));
        assert!(feed.is_connected());

        feed.apply(&SocketEvent::Status(StatusEnvelope::error("Connection failed")));
        assert!(!feed.is_connected());

        feed.apply(&SocketEvent::Status(StatusEnvelope::connected()));
        feed.apply(&SocketEvent::Status(StatusEnvelope::disconnected()));
        assert!(!feed.is_connected());
        assert!(feed.is_empty());
    }

    #[test]
    fn test_keeps_newest_five() {
        let mut feed = NotificationFeed::default();
        for i in 0..7 {
            feed.apply_at(&user_event("user:created", &format!("u{}@x.com", i)), t0());
        }

        assert_eq!(feed.len(), 5);
        assert_eq!(feed.total_received(), 7);

        let emails: Vec<_> = feed
            .entries()
            .map(|e| e.user.as_ref().unwrap().email.clone())
            .collect();
        assert_eq!(
            emails,
            vec!["u6@x.com", "u5@x.com", "u4@x.com", "u3@x.com", "u2@x.com"]
        );
    }

    #[test]
    fn test_only_user_events_enter_the_feed() {
        let mut feed = NotificationFeed::default();
        let other = SocketEvent::Message(
            Notification::from_value(json!({"type": "system:ping"})).unwrap(),
        );

        assert_eq!(feed.apply_at(&other, t0()), None);
        assert!(feed.apply_at(&user_event("user:deleted", "a@x.com"), t0()).is_some());

        let entry = feed.entries().next().unwrap();
        assert_eq!(entry.kind, NotificationKind::UserDeleted);
        assert_eq!(entry.severity(), Severity::Error);
        assert_eq!(entry.title, "User deleted");
        assert_eq!(entry.message, "user:deleted a@x.com");
        assert_eq!(entry.timestamp, t0());
    }

    #[test]
    fn test_entries_expire_after_ttl() {
        let mut feed = NotificationFeed::default();
        feed.apply_at(&user_event("user:created", "old@x.com"), t0());
        feed.apply_at(
            &user_event("user:updated", "new@x.com"),
            t0() + Duration::seconds(5),
        );

        assert_eq!(feed.expire_at(t0() + Duration::seconds(7)), 0);
        assert_eq!(feed.expire_at(t0() + Duration::seconds(8)), 1);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.expire_at(t0() + Duration::seconds(13)), 1);
        assert!(feed.is_empty());
    }

    #[test]
    fn test_dismiss() {
        let mut feed = NotificationFeed::default();
        let first = feed.apply_at(&user_event("user:created", "a@x.com"), t0()).unwrap();
        let second = feed.apply_at(&user_event("user:created", "b@x.com"), t0()).unwrap();

        assert!(feed.dismiss(first));
        assert!(!feed.dismiss(first));
        assert_eq!(feed.entries().map(|e| e.id).collect::<Vec<_>>(), vec![second]);
    }

    #[test]
    fn test_dismiss_newest() {
        let mut feed = NotificationFeed::default();
        let first = feed.apply_at(&user_event("user:created", "a@x.com"), t0()).unwrap();
        let second = feed.apply_at(&user_event("user:updated", "a@x.com"), t0()).unwrap();

        assert_eq!(feed.dismiss_newest(), Some(second));
        assert_eq!(feed.dismiss_newest(), Some(first));
        assert_eq!(feed.dismiss_newest(), None);
        assert!(feed.is_empty());
    }

    #[test]
    fn test_snapshot_expires_and_detaches() {
        let feed = NotificationFeed::default().shared();
        feed.write().apply_at(&user_event("user:created", "old@x.com"), t0());
        let fresh = feed.write().apply(&user_event("user:created", "a@x.com")).unwrap();

        let copy = NotificationFeed::snapshot(&feed);
        assert_eq!(copy.entries().map(|e| e.id).collect::<Vec<_>>(), vec![fresh]);

        // Lock is free and later events don't touch the copy
        feed.write().apply(&user_event("user:deleted", "a@x.com"));
        assert_eq!(feed.read().len(), 2);
        assert_eq!(copy.len(), 1);
        assert_eq!(copy.total_received(), 2);
    }
}
