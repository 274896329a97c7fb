//! User lifecycle notifications over the shared channel

pub mod channel;
pub mod feed;
pub mod types;

pub use channel::NotificationChannel;
pub use feed::{FeedEntry, NotificationFeed, SharedNotificationFeed};
pub use types::{
    Notification, NotificationDecoder, NotificationKind, Severity, UserPayload, USER_CREATED,
    USER_DELETED, USER_UPDATED,
};
