//! Stored event documents

use chrono::{DateTime, Utc};
use mongodb::bson::{self, Document};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::context::RequestContext;
use crate::sanitize::{sanitize_email, sanitize_user_agent};

/// `event_type` written by login recording.
pub const LOGIN_EVENT: &str = "login";

/// `event_type` written by logout recording.
pub const LOGOUT_EVENT: &str = "logout";

/// The two collections events are written to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum LogCollection {
    /// Authentication attempts (login/logout)
    LoginEvents,
    /// Everything users do once authenticated
    ActionEvents,
}

impl LogCollection {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Request metadata as stored, after sanitization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpMetadata {
    pub ip: String,
    pub method: String,
    pub path: String,
    pub user_agent: String,
}

impl From<&RequestContext> for HttpMetadata {
    fn from(ctx: &RequestContext) -> Self {
        Self {
            ip: ctx.ip.clone(),
            method: ctx.method.clone(),
            path: ctx.path.clone(),
            user_agent: sanitize_user_agent(ctx.user_agent.as_deref()),
        }
    }
}

/// An immutable login or action record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Null for anonymous or failed attempts where the user is unknown
    pub user_id: Option<i64>,

    /// Sanitized email, present even for anonymous flows
    pub email: String,

    pub event_type: String,

    /// UTC write time; the purge cutoff and TTL index key
    pub timestamp: bson::DateTime,

    pub http_metadata: HttpMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Document>,
}

impl LogEvent {
    /// Build an event stamped with the current time.
    pub fn new(
        user_id: Option<i64>,
        email: &str,
        event_type: impl Into<String>,
        ctx: &RequestContext,
    ) -> Self {
        Self {
            user_id,
            email: sanitize_email(email),
            event_type: event_type.into(),
            timestamp: bson::DateTime::now(),
            http_metadata: HttpMetadata::from(ctx),
            details: None,
        }
    }

    /// Builder: attach details, ignoring an absent or empty document
    pub fn with_details(mut self, details: Option<Document>) -> Self {
        self.details = details.filter(|d| !d.is_empty());
        self
    }

    /// Builder: override the timestamp (backfills and tests)
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = to_bson_datetime(timestamp);
        self
    }
}

/// Convert chrono DateTime to BSON DateTime
pub(crate) fn to_bson_datetime(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

/// Documents removed by one purge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    pub cutoff: DateTime<Utc>,
    pub login_events: u64,
    pub action_events: u64,
}

impl PurgeReport {
    pub fn total(&self) -> u64 {
        self.login_events + self.action_events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use mongodb::bson::doc;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_collection_names() {
        assert_eq!(LogCollection::LoginEvents.name(), "login_events");
        assert_eq!(LogCollection::ActionEvents.to_string(), "action_events");
        assert_eq!(
            LogCollection::from_str("login_events").unwrap(),
            LogCollection::LoginEvents
        );
        assert_eq!(LogCollection::iter().count(), 2);
    }

    #[test]
    fn test_event_is_sanitized_and_enriched() {
        let ctx = RequestContext::new("203.0.113.1", "POST", "/login");
        let event = LogEvent::new(Some(7), "  reader@example.com ", LOGIN_EVENT, &ctx);

        assert_eq!(event.email, "reader@example.com");
        assert_eq!(event.http_metadata.user_agent, "unknown");
        assert_eq!(event.http_metadata.path, "/login");
        assert!(event.details.is_none());
    }

    #[test]
    fn test_empty_details_are_dropped() {
        let ctx = RequestContext::detached();
        let event = LogEvent::new(None, "a@b.com", "view_book", &ctx).with_details(Some(doc! {}));
        assert!(event.details.is_none());

        let event = event.with_details(Some(doc! { "book_id": 3 }));
        assert_eq!(event.details.unwrap().get_i32("book_id").unwrap(), 3);
    }

    #[test]
    fn test_serialized_shape() {
        let ctx = RequestContext::new("1.2.3.4", "GET", "/").with_user_agent("curl/8");
        let event = LogEvent::new(None, "anon@example.com", LOGOUT_EVENT, &ctx);
        let document = bson::to_document(&event).unwrap();

        assert!(document.contains_key("user_id"));
        assert!(document.get("user_id").unwrap().as_null().is_some());
        assert!(!document.contains_key("details"));
        assert!(document.get_datetime("timestamp").is_ok());
        assert_eq!(
            document
                .get_document("http_metadata")
                .unwrap()
                .get_str("user_agent")
                .unwrap(),
            "curl/8"
        );
    }

    #[test]
    fn test_with_timestamp_round_trips_millis() {
        let when = Utc::now() - Duration::days(91);
        let event = LogEvent::new(None, "a@b.com", "x", &RequestContext::detached())
            .with_timestamp(when);
        assert_eq!(event.timestamp.timestamp_millis(), when.timestamp_millis());
    }
}
