//! Builds enriched events and writes them without ever failing the caller.

use crate::context::RequestContext;
use crate::error::Result;
use crate::models::{LOGIN_EVENT, LOGOUT_EVENT, LogCollection, LogEvent};
use crate::store::LogEventStore;
use mongodb::bson::{Document, doc};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Turns recording requests into stored [`LogEvent`]s.
///
/// Cheap to clone; all clones share the same store.
#[derive(Clone)]
pub struct EventRecorder {
    store: Arc<dyn LogEventStore>,
}

impl EventRecorder {
    pub fn new(store: Arc<dyn LogEventStore>) -> Self {
        Self { store }
    }

    /// Build and insert an event, surfacing the failure kind.
    #[instrument(skip_all, fields(%collection, event_type = %event_type, user_id = ?user_id))]
    pub async fn try_record(
        &self,
        collection: LogCollection,
        ctx: &RequestContext,
        user_id: Option<i64>,
        email: &str,
        event_type: &str,
        metadata: Option<Document>,
    ) -> Result<LogEvent> {
        let event = LogEvent::new(user_id, email, event_type, ctx).with_details(metadata);
        self.store.insert(collection, &event).await?;
        debug!("Activity event stored");
        Ok(event)
    }

    /// Like [`try_record`](Self::try_record) but logs failures and returns
    /// `false` instead.
    pub async fn record(
        &self,
        collection: LogCollection,
        ctx: &RequestContext,
        user_id: Option<i64>,
        email: &str,
        event_type: &str,
        metadata: Option<Document>,
    ) -> bool {
        match self
            .try_record(collection, ctx, user_id, email, event_type, metadata)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    error = %e,
                    %collection,
                    event_type,
                    "Failed to record activity event"
                );
                false
            }
        }
    }

    /// Record a login attempt, successful or not.
    ///
    /// `ip_addr` is the address the auth flow saw and is stored in `details`
    /// alongside the one resolved from `ctx`.
    pub async fn log_login(
        &self,
        ctx: &RequestContext,
        user_id: Option<i64>,
        email: &str,
        role: Option<&str>,
        status: &str,
        ip_addr: &str,
    ) -> bool {
        let details = doc! { "status": status, "role": role, "ip": ip_addr };
        self.record(
            LogCollection::LoginEvents,
            ctx,
            user_id,
            email,
            LOGIN_EVENT,
            Some(details),
        )
        .await
    }

    pub async fn log_logout(
        &self,
        ctx: &RequestContext,
        user_id: Option<i64>,
        email: &str,
        role: Option<&str>,
    ) -> bool {
        self.record(
            LogCollection::LoginEvents,
            ctx,
            user_id,
            email,
            LOGOUT_EVENT,
            Some(doc! { "role": role }),
        )
        .await
    }

    /// Record a user action. Keys in `extra` override `role` on collision.
    pub async fn log_action(
        &self,
        ctx: &RequestContext,
        user_id: Option<i64>,
        email: &str,
        role: &str,
        action_type: &str,
        extra: Document,
    ) -> bool {
        let mut details = doc! { "role": role };
        for (key, value) in extra {
            details.insert(key, value);
        }

        self.record(
            LogCollection::ActionEvents,
            ctx,
            user_id,
            email,
            action_type,
            Some(details),
        )
        .await
    }
}
