use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use tribune_db::Database;
use tribune_gateway::rooms::Gateway;
use tribune_types::events::GatewayEvent;
use tribune_types::models::{Notification, NotificationType, Principal};

use crate::convert;
use crate::error::ApiError;

/// Page size for notification listings. History beyond the cap belongs to
/// the dashboard's own pagination.
const INBOX_LIMIT: u32 = 20;

/// Sole writer of notification rows and sole caller of gateway pushes for
/// notification events. The row is the durable record; the push is
/// best-effort and never fails the enclosing request.
#[derive(Clone)]
pub struct NotificationEngine {
    db: Arc<Database>,
    gateway: Gateway,
}

impl NotificationEngine {
    pub fn new(db: Arc<Database>, gateway: Gateway) -> Self {
        Self { db, gateway }
    }

    /// Persist a notification, then push it to the recipient's room.
    /// Submissions additionally refresh the shared admin unread counter.
    /// Persist happens-before push; the two are deliberately not atomic.
    pub async fn notify(
        &self,
        recipient_id: Uuid,
        kind: NotificationType,
        message: String,
        opinion_id: Option<Uuid>,
    ) -> Result<Notification, ApiError> {
        let opinion_id_text = opinion_id.map(|id| id.to_string());
        let row = self.db.insert_notification(
            &Uuid::new_v4().to_string(),
            kind.as_str(),
            &message,
            &recipient_id.to_string(),
            opinion_id_text.as_deref(),
        )?;
        let notification = convert::notification_from_row(row);

        self.gateway
            .push_to_user(
                recipient_id,
                GatewayEvent::NewNotification { notification: notification.clone() },
            )
            .await;

        if kind == NotificationType::OpinionSubmitted {
            match self.db.count_unread_submitted() {
                Ok(count) => {
                    self.gateway
                        .push_to_admins(GatewayEvent::AdminNotificationCount { count })
                        .await;
                }
                Err(e) => {
                    // Best-effort counter refresh; the durable row already exists
                    warn!("Failed to recompute admin unread count: {e:#}");
                }
            }
        }

        Ok(notification)
    }

    /// Idempotent: re-marking a read notification succeeds without error.
    pub fn mark_read(&self, id: Uuid, requester: &Principal) -> Result<(), ApiError> {
        let row = self
            .db
            .get_notification(&id.to_string())?
            .ok_or(ApiError::NotFound("Notification not found"))?;

        if row.user_id != requester.id.to_string() && !requester.is_admin() {
            return Err(ApiError::Forbidden);
        }

        self.db.mark_notification_read(&id.to_string())?;
        Ok(())
    }

    /// Non-admins clear their own inbox; admins triage the shared inbox and
    /// clear every unread row system-wide. The asymmetry is intentional.
    pub fn mark_all_read(&self, requester: &Principal) -> Result<(), ApiError> {
        if requester.is_admin() {
            self.db.mark_all_read()?;
        } else {
            self.db.mark_all_read_for_user(&requester.id.to_string())?;
        }
        Ok(())
    }

    pub fn unread_count(&self, requester: &Principal) -> Result<i64, ApiError> {
        let count = if requester.is_admin() {
            self.db.count_unread_submitted()?
        } else {
            self.db.count_unread_for_user(&requester.id.to_string())?
        };
        Ok(count)
    }

    pub fn list_for_user(&self, requester: &Principal) -> Result<Vec<Notification>, ApiError> {
        let rows = self
            .db
            .list_user_notifications(&requester.id.to_string(), INBOX_LIMIT)?;
        Ok(rows.into_iter().map(convert::notification_from_row).collect())
    }

    pub fn list_for_admin(&self) -> Result<Vec<Notification>, ApiError> {
        let rows = self.db.list_admin_notifications(INBOX_LIMIT)?;
        Ok(rows.into_iter().map(convert::notification_from_row).collect())
    }
}
