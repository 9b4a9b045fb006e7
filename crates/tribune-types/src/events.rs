use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Notification, NotificationType, Role};

/// Events pushed from the server to gateway clients.
///
/// Wire format: `{"event": "<name>", "data": {...}}` — event names are part
/// of the client contract and must stay stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum GatewayEvent {
    /// Sent once after a successful handshake.
    Ready {
        user_id: Uuid,
        name: String,
        role: Role,
    },

    /// A durable notification was created for the receiving user.
    NewNotification { notification: Notification },

    /// Unread OPINION_SUBMITTED count for the shared admin inbox.
    AdminNotificationCount { count: i64 },

    /// Lightweight UI hint that a moderation decision landed. Sent in
    /// addition to the durable `new_notification`, never instead of it.
    OpinionStatusUpdate {
        #[serde(rename = "type")]
        kind: NotificationType,
        message: String,
        opinion_id: Uuid,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn event_names_match_wire_contract() {
        let count = serde_json::to_value(GatewayEvent::AdminNotificationCount { count: 3 }).unwrap();
        assert_eq!(count["event"], "admin_notification_count");
        assert_eq!(count["data"]["count"], 3);

        let status = serde_json::to_value(GatewayEvent::OpinionStatusUpdate {
            kind: NotificationType::OpinionApproved,
            message: "ok".into(),
            opinion_id: Uuid::nil(),
        })
        .unwrap();
        assert_eq!(status["event"], "opinion_status_update");
        assert_eq!(status["data"]["type"], "OPINION_APPROVED");
    }

    #[test]
    fn notification_serialises_type_field() {
        let n = Notification {
            id: Uuid::nil(),
            kind: NotificationType::OpinionSubmitted,
            message: "m".into(),
            user_id: Uuid::nil(),
            opinion_id: None,
            read: false,
            created_at: Utc::now(),
        };
        let event = serde_json::to_value(GatewayEvent::NewNotification { notification: n }).unwrap();
        assert_eq!(event["event"], "new_notification");
        assert_eq!(event["data"]["notification"]["type"], "OPINION_SUBMITTED");
    }
}
