//! Opinion lifecycle: submission lands in PENDING, an admin decision moves
//! it to APPROVED or REJECTED. Each transition persists first, then fires
//! best-effort realtime pushes through the notification engine.

use tribune_db::Database;
use tribune_gateway::rooms::Gateway;
use tribune_types::api::{DecideOpinionRequest, SubmitOpinionRequest};
use tribune_types::events::GatewayEvent;
use tribune_types::models::{NotificationType, Opinion, OpinionStatus, Principal};
use uuid::Uuid;

use crate::convert;
use crate::error::ApiError;
use crate::notify::NotificationEngine;

/// Create a PENDING opinion and raise the admin-facing submission
/// notification. The notification row records the author as recipient for
/// audit purposes; its effective audience is the admin room.
pub async fn submit(
    db: &Database,
    notifier: &NotificationEngine,
    author: &Principal,
    draft: SubmitOpinionRequest,
) -> Result<Opinion, ApiError> {
    if draft.title.trim().is_empty() || draft.content.trim().is_empty() {
        return Err(ApiError::Validation("Title and content are required".into()));
    }

    let row = db.insert_opinion(
        &Uuid::new_v4().to_string(),
        &draft.title,
        &draft.content,
        draft.category.as_deref(),
        draft.sub_category.as_deref(),
        draft.image_url.as_deref(),
        &author.id.to_string(),
    )?;
    let opinion = convert::opinion_from_row(row);

    let message = format!("New opinion submitted by {}: \"{}\"", author.name, opinion.title);
    notifier
        .notify(author.id, NotificationType::OpinionSubmitted, message, Some(opinion.id))
        .await?;

    Ok(opinion)
}

/// Apply an admin decision. The overwrite is unconditional: re-deciding an
/// already-decided opinion replaces the status and notifies again (original
/// portal behaviour, kept — see DESIGN.md).
pub async fn decide(
    db: &Database,
    notifier: &NotificationEngine,
    gateway: &Gateway,
    admin: &Principal,
    opinion_id: Uuid,
    req: DecideOpinionRequest,
) -> Result<Opinion, ApiError> {
    if !admin.is_admin() {
        return Err(ApiError::Forbidden);
    }

    let status = match req.status.parse::<OpinionStatus>() {
        Ok(status @ (OpinionStatus::Approved | OpinionStatus::Rejected)) => status,
        _ => return Err(ApiError::Validation("Invalid status".into())),
    };

    let row = db
        .update_opinion_status(&opinion_id.to_string(), status.as_str())?
        .ok_or(ApiError::NotFound("Opinion not found"))?;
    let opinion = convert::opinion_from_row(row);

    let (kind, message) = match status {
        OpinionStatus::Approved => (
            NotificationType::OpinionApproved,
            format!("Your opinion \"{}\" has been approved", opinion.title),
        ),
        _ => (
            NotificationType::OpinionRejected,
            match req.rejection_reason.as_deref() {
                Some(reason) if !reason.trim().is_empty() => {
                    format!("Your opinion \"{}\" was rejected: {}", opinion.title, reason)
                }
                _ => format!("Your opinion \"{}\" was rejected", opinion.title),
            },
        ),
    };

    // Durable notification plus the lighter UI event — both fire.
    notifier
        .notify(opinion.author_id, kind, message.clone(), Some(opinion.id))
        .await?;
    gateway
        .push_to_user(
            opinion.author_id,
            GatewayEvent::OpinionStatusUpdate { kind, message, opinion_id: opinion.id },
        )
        .await;

    Ok(opinion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tribune_types::models::Role;

    fn principal(id: Uuid, name: &str, role: Role) -> Principal {
        Principal {
            id,
            name: name.into(),
            email: format!("{id}@example.com"),
            role,
            image: None,
        }
    }

    fn draft(title: &str, content: &str) -> SubmitOpinionRequest {
        SubmitOpinionRequest {
            title: title.into(),
            content: content.into(),
            category: None,
            sub_category: None,
            image_url: None,
        }
    }

    fn decision(status: &str, reason: Option<&str>) -> DecideOpinionRequest {
        DecideOpinionRequest {
            status: status.into(),
            rejection_reason: reason.map(String::from),
        }
    }

    struct Fixture {
        db: Arc<Database>,
        notifier: NotificationEngine,
        gateway: Gateway,
        author: Principal,
        admin: Principal,
    }

    fn fixture() -> Fixture {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let author = principal(Uuid::new_v4(), "Rahim", Role::User);
        let admin = principal(Uuid::new_v4(), "Desk", Role::Admin);
        for p in [&author, &admin] {
            db.create_user(&p.id.to_string(), &p.name, &p.email, "hash", p.role.as_str())
                .unwrap();
        }
        let gateway = Gateway::new();
        let notifier = NotificationEngine::new(db.clone(), gateway.clone());
        Fixture { db, notifier, gateway, author, admin }
    }

    #[tokio::test]
    async fn submit_creates_pending_opinion_and_one_submission_row() {
        let f = fixture();

        let before = f.notifier.unread_count(&f.admin).unwrap();
        let opinion = submit(&f.db, &f.notifier, &f.author, draft("X", "Y")).await.unwrap();

        assert_eq!(opinion.status, OpinionStatus::Pending);
        assert_eq!(opinion.author_id, f.author.id);

        let admin_inbox = f.notifier.list_for_admin().unwrap();
        assert_eq!(admin_inbox.len(), 1);
        assert_eq!(admin_inbox[0].kind, NotificationType::OpinionSubmitted);
        assert_eq!(admin_inbox[0].opinion_id, Some(opinion.id));
        assert_eq!(f.notifier.unread_count(&f.admin).unwrap(), before + 1);
    }

    #[tokio::test]
    async fn submit_rejects_blank_input() {
        let f = fixture();

        for (title, content) in [("", "body"), ("title", ""), ("   ", "body")] {
            let err = submit(&f.db, &f.notifier, &f.author, draft(title, content))
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
        assert_eq!(f.db.count_opinions(None).unwrap(), 0);
        assert_eq!(f.notifier.list_for_admin().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn approval_updates_status_and_notifies_author_twice() {
        let f = fixture();
        let opinion = submit(&f.db, &f.notifier, &f.author, draft("X", "Y")).await.unwrap();

        // Author is online for the decision
        let (_conn, mut rx) = f.gateway.register(&f.author).await;

        let decided = decide(
            &f.db,
            &f.notifier,
            &f.gateway,
            &f.admin,
            opinion.id,
            decision("APPROVED", None),
        )
        .await
        .unwrap();
        assert_eq!(decided.status, OpinionStatus::Approved);

        let stored = f.db.get_opinion(&opinion.id.to_string()).unwrap().unwrap();
        assert_eq!(stored.status, "APPROVED");

        // Durable notification first, UI event second
        match rx.recv().await.unwrap() {
            GatewayEvent::NewNotification { notification } => {
                assert_eq!(notification.kind, NotificationType::OpinionApproved);
                assert_eq!(notification.user_id, f.author.id);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.recv().await.unwrap() {
            GatewayEvent::OpinionStatusUpdate { kind, opinion_id, .. } => {
                assert_eq!(kind, NotificationType::OpinionApproved);
                assert_eq!(opinion_id, opinion.id);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejection_reason_lands_in_the_message() {
        let f = fixture();
        let opinion = submit(&f.db, &f.notifier, &f.author, draft("X", "Y")).await.unwrap();

        decide(
            &f.db,
            &f.notifier,
            &f.gateway,
            &f.admin,
            opinion.id,
            decision("REJECTED", Some("off topic")),
        )
        .await
        .unwrap();

        let own = f.notifier.list_for_user(&f.author).unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].kind, NotificationType::OpinionRejected);
        assert!(own[0].message.contains("off topic"));
    }

    #[tokio::test]
    async fn non_admin_decision_is_forbidden_and_mutates_nothing() {
        let f = fixture();
        let opinion = submit(&f.db, &f.notifier, &f.author, draft("X", "Y")).await.unwrap();
        let rows_before = f.notifier.list_for_admin().unwrap().len();

        let err = decide(
            &f.db,
            &f.notifier,
            &f.gateway,
            &f.author,
            opinion.id,
            decision("APPROVED", None),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));

        let stored = f.db.get_opinion(&opinion.id.to_string()).unwrap().unwrap();
        assert_eq!(stored.status, "PENDING");
        assert_eq!(f.notifier.list_for_admin().unwrap().len(), rows_before);
        assert_eq!(f.notifier.list_for_user(&f.author).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unknown_decision_value_is_rejected() {
        let f = fixture();
        let opinion = submit(&f.db, &f.notifier, &f.author, draft("X", "Y")).await.unwrap();

        for status in ["MAYBE", "PENDING", "approved", ""] {
            let err = decide(
                &f.db,
                &f.notifier,
                &f.gateway,
                &f.admin,
                opinion.id,
                decision(status, None),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)), "{status} must be invalid");
        }

        let stored = f.db.get_opinion(&opinion.id.to_string()).unwrap().unwrap();
        assert_eq!(stored.status, "PENDING");
    }

    #[tokio::test]
    async fn deciding_a_missing_opinion_is_not_found() {
        let f = fixture();
        let err = decide(
            &f.db,
            &f.notifier,
            &f.gateway,
            &f.admin,
            Uuid::new_v4(),
            decision("APPROVED", None),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn re_deciding_overwrites_status() {
        let f = fixture();
        let opinion = submit(&f.db, &f.notifier, &f.author, draft("X", "Y")).await.unwrap();

        decide(&f.db, &f.notifier, &f.gateway, &f.admin, opinion.id, decision("APPROVED", None))
            .await
            .unwrap();
        let second = decide(
            &f.db,
            &f.notifier,
            &f.gateway,
            &f.admin,
            opinion.id,
            decision("REJECTED", None),
        )
        .await
        .unwrap();
        assert_eq!(second.status, OpinionStatus::Rejected);

        // Each decision notifies again — no double-notification guard
        assert_eq!(f.notifier.list_for_user(&f.author).unwrap().len(), 2);
    }
}
