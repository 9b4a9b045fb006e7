use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use tribune_types::events::GatewayEvent;
use tribune_types::models::Principal;

/// A named broadcast target: one room per user, plus the shared admin room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    User(Uuid),
    Admins,
}

impl Room {
    pub fn key(&self) -> String {
        match self {
            Room::User(id) => format!("user:{id}"),
            Room::Admins => "admin".to_string(),
        }
    }
}

/// Manages room membership for all live connections and fans events out to
/// them. Explicitly constructed at startup and handed to whoever needs to
/// push — never a global.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    /// room key -> (connection id -> per-connection sender).
    /// One unbounded channel per connection keeps delivery FIFO per room
    /// per connection. Membership is only mutated by the owning
    /// connection's register/unregister.
    rooms: RwLock<HashMap<String, HashMap<Uuid, mpsc::UnboundedSender<GatewayEvent>>>>,
}

impl Gateway {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                rooms: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Register a connection for an authenticated principal.
    /// Joins `user:{id}` unconditionally and `admin` iff the principal is an
    /// admin — membership is fixed here; role changes apply on reconnect.
    /// Returns (conn_id, receiver).
    pub async fn register(
        &self,
        principal: &Principal,
    ) -> (Uuid, mpsc::UnboundedReceiver<GatewayEvent>) {
        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut rooms = self.inner.rooms.write().await;
        rooms
            .entry(Room::User(principal.id).key())
            .or_default()
            .insert(conn_id, tx.clone());
        if principal.is_admin() {
            rooms
                .entry(Room::Admins.key())
                .or_default()
                .insert(conn_id, tx);
        }

        (conn_id, rx)
    }

    /// Drop every room membership held by this connection.
    pub async fn unregister(&self, conn_id: Uuid) {
        let mut rooms = self.inner.rooms.write().await;
        rooms.retain(|_, members| {
            members.remove(&conn_id);
            !members.is_empty()
        });
    }

    /// Best-effort delivery to every open connection in `user:{user_id}`.
    /// Silently succeeds when no connection is present.
    pub async fn push_to_user(&self, user_id: Uuid, event: GatewayEvent) {
        self.push_to_room(&Room::User(user_id), event).await;
    }

    /// Best-effort delivery to every open connection in the admin room.
    pub async fn push_to_admins(&self, event: GatewayEvent) {
        self.push_to_room(&Room::Admins, event).await;
    }

    async fn push_to_room(&self, room: &Room, event: GatewayEvent) {
        let rooms = self.inner.rooms.read().await;
        if let Some(members) = rooms.get(&room.key()) {
            for tx in members.values() {
                // A closed receiver just means the connection is tearing
                // down; the push stays best-effort.
                let _ = tx.send(event.clone());
            }
        }
    }

    /// Number of live connections in a room. Used by tests and logging.
    pub async fn room_size(&self, room: &Room) -> usize {
        let rooms = self.inner.rooms.read().await;
        rooms.get(&room.key()).map_or(0, HashMap::len)
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribune_types::models::Role;

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            name: "Test".into(),
            email: "test@example.com".into(),
            role,
            image: None,
        }
    }

    #[tokio::test]
    async fn user_connection_joins_only_its_own_room() {
        let gateway = Gateway::new();
        let p = principal(Role::User);

        let (_conn, _rx) = gateway.register(&p).await;

        assert_eq!(gateway.room_size(&Room::User(p.id)).await, 1);
        assert_eq!(gateway.room_size(&Room::Admins).await, 0);
    }

    #[tokio::test]
    async fn admin_connection_joins_admin_room() {
        let gateway = Gateway::new();
        let p = principal(Role::Admin);

        let (_conn, _rx) = gateway.register(&p).await;

        assert_eq!(gateway.room_size(&Room::User(p.id)).await, 1);
        assert_eq!(gateway.room_size(&Room::Admins).await, 1);
    }

    #[tokio::test]
    async fn admin_broadcast_reaches_each_connection_exactly_once() {
        let gateway = Gateway::new();
        let p = principal(Role::Admin);

        // Same admin, two live connections
        let (_c1, mut rx1) = gateway.register(&p).await;
        let (_c2, mut rx2) = gateway.register(&p).await;

        gateway
            .push_to_admins(GatewayEvent::AdminNotificationCount { count: 7 })
            .await;

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.unwrap() {
                GatewayEvent::AdminNotificationCount { count } => assert_eq!(count, 7),
                other => panic!("unexpected event: {other:?}"),
            }
            assert!(rx.try_recv().is_err(), "event delivered more than once");
        }
    }

    #[tokio::test]
    async fn push_to_absent_user_is_a_silent_no_op() {
        let gateway = Gateway::new();
        gateway
            .push_to_user(Uuid::new_v4(), GatewayEvent::AdminNotificationCount { count: 1 })
            .await;
    }

    #[tokio::test]
    async fn unregister_drops_all_memberships() {
        let gateway = Gateway::new();
        let p = principal(Role::Admin);

        let (conn, mut rx) = gateway.register(&p).await;
        gateway.unregister(conn).await;

        assert_eq!(gateway.room_size(&Room::User(p.id)).await, 0);
        assert_eq!(gateway.room_size(&Room::Admins).await, 0);

        gateway
            .push_to_user(p.id, GatewayEvent::AdminNotificationCount { count: 1 })
            .await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn events_arrive_in_push_order() {
        let gateway = Gateway::new();
        let p = principal(Role::User);
        let (_conn, mut rx) = gateway.register(&p).await;

        for count in 0..5 {
            gateway
                .push_to_user(p.id, GatewayEvent::AdminNotificationCount { count })
                .await;
        }

        for expected in 0..5 {
            match rx.recv().await.unwrap() {
                GatewayEvent::AdminNotificationCount { count } => assert_eq!(count, expected),
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }
}
