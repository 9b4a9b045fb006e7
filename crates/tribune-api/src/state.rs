use std::sync::Arc;

use tribune_db::Database;
use tribune_gateway::rooms::Gateway;

use crate::notify::NotificationEngine;

pub type AppState = Arc<AppStateInner>;

/// Shared application state. The gateway and notification engine are built
/// once at startup and injected here — no module-level singletons.
pub struct AppStateInner {
    pub db: Arc<Database>,
    pub jwt_secret: String,
    pub gateway: Gateway,
    pub notifier: NotificationEngine,
}
