use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::{info, warn};

use tribune_types::events::GatewayEvent;
use tribune_types::models::Principal;

use crate::rooms::Gateway;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Drive a pre-authenticated WebSocket connection. The credential was
/// already resolved at the HTTP upgrade layer, so an unauthenticated socket
/// never reaches this point — and never appears in any room.
pub async fn serve(socket: WebSocket, gateway: Gateway, principal: Principal) {
    let (mut sender, mut receiver) = socket.split();

    info!("{} ({}) connected to gateway", principal.name, principal.id);

    let ready = GatewayEvent::Ready {
        user_id: principal.id,
        name: principal.name.clone(),
        role: principal.role,
    };
    let Ok(text) = serde_json::to_string(&ready) else {
        return;
    };
    if sender.send(Message::Text(text.into())).await.is_err() {
        return;
    }

    // Join rooms only after the Ready event went out
    let (conn_id, mut rx) = gateway.register(&principal).await;

    // Shared flag for heartbeat
    let pong_received = Arc::new(AtomicBool::new(true));
    let pong_flag_send = pong_received.clone();
    let pong_flag_recv = pong_received.clone();

    // Forward room events -> client, with heartbeat
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;
        let mut missed_heartbeats: u8 = 0;

        loop {
            tokio::select! {
                result = rx.recv() => {
                    let event = match result {
                        Some(event) => event,
                        None => break,
                    };
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("Failed to serialise gateway event: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if pong_flag_send.swap(false, Ordering::Acquire) {
                        missed_heartbeats = 0;
                    } else {
                        missed_heartbeats += 1;
                        if missed_heartbeats >= 2 {
                            warn!("Heartbeat timeout (missed {} pongs), dropping connection", missed_heartbeats);
                            break;
                        }
                    }
                    if sender.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // The push channel is one-way: clients send nothing but Pong/Close.
    // Stray text frames are logged and ignored.
    let principal_name = principal.name.clone();
    let principal_id = principal.id;
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Pong(_) => {
                    pong_flag_recv.store(true, Ordering::Release);
                }
                Message::Text(text) => {
                    warn!(
                        "{} ({}) sent an unexpected frame: {}",
                        principal_name,
                        principal_id,
                        truncate_at_boundary(&text, 200)
                    );
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    gateway.unregister(conn_id).await;
    info!("{} ({}) disconnected from gateway", principal.name, principal.id);
}

/// Cut a client-supplied string to at most `max` bytes without splitting a
/// multibyte character.
fn truncate_at_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::truncate_at_boundary;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_at_boundary("short", 200), "short");
        assert_eq!(truncate_at_boundary("abcdef", 3), "abc");

        // 'é' is two bytes; a byte cut at 3 would split the second one
        let s = "aéé";
        assert_eq!(truncate_at_boundary(s, 3), "aé");
        assert_eq!(truncate_at_boundary(s, 2), "a");

        let emoji = "💡💡";
        assert_eq!(truncate_at_boundary(emoji, 5), "💡");
    }
}
