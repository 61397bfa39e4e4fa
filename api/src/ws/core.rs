use axum::extract::ws::{Message, WebSocket};
use common::state::AppState;
use common::ws::{WebSocketManager, emit as emit_enveloped};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

/// An event knows its stable name and the topic it belongs to.
pub trait Event: Serialize {
    const NAME: &'static str;
    /// Return the canonical topic path (e.g., "lecture:42").
    fn topic_path(&self) -> String;
}

pub async fn emit<E>(ws: &WebSocketManager, ev: &E)
where
    E: Event,
{
    let topic = ev.topic_path();
    emit_enveloped(ws, &topic, E::NAME, ev).await;
}

/// One-way subscribe-and-forward loop shared by every topic handler. Client
/// frames other than Close are ignored.
pub async fn forward_topic(mut socket: WebSocket, app_state: AppState, topic: String) {
    let mut rx = app_state.ws().subscribe(&topic).await;
    log::debug!("ws subscriber attached to {topic}");

    loop {
        tokio::select! {
            published = rx.recv() => match published {
                Ok(text) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                // Slow consumer skipped messages; state is recoverable over REST.
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("ws subscriber on {topic} lagged, skipped {skipped}");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    log::debug!("ws subscriber detached from {topic}");
}
