//! Realtime channel handler.
//!
//! Viewers only listen on this socket; messages are sent through the HTTP API.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::broadcast::error::RecvError;

use crate::{
    domain::{RoomEvent, RoomId, RoomSubscription},
    infrastructure::dto::realtime::RealtimeEvent,
    ui::{access::RoomRequest, error::ApiError, state::AppState},
};

/// `GET /realtime?roomId=`
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    request: RoomRequest,
) -> Result<Response, ApiError> {
    let access = state.authorize(request).await?;

    // Subscribe before the upgrade completes so no event published in between is missed.
    let subscription = state
        .subscribe_room_usecase
        .execute(&access.room_id)
        .await;
    let room_id = access.room_id;

    tracing::info!("Viewer subscribed to room '{}'", room_id);
    Ok((
        access.cookie,
        ws.on_upgrade(move |socket| handle_socket(socket, room_id, subscription)),
    )
        .into_response())
}

/// Forwards room events to the socket until the room is destroyed or the viewer leaves.
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    room_id: RoomId,
    mut subscription: RoomSubscription,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = match subscription.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    // The viewer recovers missed messages through a refetch.
                    tracing::warn!(
                        "Viewer of room '{}' lagged behind, {} events skipped",
                        room_id,
                        skipped
                    );
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let is_destroy = matches!(event, RoomEvent::Destroyed);
            let frame = match serde_json::to_string(&RealtimeEvent::from(event)) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize event for room '{}': {}", room_id, e);
                    continue;
                }
            };

            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
            if is_destroy {
                tracing::info!("Room '{}' destroyed, closing viewer socket", room_id);
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, room_id: RoomId, subscription: RoomSubscription) {
    let (sender, mut receiver) = socket.split();

    let room_id_for_recv = room_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => {
                    tracing::debug!("Viewer of room '{}' requested close", room_id_for_recv);
                    break;
                }
                Message::Text(_) | Message::Binary(_) => {
                    tracing::debug!(
                        "Ignoring inbound frame on room '{}' realtime channel",
                        room_id_for_recv
                    );
                }
                // Ping/pong is handled by the WebSocket protocol layer
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(room_id.clone(), subscription, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    tracing::info!("Viewer left room '{}'", room_id);
}
