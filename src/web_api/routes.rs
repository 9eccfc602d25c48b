//! API Routes

use axum::{
    extract::{
        rejection::JsonRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::error::Error;
use crate::incident_store::{Incident, IncidentSubmission};
use crate::realtime_hub::{ChannelSubscriber, Subscriber};
use crate::state::AppState;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & Status
        .route("/healthz", get(super::health_check))
        .route("/api/status", get(super::hub_status))
        // Incidents
        .route("/incident", post(create_incident))
        .route("/incidents", get(list_incidents))
        // WebSocket
        .route("/ws", get(websocket_handler))
        .with_state(state)
}

// ========================================
// Incident Handlers
// ========================================

/// Receive an incident from a camera detector and broadcast it
/// POST /incident
async fn create_incident(
    State(state): State<AppState>,
    payload: Result<Json<IncidentSubmission>, JsonRejection>,
) -> Result<Json<Incident>, Error> {
    let Json(submission) = payload.map_err(|e| match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => Error::PayloadTooLarge(e.body_text()),
        _ => Error::Validation(e.body_text()),
    })?;
    let incident = state.incidents.ingest(submission).await?;
    Ok(Json(incident))
}

/// Retained incidents, oldest first
/// GET /incidents
async fn list_incidents(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.incidents.history().await)
}

// ========================================
// WebSocket Handler
// ========================================

/// WebSocket upgrade handler
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Handle WebSocket connection
async fn handle_websocket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let (subscriber, mut rx) = ChannelSubscriber::new();
    let conn_id = subscriber.id();

    // Bootstrap is queued before registration
    match state.incidents.subscribe(Arc::new(subscriber)).await {
        Ok(backlog) => {
            tracing::info!(connection_id = %conn_id, backlog = backlog, "WebSocket client connected");
        }
        Err(e) => {
            tracing::warn!(connection_id = %conn_id, error = %e, "Failed to attach WebSocket client");
            return;
        }
    }

    // Forward queued messages to the socket until the socket fails
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // Push-only feed: inbound frames are read only to notice disconnects
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    tracing::info!(connection_id = %conn_id, "WebSocket client disconnected");
                    break;
                }
                Err(e) => {
                    tracing::warn!(connection_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.incidents.unsubscribe(&conn_id).await;
}
