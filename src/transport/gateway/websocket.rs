use super::{AppState, SESSION_EVENT_BUFFER};
use crate::error::PipelineError;
use crate::pipeline::{ChannelSink, GenerationRequest, Orchestrator, PipelineEvent};
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let session_id = uuid::Uuid::new_v4();
        handle_socket(socket, state).instrument(tracing::info_span!("session", %session_id))
    })
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let request = match read_request(&mut receiver).await {
        Some(Ok(request)) => request,
        Some(Err(err)) => {
            tracing::warn!("Rejected request: {err}");
            let _ = send_event(&mut sender, &PipelineEvent::error(&err)).await;
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
        None => {
            tracing::debug!("Client left before sending a request");
            return;
        }
    };
    tracing::info!(topic = request.topic(), style_source = request.style_source(), "Session started");

    let cancel = CancellationToken::new();

    // Any later frame other than a ping means the client is done with us.
    let reader_cancel = cancel.clone();
    let reader = tokio::spawn(async move {
        while let Some(message) = receiver.next().await {
            match message {
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
        reader_cancel.cancel();
    });

    let (tx, mut rx) = mpsc::channel(SESSION_EVENT_BUFFER);
    let sink = ChannelSink::new(tx);
    let pipeline_cancel = cancel.clone();
    let pipeline = async move {
        let mut orchestrator = Orchestrator::new(state.services);
        orchestrator.run(&request, &sink, &pipeline_cancel).await
    };

    let writer_cancel = cancel.clone();
    let writer = async move {
        while let Some(event) = rx.recv().await {
            if send_event(&mut sender, &event).await.is_err() {
                writer_cancel.cancel();
                break;
            }
        }
        sender
    };

    let (outcome, mut sender) = tokio::join!(pipeline, writer);
    match outcome {
        Ok(result) => tracing::info!(validated = result.metadata.validated, "Session complete"),
        Err(PipelineError::ConnectionClosed) => tracing::info!("Session cancelled by client"),
        Err(err) => tracing::warn!("Session failed: {err}"),
    }

    if !cancel.is_cancelled() {
        let _ = sender.send(Message::Close(None)).await;
    }
    reader.abort();
}

/// Wait for the single inbound text frame. `None` when the client leaves first.
async fn read_request(
    receiver: &mut SplitStream<WebSocket>,
) -> Option<Result<GenerationRequest, PipelineError>> {
    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => return Some(GenerationRequest::from_json(text.as_str())),
            Ok(Message::Binary(_)) => {
                return Some(Err(PipelineError::InvalidRequest(
                    "expected a JSON text frame".into(),
                )));
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Ok(Message::Close(_)) => return None,
            Err(e) => {
                tracing::debug!("websocket receive error: {e}");
                return None;
            }
        }
    }
    None
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &PipelineEvent,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(axum::Error::new)?;
    sender.send(Message::Text(json.into())).await
}
