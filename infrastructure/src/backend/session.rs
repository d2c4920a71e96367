//! WebSocket chat session and its connector.
//!
//! `open()` performs the handshake and spawns a background reader task that
//! forwards text frames to an mpsc channel and runs the close handlers once
//! the socket ends, whatever the cause.

use super::protocol::OutgoingMessage;
use super::transport::{FrameKind, classify_frame};
use async_trait::async_trait;
use chatlink_application::{
    ChatSession, ChatSessionConnector, CloseHandler, CloseReason, IncomingMessages,
    SessionIoError, SessionOpenError, SessionParams,
};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, Message>;
type WsReader = SplitStream<WsStream>;

pub const CONNECTION_ID_HEADER: &str = "X-Connection-Id";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct CloseState {
    handlers: Vec<CloseHandler>,
    reason: Option<CloseReason>,
}

/// Close handlers plus the reason they ran with, shared with the reader task.
#[derive(Default)]
struct CloseSignal {
    state: Mutex<CloseState>,
    local: AtomicBool,
}

impl CloseSignal {
    fn register(&self, handler: CloseHandler) {
        let mut state = lock(&self.state);
        if let Some(reason) = state.reason.clone() {
            drop(state);
            handler(reason);
        } else {
            state.handlers.push(handler);
        }
    }

    /// Runs every registered handler; later calls are no-ops.
    fn fire(&self, reason: CloseReason) {
        let handlers = {
            let mut state = lock(&self.state);
            if state.reason.is_some() {
                return;
            }
            state.reason = Some(reason.clone());
            std::mem::take(&mut state.handlers)
        };
        for handler in handlers {
            handler(reason.clone());
        }
    }

    fn is_fired(&self) -> bool {
        lock(&self.state).reason.is_some()
    }

    fn mark_local(&self) {
        self.local.store(true, Ordering::SeqCst);
    }

    fn is_local(&self) -> bool {
        self.local.load(Ordering::SeqCst)
    }
}

/// Chat session over a WebSocket connection.
pub struct WebSocketChatSession {
    params: SessionParams,
    opened: AtomicBool,
    writer: tokio::sync::Mutex<Option<WsWriter>>,
    close: Arc<CloseSignal>,
    incoming_tx: Mutex<Option<mpsc::UnboundedSender<String>>>,
    incoming_rx: Mutex<Option<IncomingMessages>>,
    reader: Mutex<Option<JoinHandle<()>>>,
    shutdown: CancellationToken,
}

impl WebSocketChatSession {
    pub fn new(params: SessionParams) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            params,
            opened: AtomicBool::new(false),
            writer: tokio::sync::Mutex::new(None),
            close: Arc::new(CloseSignal::default()),
            incoming_tx: Mutex::new(Some(tx)),
            incoming_rx: Mutex::new(Some(rx)),
            reader: Mutex::new(None),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    /// Take the receiver of incoming text frames (first call only).
    pub fn take_incoming(&self) -> Option<IncomingMessages> {
        lock(&self.incoming_rx).take()
    }

    fn handshake_request(&self) -> Result<Request, SessionOpenError> {
        let descriptor = &self.params.descriptor;
        let mut request = descriptor
            .websocket_url()
            .into_client_request()
            .map_err(|e| SessionOpenError::InvalidEndpoint(e.to_string()))?;

        let auth = HeaderValue::from_str(&format!("Bearer {}", descriptor.participant_token()))
            .map_err(|_| {
                SessionOpenError::Handshake("participant token is not a valid header".to_string())
            })?;
        let connection = HeaderValue::from_str(descriptor.connection_id()).map_err(|_| {
            SessionOpenError::Handshake("connection id is not a valid header".to_string())
        })?;

        let headers = request.headers_mut();
        headers.insert("Authorization", auth);
        headers.insert(CONNECTION_ID_HEADER, connection);
        Ok(request)
    }

    async fn connect(&self) -> Result<(), SessionOpenError> {
        let request = self.handshake_request()?;
        let (stream, response) = connect_async(request).await.map_err(map_connect_error)?;
        debug!(
            "WebSocket handshake for contact {} answered with {}",
            self.contact_id(),
            response.status()
        );

        let (writer, reader) = stream.split();
        *self.writer.lock().await = Some(writer);

        let incoming = lock(&self.incoming_tx).take();
        let handle = tokio::spawn(read_loop(
            reader,
            incoming,
            Arc::clone(&self.close),
            self.shutdown.clone(),
            self.contact_id().to_string(),
        ));
        *lock(&self.reader) = Some(handle);
        Ok(())
    }

    fn not_usable(&self) -> SessionIoError {
        if self.opened.load(Ordering::SeqCst) {
            SessionIoError::Closed
        } else {
            SessionIoError::NotOpen
        }
    }
}

fn map_connect_error(error: WsError) -> SessionOpenError {
    match error {
        WsError::Http(response) => {
            SessionOpenError::Handshake(format!("server answered {}", response.status()))
        }
        WsError::Url(e) => SessionOpenError::InvalidEndpoint(e.to_string()),
        other => SessionOpenError::Connect(other.to_string()),
    }
}

async fn read_loop(
    mut reader: WsReader,
    incoming: Option<mpsc::UnboundedSender<String>>,
    close: Arc<CloseSignal>,
    shutdown: CancellationToken,
    contact_id: String,
) {
    let reason = loop {
        tokio::select! {
            _ = shutdown.cancelled() => break CloseReason::Local,
            frame = reader.next() => match frame {
                None => break CloseReason::Dropped("connection ended".to_string()),
                Some(Err(e)) => break CloseReason::Dropped(e.to_string()),
                Some(Ok(message)) => match classify_frame(message) {
                    FrameKind::Text(text) => {
                        if let Some(tx) = &incoming {
                            let _ = tx.send(text);
                        }
                    }
                    FrameKind::Close { .. } if close.is_local() => break CloseReason::Local,
                    FrameKind::Close { code, reason } => break CloseReason::Remote { code, reason },
                    FrameKind::Binary(len) => trace!("Ignoring {} byte binary frame", len),
                    FrameKind::Control => {}
                },
            },
        }
    };

    match &reason {
        CloseReason::Local => debug!("Session for contact {} closed locally", contact_id),
        other => info!("Session for contact {} ended: {:?}", contact_id, other),
    }
    // Dropping the sender ends the incoming stream before handlers run
    drop(incoming);
    close.fire(reason);
}

#[async_trait]
impl ChatSession for WebSocketChatSession {
    fn contact_id(&self) -> &str {
        self.params.descriptor.contact_id()
    }

    fn connection_id(&self) -> &str {
        self.params.descriptor.connection_id()
    }

    fn on_close(&self, handler: CloseHandler) {
        self.close.register(handler);
    }

    async fn open(&self) -> Result<(), SessionOpenError> {
        if self.opened.swap(true, Ordering::SeqCst) {
            return Err(SessionOpenError::AlreadyOpen);
        }
        if let Err(e) = self.connect().await {
            warn!("Could not open session for contact {}: {}", self.contact_id(), e);
            self.opened.store(false, Ordering::SeqCst);
            return Err(e);
        }
        info!("Session open for contact {}", self.contact_id());
        Ok(())
    }

    async fn send_message(&self, content: &str) -> Result<(), SessionIoError> {
        if self.close.is_fired() {
            return Err(SessionIoError::Closed);
        }
        let frame = serde_json::to_string(&OutgoingMessage::text(content))
            .map_err(|e| SessionIoError::Send(e.to_string()))?;

        let mut writer = self.writer.lock().await;
        let Some(sink) = writer.as_mut() else {
            return Err(self.not_usable());
        };
        sink.send(Message::Text(frame.into()))
            .await
            .map_err(|e| SessionIoError::Send(e.to_string()))
    }

    async fn close(&self) -> Result<(), SessionIoError> {
        let Some(mut sink) = self.writer.lock().await.take() else {
            return Err(self.not_usable());
        };
        if self.close.is_fired() {
            return Err(SessionIoError::Closed);
        }

        self.close.mark_local();
        if let Err(e) = sink.send(Message::Close(None)).await {
            debug!("Close frame not delivered: {}", e);
        }
        self.shutdown.cancel();

        let reader = lock(&self.reader).take();
        if let Some(handle) = reader
            && let Err(e) = handle.await
        {
            warn!("Session reader task failed: {}", e);
        }
        Ok(())
    }

    fn incoming(&self) -> Option<IncomingMessages> {
        self.take_incoming()
    }
}

impl Drop for WebSocketChatSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Builds [`WebSocketChatSession`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl ChatSessionConnector for WebSocketConnector {
    fn connect(&self, params: SessionParams) -> Arc<dyn ChatSession> {
        Arc::new(WebSocketChatSession::new(params))
    }
}
