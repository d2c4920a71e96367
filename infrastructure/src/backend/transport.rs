//! Frame classification for the WebSocket reader task.
//!
//! [`classify_frame`] is a pure function called once per frame in the
//! session's background reader loop; the loop only cares whether a frame
//! carries chat content, ends the connection, or can be ignored.

use tokio_tungstenite::tungstenite::Message;

/// What the reader loop should do with an incoming frame.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// Chat content, forwarded to the incoming channel as-is.
    Text(String),
    /// The peer started (or answered) the close handshake.
    Close { code: Option<u16>, reason: String },
    /// Ping/pong and raw frames; tungstenite answers pings itself.
    Control,
    /// Binary payloads are not part of the chat protocol.
    Binary(usize),
}

pub fn classify_frame(message: Message) -> FrameKind {
    match message {
        Message::Text(text) => FrameKind::Text(text.to_string()),
        Message::Close(Some(frame)) => FrameKind::Close {
            code: Some(u16::from(frame.code)),
            reason: frame.reason.to_string(),
        },
        Message::Close(None) => FrameKind::Close {
            code: None,
            reason: String::new(),
        },
        Message::Binary(data) => FrameKind::Binary(data.len()),
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => FrameKind::Control,
    }
}
