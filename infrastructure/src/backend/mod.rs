//! Chat backend adapters
//!
//! Implements `SessionDescriptorFactory` over HTTP (API gateway) and
//! `ChatSession` over WebSocket.

pub mod factory;
pub mod protocol;
pub mod session;
pub mod transport;
