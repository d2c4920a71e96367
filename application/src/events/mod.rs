//! In-process events connecting chat initiation with the rest of the app.
//!
//! - [`bus::EventBus`] - typed publish/subscribe registry
//! - [`topics`] - the `initChat` / `endChat` topics

pub mod bus;
pub mod topics;

pub use bus::{EventBus, SubscriptionId, Topic};
pub use topics::{EndChat, InitChat, InitChatRequest};
