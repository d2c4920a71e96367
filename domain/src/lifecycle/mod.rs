//! Session lifecycle value objects.

pub mod language;
pub mod state;
