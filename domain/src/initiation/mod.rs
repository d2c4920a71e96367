//! Chat initiation domain.
//!
//! - [`input::InitiationInput`] - what the caller supplies
//! - [`descriptor::SessionDescriptor`] - what chat creation returns
//! - [`permissions::FeaturePermissions`] - capability flags carried by both

pub mod descriptor;
pub mod input;
pub mod permissions;
