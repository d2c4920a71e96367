//! Application-level configuration.
//!
//! - [`OrchestratorParams`] - how the initiation orchestrator resolves defaults
//!   and treats superseded attempts

pub mod orchestrator_params;

pub use orchestrator_params::OrchestratorParams;
