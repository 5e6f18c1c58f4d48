//! # sqlgate-runtime
//!
//! Session lifecycle for the gateway. [`SessionController`] brings the
//! components up in dependency order, serves tool calls through the MCP
//! transport, and owns the single teardown path used on signal, transport
//! exit and failed startup alike.

pub mod controller;
pub mod error;
pub mod factory;
pub mod lifecycle;

pub use controller::SessionController;
pub use error::StartupError;
pub use factory::{ComponentFactory, LiveComponents};
pub use lifecycle::SessionState;
