//! CLI command implementations for the sqlgate gateway.

pub mod args;
pub mod check;
pub mod serve;
pub mod tools;
