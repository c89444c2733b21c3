//! Port traits the domain talks to its collaborators through.

pub mod config_port;
pub mod data_port;
pub mod regime_port;
