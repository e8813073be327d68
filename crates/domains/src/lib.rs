//! # domains
//!
//! The central domain models, port traits and error taxonomy for brewlog.
//! This crate performs no I/O; adapters implement the ports defined here.

pub mod actor;
pub mod error;
pub mod models;
pub mod ports;

pub use actor::*;
pub use error::*;
pub use models::*;
pub use ports::*;
