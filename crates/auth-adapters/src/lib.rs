//! # auth-adapters
//!
//! Credential and identity adapters: Argon2 password hashing, JWT bearer
//! sessions, and the long-lived anonymous device cookie.

pub mod passwords;

#[cfg(feature = "auth-jwt")]
pub mod sessions;

#[cfg(feature = "auth-cookie")]
pub mod device;

pub use passwords::ArgonPasswords;

#[cfg(feature = "auth-jwt")]
pub use sessions::JwtSessions;
