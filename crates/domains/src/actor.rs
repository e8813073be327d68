//! # Actor
//!
//! The resolved identity attributed to a write operation: an authenticated
//! user or an anonymous device. Handlers resolve this once per request and
//! pass it explicitly into every ledger operation, so the services can be
//! exercised without a simulated request pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ownership identity for ratings, comments and favorites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// Authenticated session; `admin` mirrors the user row's role flag.
    User { id: Uuid, admin: bool },
    /// Long-lived anonymous device identifier from the device cookie.
    Device { id: Uuid },
}

impl Actor {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Actor::User { id, .. } => Some(*id),
            Actor::Device { .. } => None,
        }
    }

    pub fn device_id(&self) -> Option<Uuid> {
        match self {
            Actor::User { .. } => None,
            Actor::Device { id } => Some(*id),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::User { admin: true, .. })
    }
}

/// Per-request context handed to the services: the owning identity plus
/// forensic fields that are recorded but never used as an ownership key.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub actor: Actor,
    /// Keyed hash of the caller's IP; `None` when the address is unknown.
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
    /// Device id seen alongside an authenticated session, used by the
    /// profile path to merge pre-login activity.
    pub companion_device: Option<Uuid>,
}

impl ActorContext {
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            ip_hash: None,
            user_agent: None,
            companion_device: None,
        }
    }

    pub fn with_ip_hash(mut self, ip_hash: Option<String>) -> Self {
        self.ip_hash = ip_hash;
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_companion_device(mut self, device: Option<Uuid>) -> Self {
        self.companion_device = device;
        self
    }
}
