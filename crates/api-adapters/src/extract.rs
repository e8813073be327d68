//! Actor resolution.
//!
//! `Identity` turns a request into an explicit `ActorContext`: a bearer
//! session wins, the device cookie is the fallback, and a keyed IP
//! fingerprint plus the user agent ride along as forensic fields.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::request::Parts;

use domains::{Actor, ActorContext, AppError};
use services::ip_fingerprint;

use crate::error::ApiError;
use crate::middleware::DeviceId;
use crate::state::AppState;

pub struct Identity {
    pub ctx: ActorContext,
    /// True when the only identity is a device id minted on this request.
    pub fresh_device: bool,
}

impl Identity {
    /// For endpoints that require a previously established identity
    /// (a session or a returning device cookie).
    pub fn require_established(&self) -> Result<(), ApiError> {
        if self.fresh_device && self.ctx.actor.user_id().is_none() {
            return Err(AppError::Unauthenticated("no established identity".into()).into());
        }
        Ok(())
    }
}

fn client_ip(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let device = parts.extensions.get::<DeviceId>().copied();

        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let (actor, fresh_device) = match bearer {
            // An invalid token is rejected rather than silently downgraded
            // to the anonymous identity.
            Some(token) => {
                let claims = state.sessions.decode(token).map_err(ApiError::from)?;
                (
                    Actor::User {
                        id: claims.user_id,
                        admin: claims.admin,
                    },
                    false,
                )
            }
            None => match device {
                Some(device) => (Actor::Device { id: device.id }, device.fresh),
                None => {
                    return Err(
                        AppError::Unauthenticated("no identity on this request".into()).into(),
                    )
                }
            },
        };

        let ip_hash = client_ip(parts).map(|ip| ip_fingerprint(state.ip_hash_key.as_slice(), &ip));
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        Ok(Identity {
            ctx: ActorContext::new(actor)
                .with_ip_hash(ip_hash)
                .with_user_agent(user_agent)
                .with_companion_device(device.map(|d| d.id)),
            fresh_device,
        })
    }
}
