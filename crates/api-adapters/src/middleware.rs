//! Request middleware: the device-cookie layer.
//!
//! Every response to a cookieless client gets a fresh device id; the
//! request itself already observes the new id through an extension, so the
//! first quick rating of a brand-new visitor lands on a stable identity.

use axum::extract::Request;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use auth_adapters::device::{device_from_cookie_header, issue_cookie};

/// Resolved device identity for the current request.
#[derive(Debug, Clone, Copy)]
pub struct DeviceId {
    pub id: Uuid,
    /// True when the id was minted for this request (no cookie presented).
    pub fresh: bool,
}

pub async fn device_cookie_layer(mut req: Request, next: Next) -> Response {
    let existing = req
        .headers()
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(device_from_cookie_header);

    let device = match existing {
        Some(id) => DeviceId { id, fresh: false },
        None => DeviceId {
            id: Uuid::new_v4(),
            fresh: true,
        },
    };
    req.extensions_mut().insert(device);

    let mut response = next.run(req).await;
    if device.fresh {
        if let Ok(value) = HeaderValue::from_str(&issue_cookie(device.id)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}
