//! Wire shapes. Requests deserialize from camelCase; responses carry view
//! data only (never password hashes or forensic fields).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domains::{ActivityEntry, Beer, User};
use services::NewBeer;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickRatingRequest {
    pub beer_id: Uuid,
    /// Raw JSON number; integer-ness is validated, not truncated.
    pub score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MineQuery {
    pub beer_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MineResponse {
    pub score: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub take: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BeerListQuery {
    pub q: Option<String>,
    pub style: Option<String>,
    pub skip: Option<i64>,
    pub take: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeerView {
    pub id: Uuid,
    pub name: String,
    pub brewery: String,
    pub style: Option<String>,
    pub abv: Option<f64>,
    pub venue: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub description: Option<String>,
    pub rating: f64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Beer> for BeerView {
    fn from(beer: Beer) -> Self {
        Self {
            id: beer.id,
            name: beer.name,
            brewery: beer.brewery,
            style: beer.style,
            abv: beer.abv,
            venue: beer.venue,
            lat: beer.lat,
            lng: beer.lng,
            description: beer.description,
            rating: beer.rating,
            rating_count: beer.rating_count,
            created_at: beer.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentRequest {
    pub body: String,
    pub display_name: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub favorited: bool,
}

#[derive(Debug, Deserialize)]
pub struct BeerPayload {
    pub name: String,
    pub brewery: String,
    pub style: Option<String>,
    pub abv: Option<f64>,
    pub venue: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub description: Option<String>,
}

impl From<BeerPayload> for NewBeer {
    fn from(payload: BeerPayload) -> Self {
        NewBeer {
            name: payload.name,
            brewery: payload.brewery,
            style: payload.style,
            abv: payload.abv,
            venue: payload.venue,
            lat: payload.lat,
            lng: payload.lng,
            description: payload.description,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    pub kind: String,
    pub subject_type: String,
    pub subject_id: Option<Uuid>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityEntry> for ActivityView {
    fn from(entry: ActivityEntry) -> Self {
        Self {
            kind: entry.kind.as_str().to_string(),
            subject_type: entry.subject_type,
            subject_id: entry.subject_id,
            message: entry.message,
            created_at: entry.created_at,
        }
    }
}
