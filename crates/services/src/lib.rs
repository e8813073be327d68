//! # services
//!
//! Domain services for brewlog: the rating ledger, identity merge,
//! engagement counters, comment tree, favorites, catalog and accounts.
//! Everything here talks to the outside world through the port traits in
//! `domains`, so each service is unit-testable against mocks.

pub mod auth;
pub mod catalog;
pub mod comments;
pub mod favorites;
pub mod identity;
pub mod profile;
pub mod ratings;

pub use auth::AuthService;
pub use catalog::{CatalogService, NewBeer};
pub use comments::{CommentService, CommentView, NewComment};
pub use favorites::FavoriteService;
pub use identity::ip_fingerprint;
pub use profile::{ProfileService, ProfileView};
pub use ratings::{coerce_score, RatingService};
