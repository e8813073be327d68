//! # SQLite store
//!
//! Maps the SQLite relational model to the `domains` models and implements
//! every repository port on a single pooled store. UUIDs travel as 16-byte
//! blobs; uniqueness collisions surface as `AppError::Conflict` so the
//! services can resolve upsert races.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use domains::{
    ActivityEntry, ActivityKind, ActivityLog, Actor, AppError, Beer, BeerFilter, CatalogRepo,
    Comment, CommentAuthor, CommentBody, CommentRepo, CommentWithMeta, EngagementCounters,
    FavoriteRepo, RatingRecord, RatingRepo, Result, User, UserRepo,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Stored body for soft-deleted comments; the original text is discarded.
const REMOVED_BODY: &str = "[removed]";

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

fn opt_blob(id: Option<Uuid>) -> Option<Vec<u8>> {
    id.map(uuid_to_blob)
}

fn opt_uuid(blob: Option<Vec<u8>>) -> Option<Uuid> {
    blob.map(|b| blob_to_uuid(&b))
}

fn map_db_err(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(db.message().to_string())
        }
        _ => AppError::internal(err),
    }
}

fn beer_from_row(row: &SqliteRow) -> Beer {
    Beer {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        name: row.get("name"),
        brewery: row.get("brewery"),
        style: row.get("style"),
        abv: row.get("abv"),
        venue: row.get("venue"),
        lat: row.get("lat"),
        lng: row.get("lng"),
        description: row.get("description"),
        rating: row.get("rating"),
        rating_count: row.get("rating_count"),
        created_at: row.get("created_at"),
    }
}

fn rating_from_row(row: &SqliteRow) -> RatingRecord {
    RatingRecord {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        beer_id: blob_to_uuid(row.get::<Vec<u8>, _>("beer_id").as_slice()),
        user_id: opt_uuid(row.get("user_id")),
        device_id: opt_uuid(row.get("device_id")),
        ip_hash: row.get("ip_hash"),
        score: row.get("score"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn comment_from_row(row: &SqliteRow) -> Comment {
    let author = match opt_uuid(row.get("user_id")) {
        Some(id) => CommentAuthor::User { id },
        None => CommentAuthor::Guest {
            display_name: row
                .get::<Option<String>, _>("guest_name")
                .unwrap_or_else(|| "Guest".to_string()),
            device_id: opt_uuid(row.get("device_id")),
            ip_hash: row.get("ip_hash"),
        },
    };
    let body = if row.get::<bool, _>("is_deleted") {
        CommentBody::Deleted
    } else {
        CommentBody::Active {
            body: row.get("body"),
        }
    };
    Comment {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        beer_id: blob_to_uuid(row.get::<Vec<u8>, _>("beer_id").as_slice()),
        parent_id: opt_uuid(row.get("parent_id")),
        author,
        body,
        created_at: row.get("created_at"),
    }
}

fn comment_meta_from_row(row: &SqliteRow) -> CommentWithMeta {
    let comment = comment_from_row(row);
    let username: Option<String> = row.get("author_username");
    let guest_name: Option<String> = row.get("guest_name");
    let display_name = username
        .or(guest_name)
        .unwrap_or_else(|| "Guest".to_string());
    CommentWithMeta {
        comment,
        display_name,
        avatar_url: row.get("author_avatar"),
        rating: row.get("author_score"),
    }
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        is_admin: row.get("is_admin"),
        avatar_url: row.get("avatar_url"),
        created_at: row.get("created_at"),
    }
}

fn activity_from_row(row: &SqliteRow) -> ActivityEntry {
    ActivityEntry {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        user_id: opt_uuid(row.get("user_id")),
        device_id: opt_uuid(row.get("device_id")),
        kind: ActivityKind::parse(row.get::<String, _>("kind").as_str())
            .unwrap_or(ActivityKind::AdminAction),
        subject_type: row.get("subject_type"),
        subject_id: opt_uuid(row.get("subject_id")),
        message: row.get("message"),
        metadata: serde_json::from_str(&row.get::<String, _>("metadata")).unwrap_or_default(),
        ip_hash: row.get("ip_hash"),
        user_agent: row.get("user_agent"),
        created_at: row.get("created_at"),
    }
}

impl SqliteStore {
    /// Connects (creating the file when needed) and runs the migrations.
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(AppError::internal)?
            .create_if_missing(true)
            .foreign_keys(true);
        // An in-memory database exists per connection; the pool must not
        // open a second one or recycle the only one holding the data.
        let is_memory = url.contains(":memory:");
        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(if is_memory { 1 } else { 8 });
        if is_memory {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None::<std::time::Duration>)
                .max_lifetime(None::<std::time::Duration>);
        }
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(AppError::internal)?;
        MIGRATOR.run(&pool).await.map_err(AppError::internal)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CatalogRepo for SqliteStore {
    async fn get_beer(&self, id: Uuid) -> Result<Option<Beer>> {
        let row = sqlx::query("SELECT * FROM beers WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.as_ref().map(beer_from_row))
    }

    async fn list_beers(&self, filter: &BeerFilter) -> Result<Vec<Beer>> {
        let mut sql = String::from("SELECT * FROM beers WHERE 1=1");
        if filter.q.is_some() {
            sql.push_str(" AND (LOWER(name) LIKE ? OR LOWER(brewery) LIKE ?)");
        }
        if filter.style.is_some() {
            sql.push_str(" AND LOWER(style) = ?");
        }
        sql.push_str(" ORDER BY name ASC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        if let Some(q) = &filter.q {
            let like = format!("%{}%", q.to_lowercase());
            query = query.bind(like.clone()).bind(like);
        }
        if let Some(style) = &filter.style {
            query = query.bind(style.to_lowercase());
        }
        let rows = query
            .bind(filter.take)
            .bind(filter.skip)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(rows.iter().map(beer_from_row).collect())
    }

    async fn create_beer(&self, beer: &Beer) -> Result<()> {
        sqlx::query(
            "INSERT INTO beers (id, name, brewery, style, abv, venue, lat, lng, description, rating, rating_count, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(beer.id))
        .bind(&beer.name)
        .bind(&beer.brewery)
        .bind(&beer.style)
        .bind(beer.abv)
        .bind(&beer.venue)
        .bind(beer.lat)
        .bind(beer.lng)
        .bind(&beer.description)
        .bind(beer.rating)
        .bind(beer.rating_count)
        .bind(beer.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn update_beer(&self, beer: &Beer) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE beers SET name = ?, brewery = ?, style = ?, abv = ?, venue = ?, lat = ?, lng = ?, description = ? \
             WHERE id = ?",
        )
        .bind(&beer.name)
        .bind(&beer.brewery)
        .bind(&beer.style)
        .bind(beer.abv)
        .bind(&beer.venue)
        .bind(beer.lat)
        .bind(beer.lng)
        .bind(&beer.description)
        .bind(uuid_to_blob(beer.id))
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_beer(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM beers WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_rating_aggregate(&self, beer_id: Uuid, rating: f64, count: i64) -> Result<()> {
        sqlx::query("UPDATE beers SET rating = ?, rating_count = ? WHERE id = ?")
            .bind(rating)
            .bind(count)
            .bind(uuid_to_blob(beer_id))
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}

#[async_trait]
impl RatingRepo for SqliteStore {
    async fn find_for_actor(
        &self,
        beer_id: Uuid,
        actor: &Actor,
        ip_hash: Option<&str>,
    ) -> Result<Option<RatingRecord>> {
        let row = match actor {
            Actor::User { id, .. } => {
                sqlx::query("SELECT * FROM ratings WHERE beer_id = ? AND user_id = ?")
                    .bind(uuid_to_blob(beer_id))
                    .bind(uuid_to_blob(*id))
                    .fetch_optional(&self.pool)
                    .await
            }
            // Anonymous: the device id owns the row; legacy rows without a
            // device id are matched by the IP fingerprint.
            Actor::Device { id } => {
                sqlx::query(
                    "SELECT * FROM ratings WHERE beer_id = ? AND user_id IS NULL \
                     AND (device_id = ? OR (device_id IS NULL AND ip_hash IS NOT NULL AND ip_hash = ?)) \
                     ORDER BY updated_at DESC LIMIT 1",
                )
                .bind(uuid_to_blob(beer_id))
                .bind(uuid_to_blob(*id))
                .bind(ip_hash)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(map_db_err)?;
        Ok(row.as_ref().map(rating_from_row))
    }

    async fn find_for_user(&self, beer_id: Uuid, user_id: Uuid) -> Result<Option<RatingRecord>> {
        let row = sqlx::query("SELECT * FROM ratings WHERE beer_id = ? AND user_id = ?")
            .bind(uuid_to_blob(beer_id))
            .bind(uuid_to_blob(user_id))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.as_ref().map(rating_from_row))
    }

    async fn insert(&self, record: &RatingRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO ratings (id, beer_id, user_id, device_id, ip_hash, score, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(record.id))
        .bind(uuid_to_blob(record.beer_id))
        .bind(opt_blob(record.user_id))
        .bind(opt_blob(record.device_id))
        .bind(&record.ip_hash)
        .bind(record.score)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn update_score(&self, id: Uuid, score: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE ratings SET score = ?, updated_at = ? WHERE id = ?")
            .bind(score)
            .bind(at)
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn aggregate(&self, beer_id: Uuid) -> Result<(i64, i64)> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS cnt, COALESCE(SUM(score), 0) AS total FROM ratings WHERE beer_id = ?",
        )
        .bind(uuid_to_blob(beer_id))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok((row.get("cnt"), row.get("total")))
    }

    async fn unmerged_for_device(&self, device_id: Uuid) -> Result<Vec<RatingRecord>> {
        let rows = sqlx::query("SELECT * FROM ratings WHERE device_id = ? AND user_id IS NULL")
            .bind(uuid_to_blob(device_id))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(rows.iter().map(rating_from_row).collect())
    }

    async fn assign_user(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE ratings SET user_id = ? WHERE id = ?")
            .bind(uuid_to_blob(user_id))
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM ratings WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE user_id = ?")
            .bind(uuid_to_blob(user_id))
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)
    }

    async fn count_unmerged_for_device(&self, device_id: Uuid) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE device_id = ? AND user_id IS NULL")
            .bind(uuid_to_blob(device_id))
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)
    }
}

/// Comment listing join: author display data plus the author's current
/// score for the same beer, resolved by whichever identity owns the row.
const COMMENT_SELECT: &str = "SELECT c.*, u.username AS author_username, u.avatar_url AS author_avatar, r.score AS author_score \
     FROM comments c \
     LEFT JOIN users u ON u.id = c.user_id \
     LEFT JOIN ratings r ON r.beer_id = c.beer_id \
        AND ((c.user_id IS NOT NULL AND r.user_id = c.user_id) \
          OR (c.user_id IS NULL AND r.user_id IS NULL AND r.device_id = c.device_id))";

#[async_trait]
impl CommentRepo for SqliteStore {
    async fn insert(&self, comment: &Comment) -> Result<()> {
        let (user_id, guest_name, device_id, ip_hash) = match &comment.author {
            CommentAuthor::User { id } => (Some(*id), None, None, None),
            CommentAuthor::Guest {
                display_name,
                device_id,
                ip_hash,
            } => (
                None,
                Some(display_name.clone()),
                *device_id,
                ip_hash.clone(),
            ),
        };
        let body = match &comment.body {
            CommentBody::Active { body } => body.as_str(),
            CommentBody::Deleted => REMOVED_BODY,
        };
        sqlx::query(
            "INSERT INTO comments (id, beer_id, parent_id, user_id, guest_name, device_id, ip_hash, body, is_deleted, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(comment.id))
        .bind(uuid_to_blob(comment.beer_id))
        .bind(opt_blob(comment.parent_id))
        .bind(opt_blob(user_id))
        .bind(guest_name)
        .bind(opt_blob(device_id))
        .bind(ip_hash)
        .bind(body)
        .bind(comment.body.is_deleted())
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.as_ref().map(comment_from_row))
    }

    async fn list_top_level(
        &self,
        beer_id: Uuid,
        skip: i64,
        take: i64,
    ) -> Result<Vec<CommentWithMeta>> {
        let sql = format!(
            "{COMMENT_SELECT} WHERE c.beer_id = ? AND c.parent_id IS NULL AND c.is_deleted = 0 \
             ORDER BY c.created_at DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&sql)
            .bind(uuid_to_blob(beer_id))
            .bind(take)
            .bind(skip)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(rows.iter().map(comment_meta_from_row).collect())
    }

    async fn list_replies(&self, parent_ids: &[Uuid]) -> Result<Vec<CommentWithMeta>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; parent_ids.len()].join(", ");
        let sql = format!(
            "{COMMENT_SELECT} WHERE c.parent_id IN ({placeholders}) AND c.is_deleted = 0 \
             ORDER BY c.created_at ASC"
        );
        let mut query = sqlx::query(&sql);
        for parent_id in parent_ids {
            query = query.bind(uuid_to_blob(*parent_id));
        }
        let rows = query.fetch_all(&self.pool).await.map_err(map_db_err)?;
        Ok(rows.iter().map(comment_meta_from_row).collect())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE comments SET is_deleted = 1, body = ? WHERE id = ?")
            .bind(REMOVED_BODY)
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn count_active_for_user(&self, user_id: Uuid) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE user_id = ? AND is_deleted = 0")
            .bind(uuid_to_blob(user_id))
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)
    }
}

#[async_trait]
impl FavoriteRepo for SqliteStore {
    async fn add(&self, user_id: Uuid, beer_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO favorites (user_id, beer_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(uuid_to_blob(user_id))
        .bind(uuid_to_blob(beer_id))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, user_id: Uuid, beer_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND beer_id = ?")
            .bind(uuid_to_blob(user_id))
            .bind(uuid_to_blob(beer_id))
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, user_id: Uuid, beer_id: Uuid) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM favorites WHERE user_id = ? AND beer_id = ?",
        )
        .bind(uuid_to_blob(user_id))
        .bind(uuid_to_blob(beer_id))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(count > 0)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Beer>> {
        let rows = sqlx::query(
            "SELECT b.* FROM beers b JOIN favorites f ON f.beer_id = b.id \
             WHERE f.user_id = ? ORDER BY f.created_at DESC",
        )
        .bind(uuid_to_blob(user_id))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(rows.iter().map(beer_from_row).collect())
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE user_id = ?")
            .bind(uuid_to_blob(user_id))
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)
    }
}

#[async_trait]
impl UserRepo for SqliteStore {
    async fn create(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, is_admin, avatar_url, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(user.id))
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(&user.avatar_url)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn counters(&self, user_id: Uuid) -> Result<Option<EngagementCounters>> {
        let row = sqlx::query(
            "SELECT reviews, comments, favorites FROM engagement_counters WHERE user_id = ?",
        )
        .bind(uuid_to_blob(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(row.map(|row| EngagementCounters {
            reviews: row.get("reviews"),
            comments: row.get("comments"),
            favorites: row.get("favorites"),
        }))
    }

    async fn store_counters(&self, user_id: Uuid, counters: &EngagementCounters) -> Result<()> {
        sqlx::query(
            "INSERT INTO engagement_counters (user_id, reviews, comments, favorites, refreshed_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET \
               reviews = excluded.reviews, comments = excluded.comments, \
               favorites = excluded.favorites, refreshed_at = excluded.refreshed_at",
        )
        .bind(uuid_to_blob(user_id))
        .bind(counters.reviews)
        .bind(counters.comments)
        .bind(counters.favorites)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }
}

#[async_trait]
impl ActivityLog for SqliteStore {
    async fn append(&self, entry: &ActivityEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO activity_log (id, user_id, device_id, kind, subject_type, subject_id, message, metadata, ip_hash, user_agent, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(entry.id))
        .bind(opt_blob(entry.user_id))
        .bind(opt_blob(entry.device_id))
        .bind(entry.kind.as_str())
        .bind(&entry.subject_type)
        .bind(opt_blob(entry.subject_id))
        .bind(&entry.message)
        .bind(entry.metadata.to_string())
        .bind(&entry.ip_hash)
        .bind(&entry.user_agent)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn recent(
        &self,
        user_id: Uuid,
        device_id: Option<Uuid>,
        take: i64,
    ) -> Result<Vec<ActivityEntry>> {
        let rows = sqlx::query(
            "SELECT * FROM activity_log \
             WHERE user_id = ? OR (device_id IS NOT NULL AND device_id = ?) \
             ORDER BY created_at DESC LIMIT ?",
        )
        .bind(uuid_to_blob(user_id))
        .bind(opt_blob(device_id))
        .bind(take)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(rows.iter().map(activity_from_row).collect())
    }
}
