//! Seeds a demo catalog and an admin account. Idempotent: re-running skips
//! anything that already exists.

use anyhow::Context;
use chrono::Utc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use auth_adapters::ArgonPasswords;
use configs::AppConfig;
use domains::{Beer, BeerFilter, CatalogRepo, Passwords, User, UserRepo};
use storage_adapters::SqliteStore;

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "brewlog-admin";

const DEMO_BEERS: &[(&str, &str, &str, f64, &str, f64, f64, &str)] = &[
    (
        "Hazy Cascadia",
        "Riverside Brewing",
        "hazy ipa",
        6.4,
        "Riverside Taproom",
        45.523,
        -122.676,
        "Juicy tropical hop profile, soft bitterness, notes of mango and citrus.",
    ),
    (
        "Kellerweg 5",
        "Alte Muehle",
        "kellerbier",
        5.2,
        "Muehlenkeller",
        49.452,
        11.077,
        "Unfiltered amber lager, bready malt, gentle noble hop finish.",
    ),
    (
        "Black Anchor",
        "Harbor Works",
        "dry stout",
        4.6,
        "Harbor Works Pub",
        53.551,
        9.994,
        "Roasted coffee and dark chocolate, low carbonation, creamy pour.",
    ),
    (
        "Meadow Saison",
        "Two Fields",
        "saison",
        5.8,
        "Two Fields Farm Bar",
        50.846,
        4.352,
        "Dry and peppery farmhouse ale with citrus zest and hay notes.",
    ),
    (
        "Pils No. 1",
        "Stadtbrauerei",
        "pilsner",
        4.9,
        "Stadtkeller",
        50.110,
        8.682,
        "Crisp bitter pilsner, floral hops, clean dry finish.",
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let store = SqliteStore::new(&config.database.url)
        .await
        .context("initializing the database")?;

    if store.by_username(ADMIN_USERNAME).await?.is_none() {
        let passwords = ArgonPasswords;
        let admin = User {
            id: Uuid::new_v4(),
            username: ADMIN_USERNAME.into(),
            password_hash: passwords.hash(ADMIN_PASSWORD)?,
            is_admin: true,
            avatar_url: None,
            created_at: Utc::now(),
        };
        store.create(&admin).await?;
        tracing::info!(username = ADMIN_USERNAME, "created admin account");
    }

    let mut created = 0usize;
    for (name, brewery, style, abv, venue, lat, lng, description) in DEMO_BEERS {
        let existing = store
            .list_beers(&BeerFilter {
                q: Some((*name).to_string()),
                style: None,
                skip: 0,
                take: 1,
            })
            .await?;
        if !existing.is_empty() {
            continue;
        }
        let beer = Beer {
            id: Uuid::new_v4(),
            name: (*name).to_string(),
            brewery: (*brewery).to_string(),
            style: Some((*style).to_string()),
            abv: Some(*abv),
            venue: Some((*venue).to_string()),
            lat: Some(*lat),
            lng: Some(*lng),
            description: Some((*description).to_string()),
            rating: 0.0,
            rating_count: 0,
            created_at: Utc::now(),
        };
        store.create_beer(&beer).await?;
        created += 1;
    }
    tracing::info!(created, "seed complete");
    Ok(())
}
