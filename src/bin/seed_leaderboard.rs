//! Seed the durable store with synthetic users
//!
//! Usage:
//!   cargo run --release --bin seed_leaderboard -- [COUNT]
//!
//! COUNT defaults to SEED_USERS, then 10000. Usernames are `user<N>` and
//! ratings are uniform in [0, 5000). Re-running overwrites ratings of
//! existing usernames.

use dotenv::dotenv;
use leaderboard::config::{parse_or, required};
use leaderboard::db::SqliteDurableStore;
use leaderboard::services::simulator::MAX_SIMULATED_RATING;
use log::info;
use rand::Rng;
use std::env;

const DEFAULT_SEED_USERS: usize = 10_000;
const INSERT_CHUNK: usize = 5_000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let lookup = |key: &str| env::var(key).ok();
    let database_url = required(&lookup, "DATABASE_URL")?;
    let count = match env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => parse_or(&lookup, "SEED_USERS", DEFAULT_SEED_USERS)?,
    };

    info!("🌱 Seeding {} users into {}", count, database_url);
    let store = SqliteDurableStore::open(&database_url)?;

    let mut rng = rand::thread_rng();
    let mut written = 0;
    for chunk_start in (0..count).step_by(INSERT_CHUNK) {
        let chunk_end = (chunk_start + INSERT_CHUNK).min(count);
        let users: Vec<(String, i64)> = (chunk_start..chunk_end)
            .map(|i| (format!("user{}", i), rng.gen_range(0..MAX_SIMULATED_RATING)))
            .collect();
        written += store.insert_users(users).await?;
        info!("   ├─ {}/{} users written", written, count);
    }

    info!("✅ Seed complete: {} users in store", store.count_users().await?);
    Ok(())
}
