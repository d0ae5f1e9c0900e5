//! INDEXCACHE Demo Binary
//!
//! Loads generated records into an expiring indexer, runs a few searches,
//! then waits for the background sweeper to reclaim the expired entries.

use std::time::Duration;

use clap::Parser;
use indexcache::{IndexFn, Indexed, Indexer, Registry, RegistryConfig, StoreOptions};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const COUNTRIES: [&str; 4] = ["China", "America", "France", "Brazil"];

/// INDEXCACHE Demo - expiring records with secondary indexes
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Sweep interval in milliseconds
    #[arg(long, default_value_t = 200)]
    sweep_interval: u64,

    /// Record lifetime in milliseconds
    #[arg(long, default_value_t = 500)]
    ttl_ms: u64,

    /// Number of records to load
    #[arg(short, long, default_value_t = 1000)]
    records: usize,
}

#[derive(Debug, Clone)]
struct Person {
    id: String,
    country: String,
    decade: u32,
}

impl Indexed for Person {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn indexes(&self) -> Vec<(&'static str, IndexFn<Self>)> {
        let by_country: IndexFn<Self> = |p| vec![p.country.clone()];
        let by_decade: IndexFn<Self> = |p| vec![p.decade.to_string()];
        vec![("country", by_country), ("decade", by_decade)]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("indexcache=info".parse()?))
        .init();

    let args = Args::parse();

    let registry = Registry::new(
        RegistryConfig::default().with_interval(Duration::from_millis(args.sweep_interval)),
    )?;
    let sweeper = registry.spawn_sweeper();

    let people: Indexer<Person> = Indexer::with_options(
        StoreOptions::new()
            .with_name("people")
            .with_ttl(Duration::from_millis(args.ttl_ms))
            .with_registry(&registry),
    );

    for i in 0..args.records {
        people.set(Person {
            id: i.to_string(),
            country: COUNTRIES[i % COUNTRIES.len()].to_string(),
            decade: 1950 + (i % 7) as u32 * 10,
        });
    }
    info!(records = people.len(), stores = registry.len(), "Loaded records");

    for country in COUNTRIES {
        let found = people.search("country", country);
        info!(country = country, matches = found.len(), "Searched by country");
    }
    if let Some(err) = people.search("region", "Europe").error() {
        info!(error = %err, "Searched unknown index");
    }

    tokio::time::sleep(Duration::from_millis(args.ttl_ms + 2 * args.sweep_interval)).await;
    info!(live = people.len(), "After expiry");
    if let Some(err) = people.search("country", "China").error() {
        info!(error = %err, "Postings outlive expired records");
    }

    sweeper.shutdown().await;
    Ok(())
}
