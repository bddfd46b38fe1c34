//! Prints the profile of one stage as JSON.
//!
//! Run with:
//! ```
//! YEAR=2023 STAGE=14 SOURCE=gpx cargo run -p stage-profiles --bin profile
//! ```
//!
//! `SOURCE` is `estimated` (default), `gpx`, or a rider name. `SEED` makes the
//! estimated profile reproducible.

use std::env;
use std::path::PathBuf;

use anyhow::Context as _;
use rand::SeedableRng;
use rand::rngs::StdRng;
use stage_profiles::prelude::*;
use stages::StageKey;
use stages::dataset::{DatasetConfig, load_stages};
use tracing_subscriber::EnvFilter;

fn parse_source(value: &str) -> ProfileSource {
    match value.to_ascii_lowercase().as_str() {
        "" | "estimated" => ProfileSource::Estimated,
        "gpx" => ProfileSource::Gpx,
        _ => ProfileSource::Rider(value.to_string()),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let data_path = PathBuf::from(env::var("DATA_PATH").unwrap_or_else(|_| "./Data".to_string()));
    let stage_file = env::var("STAGE_FILE").unwrap_or_else(|_| "Data_geo.csv".to_string());
    let year: u16 = env::var("YEAR")
        .unwrap_or_else(|_| "2023".to_string())
        .parse()
        .context("YEAR must be a year")?;
    let stage_index: u32 = env::var("STAGE")
        .unwrap_or_else(|_| "1".to_string())
        .parse()
        .context("STAGE must be a stage number")?;
    let source = parse_source(&env::var("SOURCE").unwrap_or_default());

    let mut rng = match env::var("SEED") {
        Ok(seed) => StdRng::seed_from_u64(seed.parse().context("SEED must be an integer")?),
        Err(_) => StdRng::from_entropy(),
    };

    let stages = load_stages(data_path.join(stage_file), &DatasetConfig::default())?;
    let key = StageKey::new(year, stage_index);
    let stage = stages
        .iter()
        .find(|s| s.key() == key)
        .with_context(|| format!("no stage {key} in the dataset"))?;

    let provider = RouteDirectory::new(&data_path);
    let sources = provider.available_sources(key)?;
    tracing::info!("Sources for {}: {:?}", stage.name(), sources);

    let profile = select_from_provider(
        stage,
        &provider,
        &source,
        &SynthesisConfig::default(),
        &mut rng,
    )?;
    println!("{}", serde_json::to_string(&profile)?);

    Ok(())
}
