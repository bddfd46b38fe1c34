use std::env;
use std::path::PathBuf;

use stages::aggregator::aggregate_year;
use stages::dataset::{DatasetConfig, load_stages};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let data_path = PathBuf::from(env::var("DATA_PATH").unwrap_or_else(|_| "./Data".to_string()));
    let stage_file = env::var("STAGE_FILE").unwrap_or_else(|_| "Data_geo.csv".to_string());

    let stages = load_stages(data_path.join(stage_file), &DatasetConfig::default())?;

    let mut failed = 0;
    for result in aggregate_year(&stages).into_values() {
        match result {
            Ok(year) => println!("{}", serde_json::to_string(&year)?),
            Err(_) => failed += 1,
        }
    }

    if failed > 0 {
        tracing::warn!("{failed} editions could not be estimated");
    }

    Ok(())
}
