use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod data;
mod engine;

use config::Config;
use data::DatasetCache;
use engine::calibration::Calibration;
use engine::{Engine, EstimateRequest};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    // An explicit calibration file must load; no file means built-in defaults.
    let calibration = match &config.calibration {
        Some(path) => {
            let cal = Calibration::load(path)?;
            info!("Calibration loaded: {}", path.display());
            cal
        }
        None => Calibration::default(),
    };

    let datasets = Arc::new(DatasetCache::new(
        config.qb_dataset.clone(),
        config.skill_dataset.clone(),
    ));
    let engine = Arc::new(Engine::new(datasets, calibration));

    if config.serve {
        let app = api::router(engine);
        let addr: SocketAddr = config.listen_addr.parse()?;
        info!("API listening on http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;
        return Ok(());
    }

    if config.career {
        let Some(profile) = config.profile() else {
            anyhow::bail!("--career needs --player");
        };
        let outlook = engine.career_outlook(&profile, None, config.as_of);
        println!("{}", serde_json::to_string_pretty(&outlook)?);
        return Ok(());
    }

    let request = EstimateRequest {
        prompt: config.prompt.clone().unwrap_or_default(),
        profile: config.profile(),
        as_of_date: config.as_of,
        ..Default::default()
    };
    match engine.estimate(&request) {
        Some(estimate) => println!("{}", serde_json::to_string_pretty(&estimate)?),
        None => println!("{}", serde_json::json!({ "status": "no_match" })),
    }
    Ok(())
}
