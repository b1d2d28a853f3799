//! photosense-web - Photo gallery web service
//!
//! REST backend for the PhotoSense gallery: bearer-token authentication
//! against a hosted identity provider, direct-to-storage uploads via
//! pre-signed URLs, AI-derived metadata browsing and smart collections,
//! and queue-backed processing notifications.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use photosense_common::config::Config;
use photosense_web::services::{IdentityClient, MetadataStore, Notifier, S3ObjectStore};
use photosense_web::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "photosense-web", version, about = "PhotoSense gallery web service")]
struct Args {
    /// Path to the TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address override, e.g. 0.0.0.0:8080
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing first so config failures are visible
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting PhotoSense web service v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();

    // All configuration resolves here; a missing value aborts startup
    // instead of surfacing on the first request that needs it.
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws.region.clone()))
        .load()
        .await;
    info!("Cloud region: {}", config.aws.region);

    let identity = IdentityClient::new(&config.identity)?;
    let storage = Arc::new(S3ObjectStore::new(
        aws_sdk_s3::Client::new(&sdk_config),
        config.aws.bucket.clone(),
    ));
    let metadata = MetadataStore::new(
        aws_sdk_dynamodb::Client::new(&sdk_config),
        config.aws.image_table.clone(),
        config.aws.user_table.clone(),
    );
    let notifier = Notifier::new(
        aws_sdk_sns::Client::new(&sdk_config),
        aws_sdk_sqs::Client::new(&sdk_config),
        &config.aws,
    )?;

    let bind = config.bind.clone();
    let state = AppState::new(config, identity, storage, metadata, notifier);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Listening on http://{bind}");
    info!("Health check: http://{bind}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
