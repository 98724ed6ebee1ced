//! # Platform Operator
//!
//! Entry point: initializes logging, connects to the cluster, and hands
//! control to the watch loop in [`platform_operator::controller`].

use anyhow::Result;
use kube::Client;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "platform_operator=info".into()),
        )
        .init();

    info!("starting platform operator");

    let client = Client::try_default().await?;
    platform_operator::controller::run(client).await
}
