//! Placement Predictor - Main Entry Point
//!
//! Trains, inspects and serves the student placement pipeline.

use clap::Parser;
use placement_predictor::cli::{cmd_inspect, cmd_predict, cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "placement_predictor=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data, output, config } => {
            cmd_train(&data, &output, config.as_deref())?;
        }
        Commands::Predict { model, profile } => {
            cmd_predict(&model, profile.into())?;
        }
        Commands::Inspect { model } => {
            cmd_inspect(&model)?;
        }
        Commands::Serve { model, host, port } => {
            cmd_serve(model, host, port).await?;
        }
    }

    Ok(())
}
