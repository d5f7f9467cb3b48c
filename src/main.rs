//! stock-ann - Main Entry Point
//!
//! Train, evaluate and serve a feed-forward regressor from the command line.

use clap::Parser;
use stock_ann::cli::{cmd_evaluate, cmd_info, cmd_predict, cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_ann=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data, epochs, batch_size, test_split, target, output, predict } => {
            cmd_train(
                &data,
                epochs,
                batch_size,
                test_split,
                target.as_deref(),
                output.as_deref(),
                predict.as_deref(),
            )?;
        }
        Commands::Predict { model, features } => {
            cmd_predict(&model, &features)?;
        }
        Commands::Evaluate { model, data } => {
            cmd_evaluate(&model, &data)?;
        }
        Commands::Info { model } => {
            cmd_info(&model)?;
        }
        Commands::Serve { port, host } => {
            cmd_serve(&host, port).await?;
        }
    }

    Ok(())
}
