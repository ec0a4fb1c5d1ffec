//! Repwise entry point: parse the CLI, initialize tracing, dispatch.

use clap::Parser;
use repwise::api;
use repwise::capture::{JsonlPoseSource, run_pull_loop};
use repwise::chart::BarChartRenderer;
use repwise::cli::{Cli, CliError, Command, cmd_chart, cmd_history, open_store, session_config};
use repwise::estimator::NoEstimator;
use repwise::state::AppState;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Graceful shutdown on SIGTERM and Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            error!("failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => {
                error!("failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining connections");
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve {
            host,
            port,
            store,
            data,
            arms,
            high_deg,
            low_deg,
            min_visibility,
            poses,
            tick_ms,
        } => {
            let config = session_config(arms, high_deg, low_deg, min_visibility)?;
            let store = open_store(store, &data)?;
            let state = Arc::new(AppState::new(
                config,
                store,
                Arc::new(NoEstimator),
                Box::new(BarChartRenderer::default()),
            ));

            if let Some(path) = poses {
                let source = JsonlPoseSource::open(&path)?;
                info!(path = %path.display(), "replaying recorded pose stream");
                tokio::spawn(run_pull_loop(
                    state.clone(),
                    Box::new(source),
                    Duration::from_millis(tick_ms),
                ));
            }

            let app = api::router(state);
            let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
            info!("repwise listening on http://{host}:{port}");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            Ok(())
        }
        Command::History { store, data, json } => cmd_history(store, &data, json),
        Command::Chart {
            store,
            data,
            out,
            end,
        } => cmd_chart(store, &data, &out, end),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("repwise=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
