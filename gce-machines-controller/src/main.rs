use std::{pin::pin, process::exit, sync::Arc};

use compute::gce::GceComputeApi;
use config::ControllerConfig;
use controller::main_controller;
use kube::Client;
use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

mod compute;
mod config;
mod controller;
mod helpers;
mod provider;

#[tokio::main]
async fn main() {
    configure_logger();

    let config = get_config();
    let compute = connect_compute(&config).await;
    let client = create_client().await;
    let shutdown = CancellationToken::new();

    tokio::spawn(cancel_on_signal(shutdown.clone()));

    main_controller(client, &config, compute, shutdown).await;
}

async fn create_client() -> Client {
    match Client::try_default().await {
        Ok(client) => client,
        Err(error) => {
            error!("Couldn't create client! {error:?}");
            exit(6)
        }
    }
}

fn get_config() -> ControllerConfig {
    match ControllerConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            error!("Couldn't read controller configuration! {error}");
            exit(7)
        }
    }
}

async fn connect_compute(config: &ControllerConfig) -> Arc<GceComputeApi> {
    match GceComputeApi::connect(&config.gce).await {
        Ok(compute) => Arc::new(compute),
        Err(error) => {
            error!("Couldn't establish a GCE session! {error}");
            exit(8)
        }
    }
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                warn!("Couldn't listen for SIGTERM! {error}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let mut terminate = pin!(terminate);
    let interrupt_error = tokio::select! {
        result = tokio::signal::ctrl_c() => result.err(),
        _ = terminate.as_mut() => None,
    };

    if let Some(error) = interrupt_error {
        warn!("Couldn't listen for Ctrl-C! {error}");
        terminate.await;
    }

    info!("Shutdown requested, stopping once the current event is handled...");
    shutdown.cancel();
}

fn configure_logger() {
    env_logger::builder()
        .format_module_path(false)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init()
}
