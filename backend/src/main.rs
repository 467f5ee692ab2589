//! Backend entry-point: loads configuration, prepares storage, and runs the
//! HTTP server alongside the mirror outbox worker.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use reqwest::Url;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use admission_queue::config::AppSettings;
use admission_queue::inbound::http::health::HealthState;
use admission_queue::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use admission_queue::outbound::sheets::SheetsClientConfig;
use server::{ServerConfig, ServerHandles, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let config = server_config(&settings).await?;

    let health_state = web::Data::new(HealthState::new());
    let ServerHandles {
        server,
        outbox_worker,
    } = create_server(health_state.clone(), config).wrap_err("failed to start HTTP server")?;
    info!(bind_addr = %settings.bind_addr(), "admission queue listening");

    let (stop_worker, worker_stopped) = oneshot::channel::<()>();
    let worker = actix_web::rt::spawn(async move {
        outbox_worker
            .run_until(async {
                // A dropped sender also stops the worker.
                worker_stopped.await.unwrap_or(());
            })
            .await;
    });

    let served = server.await;
    health_state.mark_unhealthy();
    if stop_worker.send(()).is_err() {
        warn!("outbox worker stopped before shutdown");
    }
    if let Err(error) = worker.await {
        warn!(%error, "outbox worker task ended abnormally");
    }
    served.wrap_err("HTTP server failed")
}

async fn server_config(settings: &AppSettings) -> Result<ServerConfig> {
    let api_base = Url::parse(settings.sheets_api_base())
        .wrap_err_with(|| format!("invalid sheets API base {}", settings.sheets_api_base()))?;
    let config = ServerConfig::new(
        settings.bind_addr(),
        SheetsClientConfig {
            credentials_path: settings.credentials_path(),
            api_base,
            token_uri: settings.token_uri.clone(),
            timeout: settings.request_timeout(),
        },
        settings.outbox_worker(),
    );

    let Some(database_url) = settings.database_url() else {
        warn!("no database configured; queue state is kept in memory");
        return Ok(config);
    };
    run_migrations(database_url)
        .await
        .wrap_err("failed to apply database migrations")?;
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .wrap_err("failed to build database pool")?;
    Ok(config.with_db_pool(pool))
}
