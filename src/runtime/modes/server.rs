//! Server mode
//!
//! Builds the shared state, starts actix-web and drains the click queue after
//! the server stops. actix-web handles SIGINT/SIGTERM itself.

use std::time::Duration;

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{error, info};

use crate::api::{self, AppState, middleware::RequestIdMiddleware};
use crate::config::AppConfig;
use crate::runtime::lifetime::{shutdown, startup};

/// Body size cap for every route
const PAYLOAD_LIMIT: usize = 64 * 1024;

/// **Note**: logging must be initialised before calling this function
pub async fn run_server(config: AppConfig) -> Result<()> {
    let startup = startup::prepare_server_startup(&config)
        .await
        .inspect_err(|e| error!("Server startup failed: {:#}", e))?;

    let recorder = startup.recorder.clone();
    let state = web::Data::new(AppState::new(
        &config,
        startup.store,
        startup.cache,
        startup.recorder,
    ));

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!(
        "Starting server at http://{} ({} workers, public URL {})",
        bind_address, cpu_count, config.server.base_url
    );

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(RequestIdMiddleware)
            .wrap(
                DefaultHeaders::new()
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(PAYLOAD_LIMIT))
            .configure(api::configure)
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .workers(cpu_count)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    let result = server.await;
    shutdown::perform_shutdown_tasks(&recorder).await;
    result.context("HTTP server error")
}
