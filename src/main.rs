// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::sync::Arc;

use book_management_service::{
    api::router,
    config::{Config, LOG_FORMAT_ENV},
    events::{provision_topics, BookEventConsumer, BookEventProducer, TopicBroker},
    state::AppState,
    storage::Database,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating shutdown..."),
    }
    shutdown.cancel();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration, refusing to start");
            std::process::exit(1);
        }
    };
    info!(?config, "Configuration loaded");

    let db = Arc::new(Database::open(&config.database_path()).expect("Failed to open database"));
    info!(path = %config.database_path().display(), "Database opened");

    let mut broker = TopicBroker::new();
    provision_topics(&mut broker, &config.topics);
    let broker = Arc::new(broker);

    let shutdown = CancellationToken::new();
    let subscription = broker
        .subscribe(&config.topics.input_output_topic, &config.topics.consumer_group)
        .expect("Book topic was not provisioned");
    let consumer = tokio::spawn(BookEventConsumer::new(subscription).run(shutdown.clone()));

    let producer = BookEventProducer::new(broker, config.topics.input_output_topic.clone());
    let state = match AppState::new(db, &config.jwt_secret, producer) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Invalid token secret, refusing to start");
            std::process::exit(1);
        }
    };

    let app = router(state);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .expect("Failed to parse bind address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    info!(%addr, "Book management service listening (docs at /docs)");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
    .await
    .expect("HTTP server failed");

    shutdown.cancel();
    if let Err(e) = consumer.await {
        error!(error = %e, "Book event listener terminated abnormally");
    }
    info!("Shutdown complete");
}
