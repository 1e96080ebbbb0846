mod auth;
mod db_core;
mod email;
mod error;
mod model;
mod pipeline;
mod prompt;
mod rate_limiters;
mod request_tracing;
mod routes;
mod server_config;
#[cfg(test)]
mod testing;
mod util;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use auth::credential_store::CredentialStore;
use axum::extract::FromRef;
use db_core::{migrate, prelude::*};
use email::{client::EmailClient, MailboxGateway};
use mimalloc::MiMalloc;
use pipeline::ReplyJobs;
use prompt::{CompletionClient, CompletionEngine};
use routes::AppRouter;
use server_config::ServerConfig;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub type HttpClient = reqwest::Client;
pub type Mailbox = Arc<dyn MailboxGateway>;
pub type Completion = Arc<dyn CompletionEngine>;

/// How long finished reply jobs stay pollable.
const REPLY_JOB_TTL_MINUTES: i64 = 30;
/// Running jobs older than this are assumed dead and dropped.
const REPLY_JOB_MAX_RUNTIME_MINUTES: i64 = 60;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub thread_limit: u32,
}

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub conn: DatabaseConnection,
    pub credentials: CredentialStore,
    pub mailbox: Mailbox,
    pub completion: Completion,
    pub reply_jobs: ReplyJobs,
    pub settings: PipelineSettings,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::Layer::default().with_ansi(false))
        .init();

    let config = ServerConfig::load()?;
    // check config
    println!("{}", config);

    let mut db_options = ConnectOptions::new(config.database_url.clone());
    db_options.sqlx_logging(false);
    let conn = Database::connect(db_options).await?;
    migrate::run(&conn).await?;

    let http_client = reqwest::ClientBuilder::new()
        .use_rustls_tls()
        .timeout(Duration::from_secs(config.http.request_timeout_secs))
        .build()?;

    let mailbox: Mailbox = Arc::new(EmailClient::new(
        http_client.clone(),
        &config.provider,
        config.frontend.base_url.clone(),
    ));
    let completion: Completion = Arc::new(CompletionClient::new(http_client, &config.completion));

    let state = ServerState {
        conn,
        credentials: CredentialStore::new(),
        mailbox,
        completion,
        reply_jobs: ReplyJobs::new(),
        settings: PipelineSettings {
            thread_limit: config.provider.thread_limit,
        },
    };

    {
        let reply_jobs = state.reply_jobs.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(5 * 60));
            loop {
                interval.tick().await;
                reply_jobs.clean_expired(
                    chrono::Duration::minutes(REPLY_JOB_TTL_MINUTES),
                    chrono::Duration::minutes(REPLY_JOB_MAX_RUNTIME_MINUTES),
                );
                tracing::debug!("{} reply jobs tracked", reply_jobs.len());
            }
        });
    }

    let router = AppRouter::create(state, &config.http.allowed_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http.port));
    tracing::info!("Server running on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down, exiting");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
