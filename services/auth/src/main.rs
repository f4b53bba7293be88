use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use auth::{
    AppState,
    bootstrap::{BootstrapOutcome, ensure_admin_user},
    config::Settings,
    repositories::UserRepository,
    routes,
};
use common::database::{DatabaseConfig, health_check, init_pool};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting authentication service");

    let settings = Settings::from_env()?;
    let service_config = settings.service_config()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let user_repository = UserRepository::new(pool);
    user_repository.migrate().await?;

    let app_state = AppState::new(Arc::new(user_repository), service_config)?;

    if let BootstrapOutcome::Created(id) =
        ensure_admin_user(&app_state.user_service, &settings.bootstrap_config()).await?
    {
        info!("Bootstrap admin account {} is ready", id);
    }

    info!("Authentication service initialized successfully");

    let app = routes::create_router(app_state);

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Authentication service listening on {}", address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Authentication service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
