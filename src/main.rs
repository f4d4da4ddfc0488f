use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voluntree::{
    config::{get_config, init_config},
    database::{create_pool, run_migrations, MemoryStore, PgStore, Store},
    routes,
    services::storage_service::{FileStorage, LocalFileStorage},
    AppState,
};

fn init_tracing(format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("voluntree=info,tower_http=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(&config.log_format);

    let store: Arc<dyn Store> = if config.uses_memory_store() {
        tracing::warn!("DATABASE_URL selects the in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let pool = create_pool(config).await?;
        run_migrations(&pool).await?;
        Arc::new(PgStore::new(pool))
    };

    tokio::fs::create_dir_all(&config.uploads_dir).await?;
    let storage: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::new(
        config.uploads_dir.clone(),
        config.max_upload_bytes,
    ));

    let app_state = AppState::new(store, storage, Arc::new(config.clone())).await?;

    if let (Ok(username), Ok(email), Ok(password)) = (
        std::env::var("ADMIN_USERNAME"),
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) {
        if app_state
            .account_service
            .ensure_admin(&username, &email, &password)
            .await?
        {
            info!(%username, "bootstrap administrator created");
        }
    }

    info!("Serving uploads from: {}", config.uploads_dir.display());
    let app = routes::router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
