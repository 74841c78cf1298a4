use tracing_subscriber::EnvFilter;

use medbook::api::{api_router, ApiContext};
use medbook::{config, db};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let db_path = config::database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).expect("Cannot create data directory");
    }

    // Migrations and the legacy-appointment backfill run inside open_database
    let conn = db::open_database(&db_path).expect("Cannot open database");
    tracing::info!("Database ready at {}", db_path.display());

    let app = api_router(ApiContext::new(conn));
    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Cannot bind listen address");
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app).await.expect("Server error");
}
