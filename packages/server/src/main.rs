use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{Level, info};

use common::storage::ObjectStore;
use common::storage::filesystem::FilesystemObjectStore;
use common::storage::s3::S3ObjectStore;
use server::config::AppConfig;
use server::database;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = database::init_db(&config.database.url).await?;
    info!("Database connected");

    let assets: Arc<dyn ObjectStore> = match config.storage.backend.as_str() {
        "filesystem" => Arc::new(
            FilesystemObjectStore::new(
                config.storage.base_dir.clone().into(),
                config.storage.public_base_url.clone(),
                config.storage.max_file_size,
            )
            .await?,
        ),
        "s3" => Arc::new(S3ObjectStore::new(
            &config.storage.bucket,
            &config.storage.region,
            config.storage.max_file_size,
        )?),
        other => anyhow::bail!("unknown storage backend: {other}"),
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState { db, assets, config };
    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
