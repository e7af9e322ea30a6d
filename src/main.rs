use std::sync::Arc;

use karalink::common::banner::{self, BannerInfo};
use karalink::common::http::HttpClient;
use karalink::common::types::AnyResult;
use karalink::configs::Config;
use karalink::lyrics::LyricsResolver;
use karalink::server::AppState;
use karalink::store::Store;
use karalink::transport;
use karalink::youtube::YtDlp;
use tracing::info;

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::load()?;

    let default_directive = config
        .logging
        .as_ref()
        .and_then(|logging| logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    banner::print_banner(&BannerInfo::default());

    let store = Arc::new(Store::open(config.database.path.as_ref())?);
    let resolver = Arc::new(LyricsResolver::new(&config.lyrics, store.clone()));
    let youtube = Arc::new(YtDlp::new(
        &config.youtube.executable,
        config.youtube.search_limit,
    ));

    let address = format!("{}:{}", config.server.host, config.server.port);

    let shared_state = Arc::new(AppState {
        config,
        store,
        resolver,
        youtube,
        http: HttpClient::streaming()?,
    });

    let app = transport::http_server::router(shared_state);

    info!("Karalink listening on {}", address);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", err);
    }
}
