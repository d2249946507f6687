use std::sync::Arc;

use evalpro::api::router;
use evalpro::config::AppConfig;
use evalpro::events::TracingEventLogger;
use evalpro::gateway::{CoursesApi, HttpCoursesApi};
use evalpro::services::CourseStore;
use evalpro::state::AppState;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "evalpro=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let api: Arc<dyn CoursesApi> = Arc::new(HttpCoursesApi::from_base_url(config.api_url.clone())?);
    let store = CourseStore::new(api.clone(), Arc::new(TracingEventLogger), config.fetch_timeout);

    let state = AppState {
        api,
        store: store.clone(),
    };

    let app = router(state);

    info!("backend at {}", config.api_url);
    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(store))
        .await?;

    Ok(())
}

async fn shutdown_signal(store: CourseStore) {
    tokio::signal::ctrl_c().await.ok();
    info!("shutting down");
    store.shutdown();
}
