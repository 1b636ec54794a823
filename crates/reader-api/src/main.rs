use reader_api::{build_router, sweeper, AppState, GatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::default();
    tracing::info!(
        searxng_instance_url = %config.searxng_instance_url,
        port = config.port,
        host = %config.host,
        "reader-api starting"
    );

    sweeper::spawn_sweeper(config.screenshot_root.clone());

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::build(config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
