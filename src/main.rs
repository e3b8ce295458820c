use issue_autocomplete::{
    api::{build_router, AppState},
    config::Config,
    search::{IssueFormatter, IssueSearchService, TableNames},
    state::create_backends,
    widget::WidgetSettings,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "issue_autocomplete={},tower_http=info",
            config.observability.log_level
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        service = %config.observability.service_name,
        "Starting issue autocomplete v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize storage backend
    tracing::info!("Storage backend: {:?}", config.storage.backend);
    let backends = create_backends(&config.storage).await?;
    tracing::info!("Storage backend initialized");

    let search = Arc::new(IssueSearchService::new(
        config.search.clone(),
        TableNames::new(&config.storage.table_prefix, &config.storage.table_suffix),
        IssueFormatter::new(&config.display),
        backends.store,
        backends.permissions.clone(),
    ));

    let app_state = AppState::new(
        search,
        backends.permissions,
        WidgetSettings::from_config(&config),
        config.auth.session_cookie.as_str(),
    );
    let app = build_router(app_state, &config.server);

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Issue search: http://{}{}", http_addr, config.server.search_path);

    let http_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutting down gracefully...");
    Ok(())
}
