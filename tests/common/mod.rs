//! Shared fixtures for the integration tests

#![allow(dead_code)]

use axum::Router;
use issue_autocomplete::{
    api::{build_router, AppState},
    config::Config,
    search::{Dialect, IssueFormatter, IssueSearchService, TableNames},
    state::create_backends,
    widget::WidgetSettings,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const ALICE_TOKEN: &str = "alice-token";
pub const DEV_TOKEN: &str = "dev-token";

pub fn seed_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/seed.json")
}

/// Default configuration pointed at the fixture seed
pub fn test_config() -> Config {
    let mut config = Config::load_from(Path::new("/nonexistent/issue-autocomplete.toml")).unwrap();
    config.storage.seed_path = Some(seed_path());
    config
}

/// Router wired the same way the server binary wires it
pub async fn app_with(config: Config) -> Router {
    let backends = create_backends(&config.storage).await.unwrap();

    let search = Arc::new(IssueSearchService::new(
        config.search.clone(),
        TableNames::new(&config.storage.table_prefix, &config.storage.table_suffix),
        IssueFormatter::new(&config.display),
        backends.store,
        backends.permissions.clone(),
    ));
    let state = AppState::new(
        search,
        backends.permissions,
        WidgetSettings::from_config(&config),
        config.auth.session_cookie.as_str(),
    );

    build_router(state, &config.server)
}

pub async fn app() -> Router {
    app_with(test_config()).await
}

pub async fn app_with_dialect(dialect: Dialect) -> Router {
    let mut config = test_config();
    config.storage.dialect = dialect;
    app_with(config).await
}
