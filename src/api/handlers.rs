use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::{IssueRecord, User};
use crate::widget::WidgetSettings;
use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Search issues for the autocomplete widget
pub async fn search_issues(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: std::result::Result<Json<SearchIssuesRequest>, JsonRejection>,
) -> Result<Json<Vec<IssueRecord>>> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    request.validate()?;

    let records = state
        .search
        .build_and_run(&request.issue_search_autocomplete, &user)
        .await?;

    Ok(Json(records))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchIssuesRequest {
    /// Raw search term; a missing key searches for nothing
    #[serde(default)]
    #[validate(length(max = 255))]
    pub issue_search_autocomplete: String,
}

/// Any method other than POST on the search endpoint
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed("Only POST requests are allowed".to_string())
}

/// Page-embedding configuration for the autocomplete widget
pub async fn widget_settings(State(state): State<AppState>) -> Json<WidgetSettings> {
    Json(state.widget_settings.as_ref().clone())
}
