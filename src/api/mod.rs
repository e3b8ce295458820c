pub mod auth;
pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::search::IssueSearchService;
use crate::state::PermissionModel;
use crate::widget::WidgetSettings;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<IssueSearchService>,
    pub permissions: Arc<dyn PermissionModel>,
    /// Page-embedding settings served to host pages
    pub widget_settings: Arc<WidgetSettings>,
    /// Name of the cookie carrying the session token
    pub session_cookie: Arc<str>,
}

impl AppState {
    pub fn new(
        search: Arc<IssueSearchService>,
        permissions: Arc<dyn PermissionModel>,
        widget_settings: WidgetSettings,
        session_cookie: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            search,
            permissions,
            widget_settings: Arc::new(widget_settings),
            session_cookie: session_cookie.into(),
        }
    }
}
