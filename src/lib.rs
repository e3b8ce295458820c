//! Access-controlled issue search endpoint and the autocomplete widget that
//! consumes it.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod state;
pub mod widget;

pub use client::{ClientError, IssueSource, SearchClient};
pub use config::Config;
pub use error::{AppError, Result};
pub use widget::{Autocomplete, WidgetSettings};
