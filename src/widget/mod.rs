//! Headless issue autocomplete widget.
//!
//! ```text
//! host page --DomEvent--> Autocomplete::dispatch
//!                              |
//!            InputBinder (300 ms quiet window)
//!                              |
//!                       IssueSource::search
//!                              |
//!            ResultRenderer --> Document::replace_list
//! ```
//!
//! Settings are read from the `data-data` attribute of the
//! `#imaticIssueAutocomplete` marker element.

pub mod binder;
pub mod controller;
pub mod dom;
pub mod error;
pub mod memory;
pub mod renderer;
pub mod settings;

pub use binder::{InputBinder, InputCallback, DEFAULT_QUIET_WINDOW};
pub use controller::{Autocomplete, FieldRoles, OverlayState};
pub use dom::{
    Document, DomEvent, ElementId, EventKind, IssueItem, Key, ListItem, ListenerId,
    ListenerTarget, MessageItem, OverlayHandles, OverlaySpec, OverlayStyle,
};
pub use error::{DocumentError, WidgetError};
pub use memory::MemoryDocument;
pub use renderer::{css, ResultRenderer, DATA_ID_ATTRIBUTE};
pub use settings::{WidgetSettings, MARKER_ELEMENT_ID};
