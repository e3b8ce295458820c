//! Host document abstraction.
//!
//! The widget never touches a concrete DOM. Everything it needs from the
//! page goes through [`Document`], so the same controller drives a browser
//! binding or the in-memory page used by tests.

use crate::config::WindowSettings;
use crate::widget::DocumentError;
use std::fmt;
use std::str::FromStr;

/// Opaque handle to a node in the host document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a registered event listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    Document,
    Element(ElementId),
}

/// Event types the widget subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    Input,
    Focus,
    KeyDown,
    Click,
}

/// Keyboard keys the widget reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowUp,
    ArrowDown,
    Enter,
    Other(String),
}

impl FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Escape" => Key::Escape,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "Enter" => Key::Enter,
            other => Key::Other(other.to_string()),
        })
    }
}

/// Events delivered by the host to the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    /// An input's value changed
    Input { target: ElementId, value: String },
    /// An input received focus
    Focus { target: ElementId },
    /// A key was pressed anywhere in the document
    KeyDown { key: Key },
    /// A click landed on `target`
    Click { target: ElementId },
}

impl DomEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomEvent::Input { .. } => EventKind::Input,
            DomEvent::Focus { .. } => EventKind::Focus,
            DomEvent::KeyDown { .. } => EventKind::KeyDown,
            DomEvent::Click { .. } => EventKind::Click,
        }
    }
}

/// Inline style applied to the overlay container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayStyle {
    pub width: String,
    pub height: String,
    pub background: String,
}

impl From<&WindowSettings> for OverlayStyle {
    fn from(window: &WindowSettings) -> Self {
        Self {
            width: window.width.clone(),
            height: window.height.clone(),
            background: window.background.clone(),
        }
    }
}

/// Description of the overlay to build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySpec {
    pub style: OverlayStyle,
    /// Name of the overlay's own search field
    pub search_input_name: String,
    pub placeholder: String,
}

/// Nodes created for the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayHandles {
    pub container: ElementId,
    pub search_input: ElementId,
    pub list: ElementId,
}

/// A rendered issue row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueItem {
    /// Padded display id, also carried as the select affordance's `data-id`
    pub id: String,
    pub href: String,
    pub project: String,
    pub status: String,
    pub status_color: String,
    pub summary: String,
    /// Separator markup, inserted unescaped
    pub separator: String,
    /// Row describes the issue the page is currently showing
    pub current: bool,
}

/// A single-line informational row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageItem {
    pub class: String,
    pub text: String,
}

/// One entry of the overlay list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    Issue(IssueItem),
    Message(MessageItem),
}

/// Page operations used by the widget.
pub trait Document: Send + Sync {
    /// `data-data` attribute of the element with `element_id`
    fn marker_data(&self, element_id: &str) -> Option<String>;

    /// Query-string parameter of the page location
    fn query_param(&self, name: &str) -> Option<String>;

    /// All inputs carrying `name`, in document order
    fn inputs_named(&self, name: &str) -> Vec<ElementId>;

    fn add_listener(&self, target: ListenerTarget, kind: EventKind) -> ListenerId;

    fn remove_listener(&self, listener: ListenerId);

    /// Build the overlay, initially hidden, and attach it to the page
    fn create_overlay(&self, spec: &OverlaySpec) -> OverlayHandles;

    /// Toggle overlay visibility. Hosts may defer the change to the next paint.
    fn set_overlay_visible(&self, overlay: ElementId, visible: bool);

    /// Replace every row of `list`
    fn replace_list(&self, list: ElementId, items: Vec<ListItem>);

    /// Mark one row highlighted and scroll it into view; `None` clears
    fn set_highlighted(&self, list: ElementId, index: Option<usize>);

    fn input_value(&self, input: ElementId) -> Option<String>;

    fn set_input_value(&self, input: ElementId, value: &str);

    fn focus(&self, input: ElementId);

    /// Turn off native autocomplete on `input`
    fn disable_autocomplete(&self, input: ElementId);

    /// Submit the form enclosing `input`
    fn submit_enclosing_form(&self, input: ElementId) -> Result<(), DocumentError>;

    /// Whether `node` is `ancestor` or one of its descendants
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool;

    fn has_class(&self, element: ElementId, class: &str) -> bool;

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parsing() {
        assert_eq!("Escape".parse::<Key>().unwrap(), Key::Escape);
        assert_eq!("ArrowDown".parse::<Key>().unwrap(), Key::ArrowDown);
        assert_eq!("a".parse::<Key>().unwrap(), Key::Other("a".to_string()));
    }

    #[test]
    fn test_event_kind_names() {
        assert_eq!(EventKind::KeyDown.to_string(), "keydown");
        assert_eq!("click".parse::<EventKind>().unwrap(), EventKind::Click);
        assert_eq!(
            DomEvent::Input {
                target: ElementId(1),
                value: String::new()
            }
            .kind(),
            EventKind::Input
        );
    }
}
