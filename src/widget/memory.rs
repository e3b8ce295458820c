//! In-memory page model implementing [`Document`].

use crate::widget::dom::{
    Document, ElementId, EventKind, ListItem, ListenerId, ListenerTarget, OverlayHandles,
    OverlaySpec, OverlayStyle,
};
use crate::widget::renderer::{css, DATA_ID_ATTRIBUTE};
use crate::widget::DocumentError;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
enum NodeKind {
    Element,
    Form {
        submissions: usize,
    },
    Input {
        name: String,
        value: String,
        autocomplete_off: bool,
        placeholder: Option<String>,
    },
    Overlay {
        visible: bool,
        style: OverlayStyle,
    },
    List {
        items: Vec<ListItem>,
        highlighted: Option<usize>,
        scrolled_to: Option<usize>,
        buttons: Vec<Option<ElementId>>,
    },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<ElementId>,
    classes: HashSet<String>,
    attributes: HashMap<String, String>,
}

impl Node {
    fn new(kind: NodeKind, parent: Option<ElementId>) -> Self {
        Self {
            kind,
            parent,
            classes: HashSet::new(),
            attributes: HashMap::new(),
        }
    }

    fn with_class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }
}

#[derive(Debug, Default)]
struct Page {
    next_id: u64,
    nodes: HashMap<ElementId, Node>,
    markers: HashMap<String, String>,
    query: HashMap<String, String>,
    listeners: HashMap<ListenerId, (ListenerTarget, EventKind)>,
    focused: Option<ElementId>,
    overlays: Vec<ElementId>,
}

impl Page {
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert(&mut self, node: Node) -> ElementId {
        let id = ElementId(self.next());
        self.nodes.insert(id, node);
        id
    }

    fn enclosing_form(&self, element: ElementId) -> Option<ElementId> {
        let mut current = self.nodes.get(&element)?.parent;
        while let Some(id) = current {
            let node = self.nodes.get(&id)?;
            if matches!(node.kind, NodeKind::Form { .. }) {
                return Some(id);
            }
            current = node.parent;
        }
        None
    }
}

/// A scriptable page for driving the widget without a browser
#[derive(Debug, Default)]
pub struct MemoryDocument {
    page: Mutex<Page>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the configuration marker element
    pub fn with_marker(self, element_id: &str, data: impl Into<String>) -> Self {
        self.page
            .lock()
            .markers
            .insert(element_id.to_string(), data.into());
        self
    }

    pub fn with_query_param(self, name: &str, value: impl Into<String>) -> Self {
        self.page.lock().query.insert(name.to_string(), value.into());
        self
    }

    pub fn add_form(&self) -> ElementId {
        self.page
            .lock()
            .insert(Node::new(NodeKind::Form { submissions: 0 }, None))
    }

    /// Add a named input, optionally inside `form`
    pub fn add_input(&self, name: &str, form: Option<ElementId>) -> ElementId {
        self.page.lock().insert(Node::new(
            NodeKind::Input {
                name: name.to_string(),
                value: String::new(),
                autocomplete_off: false,
                placeholder: None,
            },
            form,
        ))
    }

    /// Add an unrelated page element
    pub fn add_element(&self) -> ElementId {
        self.page.lock().insert(Node::new(NodeKind::Element, None))
    }

    pub fn submissions(&self, form: ElementId) -> usize {
        match self.page.lock().nodes.get(&form).map(|n| &n.kind) {
            Some(NodeKind::Form { submissions }) => *submissions,
            _ => 0,
        }
    }

    pub fn overlay_count(&self) -> usize {
        self.page.lock().overlays.len()
    }

    /// Visibility of the most recently created overlay
    pub fn overlay_visible(&self) -> bool {
        let page = self.page.lock();
        page.overlays
            .last()
            .and_then(|id| page.nodes.get(id))
            .map(|node| matches!(node.kind, NodeKind::Overlay { visible: true, .. }))
            .unwrap_or(false)
    }

    pub fn overlay_style(&self) -> Option<OverlayStyle> {
        let page = self.page.lock();
        let node = page.nodes.get(page.overlays.last()?)?;
        match &node.kind {
            NodeKind::Overlay { style, .. } => Some(style.clone()),
            _ => None,
        }
    }

    fn with_list<T>(&self, f: impl Fn(&NodeKind) -> Option<T>) -> Option<T> {
        let page = self.page.lock();
        page.nodes
            .values()
            .find(|node| matches!(node.kind, NodeKind::List { .. }))
            .and_then(|node| f(&node.kind))
    }

    /// Rows currently in the overlay list
    pub fn list_items(&self) -> Vec<ListItem> {
        self.with_list(|kind| match kind {
            NodeKind::List { items, .. } => Some(items.clone()),
            _ => None,
        })
        .unwrap_or_default()
    }

    pub fn highlighted_row(&self) -> Option<usize> {
        self.with_list(|kind| match kind {
            NodeKind::List { highlighted, .. } => *highlighted,
            _ => None,
        })
    }

    pub fn scrolled_to(&self) -> Option<usize> {
        self.with_list(|kind| match kind {
            NodeKind::List { scrolled_to, .. } => *scrolled_to,
            _ => None,
        })
    }

    /// Select affordance of row `index`
    pub fn row_button(&self, index: usize) -> Option<ElementId> {
        self.with_list(|kind| match kind {
            NodeKind::List { buttons, .. } => buttons.get(index).copied().flatten(),
            _ => None,
        })
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.page.lock().focused
    }

    pub fn autocomplete_disabled(&self, input: ElementId) -> bool {
        matches!(
            self.page.lock().nodes.get(&input).map(|n| &n.kind),
            Some(NodeKind::Input {
                autocomplete_off: true,
                ..
            })
        )
    }

    pub fn placeholder(&self, input: ElementId) -> Option<String> {
        match self.page.lock().nodes.get(&input).map(|n| &n.kind) {
            Some(NodeKind::Input { placeholder, .. }) => placeholder.clone(),
            _ => None,
        }
    }

    /// Number of live listeners
    pub fn listener_count(&self) -> usize {
        self.page.lock().listeners.len()
    }

    pub fn listeners_on(&self, target: ListenerTarget) -> Vec<EventKind> {
        self.page
            .lock()
            .listeners
            .values()
            .filter(|(t, _)| *t == target)
            .map(|(_, kind)| *kind)
            .collect()
    }
}

impl Document for MemoryDocument {
    fn marker_data(&self, element_id: &str) -> Option<String> {
        self.page.lock().markers.get(element_id).cloned()
    }

    fn query_param(&self, name: &str) -> Option<String> {
        self.page.lock().query.get(name).cloned()
    }

    fn inputs_named(&self, name: &str) -> Vec<ElementId> {
        let page = self.page.lock();
        let mut inputs: Vec<ElementId> = page
            .nodes
            .iter()
            .filter(|(_, node)| matches!(&node.kind, NodeKind::Input { name: n, .. } if n == name))
            .map(|(id, _)| *id)
            .collect();
        inputs.sort();
        inputs
    }

    fn add_listener(&self, target: ListenerTarget, kind: EventKind) -> ListenerId {
        let mut page = self.page.lock();
        let id = ListenerId(page.next());
        page.listeners.insert(id, (target, kind));
        id
    }

    fn remove_listener(&self, listener: ListenerId) {
        self.page.lock().listeners.remove(&listener);
    }

    fn create_overlay(&self, spec: &OverlaySpec) -> OverlayHandles {
        let mut page = self.page.lock();

        let container = page.insert(
            Node::new(
                NodeKind::Overlay {
                    visible: false,
                    style: spec.style.clone(),
                },
                None,
            )
            .with_class(css::OVERLAY),
        );
        let search_input = page.insert(
            Node::new(
                NodeKind::Input {
                    name: spec.search_input_name.clone(),
                    value: String::new(),
                    autocomplete_off: false,
                    placeholder: Some(spec.placeholder.clone()),
                },
                Some(container),
            )
            .with_class(css::SEARCH_INPUT),
        );
        let list = page.insert(
            Node::new(
                NodeKind::List {
                    items: Vec::new(),
                    highlighted: None,
                    scrolled_to: None,
                    buttons: Vec::new(),
                },
                Some(container),
            )
            .with_class(css::LIST),
        );
        page.overlays.push(container);

        OverlayHandles {
            container,
            search_input,
            list,
        }
    }

    fn set_overlay_visible(&self, overlay: ElementId, visible: bool) {
        if let Some(node) = self.page.lock().nodes.get_mut(&overlay) {
            if let NodeKind::Overlay { visible: v, .. } = &mut node.kind {
                *v = visible;
            }
        }
    }

    fn replace_list(&self, list: ElementId, items: Vec<ListItem>) {
        let mut page = self.page.lock();

        let old_buttons = match page.nodes.get(&list).map(|n| &n.kind) {
            Some(NodeKind::List { buttons, .. }) => buttons.clone(),
            _ => return,
        };
        for button in old_buttons.into_iter().flatten() {
            page.nodes.remove(&button);
        }

        let buttons: Vec<Option<ElementId>> = items
            .iter()
            .map(|item| match item {
                ListItem::Issue(issue) => {
                    let mut node =
                        Node::new(NodeKind::Element, Some(list)).with_class(css::ISSUE_BUTTON);
                    node.attributes
                        .insert(DATA_ID_ATTRIBUTE.to_string(), issue.id.clone());
                    Some(page.insert(node))
                }
                ListItem::Message(_) => None,
            })
            .collect();

        if let Some(node) = page.nodes.get_mut(&list) {
            node.kind = NodeKind::List {
                items,
                highlighted: None,
                scrolled_to: None,
                buttons,
            };
        }
    }

    fn set_highlighted(&self, list: ElementId, index: Option<usize>) {
        if let Some(node) = self.page.lock().nodes.get_mut(&list) {
            if let NodeKind::List {
                highlighted,
                scrolled_to,
                ..
            } = &mut node.kind
            {
                *highlighted = index;
                if index.is_some() {
                    *scrolled_to = index;
                }
            }
        }
    }

    fn input_value(&self, input: ElementId) -> Option<String> {
        match self.page.lock().nodes.get(&input).map(|n| &n.kind) {
            Some(NodeKind::Input { value, .. }) => Some(value.clone()),
            _ => None,
        }
    }

    fn set_input_value(&self, input: ElementId, new_value: &str) {
        if let Some(node) = self.page.lock().nodes.get_mut(&input) {
            if let NodeKind::Input { value, .. } = &mut node.kind {
                *value = new_value.to_string();
            }
        }
    }

    fn focus(&self, input: ElementId) {
        let mut page = self.page.lock();
        if page.nodes.contains_key(&input) {
            page.focused = Some(input);
        }
    }

    fn disable_autocomplete(&self, input: ElementId) {
        if let Some(node) = self.page.lock().nodes.get_mut(&input) {
            if let NodeKind::Input {
                autocomplete_off, ..
            } = &mut node.kind
            {
                *autocomplete_off = true;
            }
        }
    }

    fn submit_enclosing_form(&self, input: ElementId) -> Result<(), DocumentError> {
        let mut page = self.page.lock();
        if !page.nodes.contains_key(&input) {
            return Err(DocumentError::UnknownElement(input.0));
        }
        let form = page
            .enclosing_form(input)
            .ok_or(DocumentError::NoEnclosingForm(input.0))?;

        if let Some(node) = page.nodes.get_mut(&form) {
            if let NodeKind::Form { submissions } = &mut node.kind {
                *submissions += 1;
            }
        }
        Ok(())
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let page = self.page.lock();
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = page.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.page
            .lock()
            .nodes
            .get(&element)
            .map(|node| node.classes.contains(class))
            .unwrap_or(false)
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.page
            .lock()
            .nodes
            .get(&element)
            .and_then(|node| node.attributes.get(name).cloned())
    }
}
