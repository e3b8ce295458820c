use crate::client::{ClientError, IssueSource};
use crate::models::IssueRecord;
use crate::widget::binder::{InputBinder, InputCallback, DEFAULT_QUIET_WINDOW};
use crate::widget::dom::{
    Document, DomEvent, ElementId, EventKind, Key, ListenerId, ListenerTarget, OverlaySpec,
};
use crate::widget::renderer::{css, ResultRenderer, DATA_ID_ATTRIBUTE};
use crate::widget::settings::{WidgetSettings, MARKER_ELEMENT_ID};
use crate::widget::WidgetError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use validator::Validate;

/// Query parameter naming the issue the page is showing
const CURRENT_ISSUE_PARAM: &str = "id";

/// Visible state of the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum OverlayState {
    Hidden,
    /// Visible, results pending
    VisibleEmpty,
    VisibleTooShort,
    VisibleResults,
    VisibleFailed,
}

/// Elements the widget created, by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRoles {
    pub overlay: ElementId,
    /// The overlay's own search field; never becomes the active input
    pub search_field: ElementId,
    pub list: ElementId,
}

#[derive(Debug)]
struct WidgetState {
    overlay: OverlayState,
    active_input: Option<ElementId>,
    highlighted: Option<usize>,
    rows: Vec<IssueRecord>,
    last_search_term: Option<String>,
    /// Bumped on every new search, stale completions are dropped
    search_seq: u64,
    listeners: Vec<ListenerId>,
    focus_targets: Vec<ElementId>,
    destroyed: bool,
}

struct Shared {
    settings: WidgetSettings,
    document: Arc<dyn Document>,
    source: Arc<dyn IssueSource>,
    renderer: ResultRenderer,
    roles: FieldRoles,
    state: Mutex<WidgetState>,
}

/// Issue autocomplete bound to a host document.
///
/// Construct with [`Autocomplete::mount`] from within a tokio runtime, then
/// forward page events through [`Autocomplete::dispatch`].
pub struct Autocomplete {
    shared: Arc<Shared>,
    binder: InputBinder,
}

impl Autocomplete {
    /// Read settings from the page marker and attach to the page
    pub fn mount(document: Arc<dyn Document>, source: Arc<dyn IssueSource>) -> Result<Self, WidgetError> {
        let raw = document
            .marker_data(MARKER_ELEMENT_ID)
            .ok_or(WidgetError::MissingMarker(MARKER_ELEMENT_ID))?;
        let settings = WidgetSettings::from_marker(&raw)?;
        Self::with_settings(document, source, settings)
    }

    pub fn with_settings(
        document: Arc<dyn Document>,
        source: Arc<dyn IssueSource>,
        settings: WidgetSettings,
    ) -> Result<Self, WidgetError> {
        Self::with_quiet_window(document, source, settings, DEFAULT_QUIET_WINDOW)
    }

    pub fn with_quiet_window(
        document: Arc<dyn Document>,
        source: Arc<dyn IssueSource>,
        settings: WidgetSettings,
        quiet_window: Duration,
    ) -> Result<Self, WidgetError> {
        settings.validate()?;

        let handles = document.create_overlay(&OverlaySpec {
            style: (&settings.autocomplete_issue_window_settings).into(),
            search_input_name: css::SEARCH_INPUT.to_string(),
            placeholder: settings.search_for_issue_message.clone(),
        });
        let roles = FieldRoles {
            overlay: handles.container,
            search_field: handles.search_input,
            list: handles.list,
        };

        let mut listeners = vec![
            document.add_listener(ListenerTarget::Document, EventKind::KeyDown),
            document.add_listener(ListenerTarget::Document, EventKind::Click),
        ];
        let focus_targets: Vec<ElementId> = settings
            .search_input_names
            .iter()
            .flat_map(|name| document.inputs_named(name))
            .filter(|input| *input != roles.search_field)
            .collect();
        for input in &focus_targets {
            listeners.push(document.add_listener(ListenerTarget::Element(*input), EventKind::Focus));
        }

        let mut watched = settings.search_input_names.clone();
        watched.push(css::SEARCH_INPUT.to_string());

        let shared = Arc::new(Shared {
            renderer: ResultRenderer::new(&settings),
            settings,
            document: document.clone(),
            source,
            roles,
            state: Mutex::new(WidgetState {
                overlay: OverlayState::Hidden,
                active_input: None,
                highlighted: None,
                rows: Vec::new(),
                last_search_term: None,
                search_seq: 0,
                listeners,
                focus_targets,
                destroyed: false,
            }),
        });

        let on_input: InputCallback = {
            let shared = shared.clone();
            Arc::new(move |_input: ElementId, value: String| {
                Shared::on_settled_input(&shared, &value)
            })
        };
        let binder = InputBinder::with_quiet_window(document, &watched, on_input, quiet_window);

        debug!(
            inputs = binder.bound_inputs().len(),
            "Issue autocomplete mounted"
        );

        Ok(Self { shared, binder })
    }

    /// Route a page event to the widget
    pub fn dispatch(&self, event: DomEvent) -> Result<(), WidgetError> {
        if self.shared.state.lock().destroyed {
            return Ok(());
        }

        match event {
            DomEvent::Input { target, value } => {
                self.binder.handle_input(target, value);
                Ok(())
            }
            DomEvent::Focus { target } => {
                self.shared.on_focus(target);
                Ok(())
            }
            DomEvent::KeyDown { key } => self.shared.on_key(key),
            DomEvent::Click { target } => self.shared.on_click(target),
        }
    }

    /// Detach every listener and cancel pending work. Idempotent.
    pub fn destroy(&self) {
        let listeners = {
            let mut state = self.shared.state.lock();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.search_seq += 1;
            state.focus_targets.clear();
            std::mem::take(&mut state.listeners)
        };

        for listener in listeners {
            self.shared.document.remove_listener(listener);
        }
        self.binder.destroy();
        debug!("Issue autocomplete destroyed");
    }

    pub fn settings(&self) -> &WidgetSettings {
        &self.shared.settings
    }

    pub fn roles(&self) -> FieldRoles {
        self.shared.roles
    }

    pub fn overlay_state(&self) -> OverlayState {
        self.shared.state.lock().overlay
    }

    pub fn active_input(&self) -> Option<ElementId> {
        self.shared.state.lock().active_input
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.shared.state.lock().highlighted
    }

    pub fn last_search_term(&self) -> Option<String> {
        self.shared.state.lock().last_search_term.clone()
    }

    pub fn rows(&self) -> Vec<IssueRecord> {
        self.shared.state.lock().rows.clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.state.lock().destroyed
    }
}

impl Shared {
    fn on_focus(&self, target: ElementId) {
        let mut state = self.state.lock();
        if target == self.roles.search_field || !state.focus_targets.contains(&target) {
            return;
        }
        state.active_input = Some(target);
        self.document.disable_autocomplete(target);
    }

    fn on_settled_input(shared: &Arc<Shared>, value: &str) {
        let term = value.trim();
        let mut state = shared.state.lock();
        if state.destroyed {
            return;
        }

        // Any in-flight search is superseded from here on
        state.search_seq += 1;

        if term.is_empty() {
            shared.hide(&mut state);
            return;
        }

        shared.show(&mut state);
        shared.document.set_input_value(shared.roles.search_field, term);

        if term.chars().count() < shared.settings.min_search_length {
            shared.replace_rows(&mut state, Vec::new());
            shared
                .document
                .replace_list(shared.roles.list, shared.renderer.render_too_short());
            state.overlay = OverlayState::VisibleTooShort;
            return;
        }

        shared.replace_rows(&mut state, Vec::new());
        shared.document.replace_list(shared.roles.list, Vec::new());
        state.overlay = OverlayState::VisibleEmpty;
        state.last_search_term = Some(term.to_string());

        let seq = state.search_seq;
        let term = term.to_string();
        let shared = shared.clone();
        drop(state);

        tokio::spawn(async move {
            let result = shared.source.search(&term).await;
            shared.complete_search(seq, &term, result);
        });
    }

    fn complete_search(&self, seq: u64, term: &str, result: Result<Vec<IssueRecord>, ClientError>) {
        let mut state = self.state.lock();
        if state.destroyed || seq != state.search_seq {
            debug!(term, "Discarding stale search response");
            return;
        }
        if state.overlay == OverlayState::Hidden {
            debug!(term, "Overlay closed before results arrived");
            return;
        }

        match result {
            Ok(records) => {
                let current = self.document.query_param(CURRENT_ISSUE_PARAM);
                let items = self.renderer.render(&records, current.as_deref());
                self.document.replace_list(self.roles.list, items);
                self.replace_rows(&mut state, records);
                state.overlay = OverlayState::VisibleResults;
            }
            Err(e) => {
                warn!(term, error = %e, "Issue search failed");
                self.replace_rows(&mut state, Vec::new());
                self.document
                    .replace_list(self.roles.list, self.renderer.render_failure());
                state.overlay = OverlayState::VisibleFailed;
            }
        }
    }

    fn on_key(&self, key: Key) -> Result<(), WidgetError> {
        let mut state = self.state.lock();
        match key {
            Key::Escape => {
                self.hide(&mut state);
                Ok(())
            }
            Key::ArrowDown | Key::ArrowUp => {
                if state.overlay != OverlayState::VisibleResults || state.rows.is_empty() {
                    return Ok(());
                }
                let last = state.rows.len() - 1;
                let down = key == Key::ArrowDown;
                let next = match state.highlighted {
                    None => 0,
                    Some(i) if down => (i + 1).min(last),
                    Some(i) => i.saturating_sub(1),
                };
                state.highlighted = Some(next);
                self.document.set_highlighted(self.roles.list, Some(next));
                Ok(())
            }
            Key::Enter => {
                if state.overlay != OverlayState::VisibleResults {
                    return Ok(());
                }
                let id = match state.highlighted.and_then(|i| state.rows.get(i)) {
                    Some(record) => record.id.clone(),
                    None => return Ok(()),
                };
                self.commit(&mut state, &id)
            }
            Key::Other(_) => Ok(()),
        }
    }

    fn on_click(&self, target: ElementId) -> Result<(), WidgetError> {
        let mut state = self.state.lock();

        if !self.document.contains(self.roles.overlay, target) {
            self.hide(&mut state);
            return Ok(());
        }

        if !self.document.has_class(target, css::ISSUE_BUTTON) {
            return Ok(());
        }
        match self.document.attribute(target, DATA_ID_ATTRIBUTE) {
            Some(id) => self.commit(&mut state, &id),
            None => Ok(()),
        }
    }

    /// Write `id` into the active input and close the overlay
    fn commit(&self, state: &mut WidgetState, id: &str) -> Result<(), WidgetError> {
        let input = match state.active_input {
            Some(input) => input,
            None => {
                debug!(id, "Selection without an active input");
                return Ok(());
            }
        };

        self.document.set_input_value(input, id);
        let submitted = if self.settings.submit_on_select {
            self.document
                .submit_enclosing_form(input)
                .map_err(WidgetError::NoEnclosingForm)
        } else {
            Ok(())
        };

        self.hide(state);
        self.document.focus(input);
        debug!(id, "Issue selected");
        submitted
    }

    fn show(&self, state: &mut WidgetState) {
        if state.overlay == OverlayState::Hidden {
            self.document.set_overlay_visible(self.roles.overlay, true);
        }
    }

    fn hide(&self, state: &mut WidgetState) {
        if state.overlay != OverlayState::Hidden {
            self.document.set_overlay_visible(self.roles.overlay, false);
        }
        state.overlay = OverlayState::Hidden;
    }

    fn replace_rows(&self, state: &mut WidgetState, rows: Vec<IssueRecord>) {
        state.rows = rows;
        state.highlighted = None;
    }
}
