//! End-to-end widget behaviour against the in-memory document

use async_trait::async_trait;
use issue_autocomplete::client::{ClientError, IssueSource};
use issue_autocomplete::models::IssueRecord;
use issue_autocomplete::widget::{
    css, Autocomplete, Document, DomEvent, ElementId, Key, ListItem, MemoryDocument, MessageItem,
    OverlayState, WidgetError, WidgetSettings, MARKER_ELEMENT_ID,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Issue source answering from a script, recording every call
#[derive(Default)]
struct ScriptedSource {
    responses: Mutex<HashMap<String, (Duration, Vec<IssueRecord>)>>,
    failing: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    fn respond(&self, term: &str, records: Vec<IssueRecord>) {
        self.respond_after(term, Duration::ZERO, records);
    }

    fn respond_after(&self, term: &str, delay: Duration, records: Vec<IssueRecord>) {
        self.responses
            .lock()
            .insert(term.to_string(), (delay, records));
    }

    fn fail(&self, term: &str) {
        self.failing.lock().push(term.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl IssueSource for ScriptedSource {
    async fn search(&self, term: &str) -> Result<Vec<IssueRecord>, ClientError> {
        self.calls.lock().push(term.to_string());

        if self.failing.lock().iter().any(|t| t == term) {
            let err = serde_json::from_str::<Vec<IssueRecord>>("not json").unwrap_err();
            return Err(ClientError::MalformedResponse(err));
        }

        let (delay, records) = self
            .responses
            .lock()
            .get(term)
            .cloned()
            .unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(records)
    }
}

fn record(id: &str, summary: &str) -> IssueRecord {
    IssueRecord {
        id: id.to_string(),
        summary: summary.to_string(),
        project: "Core".to_string(),
        status: "new".to_string(),
        status_color: "status-10-fg".to_string(),
    }
}

fn marker(submit_on_select: bool) -> String {
    json!({
        "url": "/plugin/issue-search",
        "autocompleteIssueWindowSettings": {
            "width": "60%",
            "height": "50%",
            "background": "rgba(0, 0, 0, 0.8)"
        },
        "minSearchLength": 3,
        "minSearchLengthMessage": "Type at least 3 characters",
        "noIssueFoundMessage": "No issues found",
        "searchForIssueMessage": "Search for issue",
        "searchInputNames": ["bug_id", "dest_bug_id"],
        "fieldSeparator": "&#x276F;",
        "submitOnSelect": submit_on_select
    })
    .to_string()
}

struct Page {
    doc: Arc<MemoryDocument>,
    form: ElementId,
    input: ElementId,
    outside: ElementId,
    source: Arc<ScriptedSource>,
    widget: Autocomplete,
}

fn page_with(doc: MemoryDocument, submit_on_select: bool) -> Page {
    let doc = Arc::new(doc.with_marker(MARKER_ELEMENT_ID, marker(submit_on_select)));
    let form = doc.add_form();
    let input = doc.add_input("bug_id", Some(form));
    let outside = doc.add_element();
    let source = Arc::new(ScriptedSource::default());
    let widget = Autocomplete::mount(doc.clone(), source.clone()).unwrap();

    Page {
        doc,
        form,
        input,
        outside,
        source,
        widget,
    }
}

fn page(submit_on_select: bool) -> Page {
    page_with(MemoryDocument::new(), submit_on_select)
}

impl Page {
    fn focus(&self) {
        self.widget
            .dispatch(DomEvent::Focus { target: self.input })
            .unwrap();
    }

    fn input(&self, value: &str) {
        self.widget
            .dispatch(DomEvent::Input {
                target: self.input,
                value: value.to_string(),
            })
            .unwrap();
    }

    async fn type_settled(&self, value: &str) {
        self.input(value);
        settle().await;
    }

    fn key(&self, key: Key) -> Result<(), WidgetError> {
        self.widget.dispatch(DomEvent::KeyDown { key })
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(400)).await;
}

fn message_row(class: &str, text: &str) -> Vec<ListItem> {
    vec![ListItem::Message(MessageItem {
        class: class.to_string(),
        text: text.to_string(),
    })]
}

#[tokio::test(start_paused = true)]
async fn test_short_term_renders_message_without_search() {
    let page = page(false);
    page.type_settled("ab").await;

    assert_eq!(page.widget.overlay_state(), OverlayState::VisibleTooShort);
    assert!(page.doc.overlay_visible());
    assert_eq!(
        page.doc.list_items(),
        message_row(css::NO_ISSUES_ITEM, "Type at least 3 characters")
    );
    assert!(page.source.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_whitespace_term_hides_without_search() {
    let page = page(false);
    page.type_settled("   ").await;

    assert_eq!(page.widget.overlay_state(), OverlayState::Hidden);
    assert!(!page.doc.overlay_visible());
    assert!(page.source.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rapid_input_searches_once_with_last_value() {
    let page = page(false);
    for value in ["cra", "cras", "crash", "crash o", "crash on"] {
        page.input(value);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    settle().await;

    assert_eq!(page.source.calls(), vec!["crash on"]);
    assert_eq!(page.widget.last_search_term().as_deref(), Some("crash on"));
}

#[tokio::test(start_paused = true)]
async fn test_search_field_mirrors_trimmed_term() {
    let page = page(false);
    page.type_settled("  crash  ").await;

    let search_field = page.widget.roles().search_field;
    assert_eq!(page.doc.input_value(search_field).as_deref(), Some("crash"));
    assert_eq!(page.source.calls(), vec!["crash"]);
}

#[tokio::test(start_paused = true)]
async fn test_zero_results_render_no_issues_row() {
    let page = page(false);
    page.type_settled("login bug").await;

    assert_eq!(page.widget.overlay_state(), OverlayState::VisibleResults);
    assert_eq!(
        page.doc.list_items(),
        message_row(css::NO_ISSUES_ITEM, "No issues found")
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_results_empty_round_trip() {
    let page = page(false);
    page.source.respond("crash", vec![record("0000001", "Crash")]);

    page.type_settled("nothing").await;
    let first = page.doc.list_items();

    page.type_settled("crash").await;
    assert!(matches!(page.doc.list_items()[0], ListItem::Issue(_)));

    page.type_settled("nothing").await;
    assert_eq!(page.doc.list_items(), first);
    assert_eq!(page.widget.overlay_state(), OverlayState::VisibleResults);
}

#[tokio::test(start_paused = true)]
async fn test_current_issue_row_marked() {
    let page = page_with(MemoryDocument::new().with_query_param("id", "2"), false);
    page.source.respond(
        "crash",
        vec![record("0000001", "One"), record("0000002", "Two")],
    );
    page.type_settled("crash").await;

    let current: Vec<bool> = page
        .doc
        .list_items()
        .iter()
        .map(|item| matches!(item, ListItem::Issue(issue) if issue.current))
        .collect();
    assert_eq!(current, vec![false, true]);
}

#[tokio::test(start_paused = true)]
async fn test_keyboard_navigation_and_enter() {
    let page = page(false);
    page.source.respond(
        "crash",
        vec![record("0000001", "One"), record("0000002", "Two")],
    );
    page.focus();
    page.type_settled("crash").await;

    // Enter without highlight does nothing
    page.key(Key::Enter).unwrap();
    assert_eq!(page.widget.overlay_state(), OverlayState::VisibleResults);
    assert_eq!(page.doc.input_value(page.input).as_deref(), Some(""));

    page.key(Key::ArrowDown).unwrap();
    assert_eq!(page.widget.highlighted(), Some(0));
    assert_eq!(page.doc.highlighted_row(), Some(0));

    page.key(Key::ArrowDown).unwrap();
    page.key(Key::ArrowDown).unwrap();
    assert_eq!(page.widget.highlighted(), Some(1));

    page.key(Key::Enter).unwrap();
    assert_eq!(page.doc.input_value(page.input).as_deref(), Some("0000002"));
    assert_eq!(page.widget.overlay_state(), OverlayState::Hidden);
    assert!(!page.doc.overlay_visible());
    assert_eq!(page.doc.focused(), Some(page.input));
    assert_eq!(page.doc.submissions(page.form), 0);
}

#[tokio::test(start_paused = true)]
async fn test_click_selection_submits_form_once() {
    let page = page(true);
    page.source.respond("crash", vec![record("0000007", "Seven")]);
    page.focus();
    page.type_settled("crash").await;

    let button = page.doc.row_button(0).unwrap();
    page.widget.dispatch(DomEvent::Click { target: button }).unwrap();

    assert_eq!(page.doc.input_value(page.input).as_deref(), Some("0000007"));
    assert_eq!(page.doc.submissions(page.form), 1);
    assert_eq!(page.widget.overlay_state(), OverlayState::Hidden);
}

#[tokio::test(start_paused = true)]
async fn test_submit_without_form_is_an_error() {
    let doc = Arc::new(MemoryDocument::new().with_marker(MARKER_ELEMENT_ID, marker(true)));
    let input = doc.add_input("dest_bug_id", None);
    let source = Arc::new(ScriptedSource::default());
    source.respond("crash", vec![record("0000003", "Three")]);
    let widget = Autocomplete::mount(doc.clone(), source).unwrap();

    widget.dispatch(DomEvent::Focus { target: input }).unwrap();
    widget
        .dispatch(DomEvent::Input {
            target: input,
            value: "crash".to_string(),
        })
        .unwrap();
    settle().await;

    widget.dispatch(DomEvent::KeyDown { key: Key::ArrowDown }).unwrap();
    let result = widget.dispatch(DomEvent::KeyDown { key: Key::Enter });

    assert!(matches!(result, Err(WidgetError::NoEnclosingForm(_))));
    assert_eq!(doc.input_value(input).as_deref(), Some("0000003"));
}

#[tokio::test(start_paused = true)]
async fn test_escape_and_outside_click_hide() {
    let page = page(false);
    page.type_settled("crash").await;
    assert!(page.doc.overlay_visible());

    page.key(Key::Escape).unwrap();
    assert_eq!(page.widget.overlay_state(), OverlayState::Hidden);

    page.type_settled("crash again").await;
    assert!(page.doc.overlay_visible());

    // Clicks inside the overlay keep it open
    let list = page.widget.roles().list;
    page.widget.dispatch(DomEvent::Click { target: list }).unwrap();
    assert!(page.doc.overlay_visible());

    page.widget
        .dispatch(DomEvent::Click {
            target: page.outside,
        })
        .unwrap();
    assert!(!page.doc.overlay_visible());
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_discarded() {
    let page = page(false);
    page.source.respond_after(
        "slow",
        Duration::from_millis(1000),
        vec![record("0000001", "Slow")],
    );
    page.source.respond_after(
        "fast",
        Duration::from_millis(10),
        vec![record("0000002", "Fast")],
    );

    page.type_settled("slow").await;
    page.type_settled("fast").await;
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(page.source.calls(), vec!["slow", "fast"]);
    let rows = page.widget.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].summary, "Fast");
}

#[tokio::test(start_paused = true)]
async fn test_failed_search_renders_failure_row() {
    let page = page(false);
    page.source.fail("crash");
    page.type_settled("crash").await;

    assert_eq!(page.widget.overlay_state(), OverlayState::VisibleFailed);
    assert_eq!(
        page.doc.list_items(),
        message_row(css::SEARCH_FAILED_ITEM, "Search failed")
    );

    // Navigation stays disabled
    page.key(Key::ArrowDown).unwrap();
    assert_eq!(page.widget.highlighted(), None);
}

#[tokio::test(start_paused = true)]
async fn test_overlay_field_input_searches_but_keeps_active_input() {
    let page = page(false);
    page.source.respond("crash", vec![record("0000009", "Nine")]);
    page.focus();

    let search_field = page.widget.roles().search_field;
    page.widget
        .dispatch(DomEvent::Focus {
            target: search_field,
        })
        .unwrap();
    page.widget
        .dispatch(DomEvent::Input {
            target: search_field,
            value: "crash".to_string(),
        })
        .unwrap();
    settle().await;

    assert_eq!(page.source.calls(), vec!["crash"]);
    assert_eq!(page.widget.active_input(), Some(page.input));

    page.key(Key::ArrowDown).unwrap();
    page.key(Key::Enter).unwrap();
    assert_eq!(page.doc.input_value(page.input).as_deref(), Some("0000009"));
}

#[tokio::test(start_paused = true)]
async fn test_destroy_detaches_everything() {
    let page = page(false);
    assert!(page.doc.listener_count() > 0);

    page.input("pending");
    page.widget.destroy();
    page.widget.destroy();
    settle().await;

    assert_eq!(page.doc.listener_count(), 0);
    assert!(page.source.calls().is_empty());
    assert!(page.widget.is_destroyed());

    page.type_settled("crash").await;
    assert!(page.source.calls().is_empty());
}

#[tokio::test]
async fn test_missing_marker_is_fatal() {
    let doc = Arc::new(MemoryDocument::new());
    let result = Autocomplete::mount(doc, Arc::new(ScriptedSource::default()));
    assert!(matches!(result, Err(WidgetError::MissingMarker(_))));
}

#[tokio::test]
async fn test_invalid_marker_is_fatal() {
    let doc = Arc::new(MemoryDocument::new().with_marker(MARKER_ELEMENT_ID, r#"{"url": 5}"#));
    let result = Autocomplete::mount(doc, Arc::new(ScriptedSource::default()));
    assert!(matches!(result, Err(WidgetError::InvalidSettings(_))));
}

#[tokio::test]
async fn test_overlay_built_from_settings() {
    let page = page(false);
    let settings: &WidgetSettings = page.widget.settings();

    let style = page.doc.overlay_style().unwrap();
    assert_eq!(style.width, settings.autocomplete_issue_window_settings.width);
    assert_eq!(
        page.doc.placeholder(page.widget.roles().search_field).as_deref(),
        Some("Search for issue")
    );
    assert_eq!(page.doc.overlay_count(), 1);
}
