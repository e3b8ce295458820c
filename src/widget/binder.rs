use crate::widget::dom::{Document, ElementId, EventKind, ListenerId, ListenerTarget};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Callback receiving the settled value of a watched input
pub type InputCallback = Arc<dyn Fn(ElementId, String) + Send + Sync>;

/// Quiet window after the last keystroke before a value is delivered
pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(300);

/// Watches named inputs and delivers debounced values.
///
/// One debouncer is shared by every watched input: bursts across inputs
/// collapse into a single delivery of the last value. Must be attached from
/// within a tokio runtime.
pub struct InputBinder {
    document: Arc<dyn Document>,
    bound: Mutex<Vec<(ElementId, ListenerId)>>,
    sender: Mutex<Option<mpsc::UnboundedSender<(ElementId, String)>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl InputBinder {
    pub fn attach(document: Arc<dyn Document>, names: &[String], on_input: InputCallback) -> Self {
        Self::with_quiet_window(document, names, on_input, DEFAULT_QUIET_WINDOW)
    }

    pub fn with_quiet_window(
        document: Arc<dyn Document>,
        names: &[String],
        on_input: InputCallback,
        quiet_window: Duration,
    ) -> Self {
        let bound: Vec<(ElementId, ListenerId)> = names
            .iter()
            .flat_map(|name| document.inputs_named(name))
            .map(|input| {
                let listener = document.add_listener(ListenerTarget::Element(input), EventKind::Input);
                (input, listener)
            })
            .collect();

        if bound.is_empty() {
            debug!(?names, "No inputs matched, binder is inert");
            return Self {
                document,
                bound: Mutex::new(bound),
                sender: Mutex::new(None),
                task: Mutex::new(None),
            };
        }

        debug!(inputs = bound.len(), "Bound input listeners");

        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(debounce_loop(rx, quiet_window, on_input));

        Self {
            document,
            bound: Mutex::new(bound),
            sender: Mutex::new(Some(tx)),
            task: Mutex::new(Some(task)),
        }
    }

    /// Whether `input` currently has a live listener
    pub fn is_bound(&self, input: ElementId) -> bool {
        self.bound.lock().iter().any(|(id, _)| *id == input)
    }

    pub fn bound_inputs(&self) -> Vec<ElementId> {
        self.bound.lock().iter().map(|(id, _)| *id).collect()
    }

    /// Feed an input event. Returns false when `input` is not watched.
    pub fn handle_input(&self, input: ElementId, value: String) -> bool {
        if !self.is_bound(input) {
            return false;
        }
        match self.sender.lock().as_ref() {
            Some(tx) => tx.send((input, value)).is_ok(),
            None => false,
        }
    }

    /// Remove every listener and cancel any pending delivery. Idempotent.
    pub fn destroy(&self) {
        let bound = std::mem::take(&mut *self.bound.lock());
        for (_, listener) in bound {
            self.document.remove_listener(listener);
        }

        self.sender.lock().take();
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

impl Drop for InputBinder {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

async fn debounce_loop(
    mut rx: mpsc::UnboundedReceiver<(ElementId, String)>,
    quiet_window: Duration,
    on_input: InputCallback,
) {
    while let Some(mut latest) = rx.recv().await {
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(event) => latest = event,
                    // Sender dropped: pending value is discarded
                    None => return,
                },
                _ = tokio::time::sleep(quiet_window) => break,
            }
        }
        on_input(latest.0, latest.1);
    }
}
