use super::*;

/// Named behavior attached to a node for one event type.
///
/// Handlers are plain data so a page can be inspected and driven without a
/// browser: listeners are cloned out of the store before they run, and the
/// page interprets them against its own DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// `mouseenter` on a flight card: lift it.
    CardRaise,
    /// `mouseleave` on a flight card: put it back.
    CardSettle,
    /// `input` on a passenger field; indexes the page's price bindings.
    PassengerInput { binding: usize },
    /// `submit` on a booking form: lock its submit control.
    BookingSubmit,
    /// `click` on a `data-bs-dismiss="alert"` control inside a banner.
    DismissAlert,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Handler>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, event: &str, handler: Handler) {
        self.map
            .entry(node_id)
            .or_default()
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    /// Every handler registered on `node_id` for `event`, in registration order.
    pub(crate) fn get(&self, node_id: NodeId, event: &str) -> Vec<Handler> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.map
            .values()
            .flat_map(|events| events.values())
            .map(Vec::len)
            .sum()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
    pub(crate) bubbles: bool,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            bubbles: event_bubbles(event_type),
        }
    }
}

fn event_bubbles(event_type: &str) -> bool {
    !matches!(
        event_type,
        "mouseenter" | "mouseleave" | "focus" | "blur" | "load" | "scroll"
    )
}
