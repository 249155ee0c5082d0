use std::collections::HashMap;

use crate::behavior::BehaviorAction;
use crate::dom::NodeId;

/// Where in the capture, target, bubble walk an event currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventPhase {
    Capture,
    AtTarget,
    Bubble,
}

impl EventPhase {
    pub(crate) fn label(self) -> &'static str {
        match self {
            EventPhase::Capture => "capture",
            EventPhase::AtTarget => "target",
            EventPhase::Bubble => "bubble",
        }
    }
}

/// One event mid-flight. Listeners receive it mutably and may cancel
/// its default action; the dispatcher reads the flags back afterwards.
#[derive(Debug, Clone)]
pub(crate) struct PageEvent {
    pub(crate) kind: String,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
    pub(crate) phase: EventPhase,
    pub(crate) trusted: bool,
    pub(crate) bubbles: bool,
    pub(crate) cancelable: bool,
    pub(crate) canceled: bool,
    pub(crate) halted: bool,
    pub(crate) halted_immediately: bool,
}

impl PageEvent {
    /// An event born from a user gesture: trusted, bubbling,
    /// cancelable.
    pub(crate) fn user_gesture(kind: &str, target: NodeId) -> Self {
        PageEvent {
            kind: kind.to_string(),
            target,
            current_target: target,
            phase: EventPhase::AtTarget,
            trusted: true,
            bubbles: true,
            cancelable: true,
            canceled: false,
            halted: false,
            halted_immediately: false,
        }
    }

    /// A programmatic event: untrusted, and it neither bubbles nor
    /// accepts cancellation.
    pub(crate) fn synthetic(kind: &str, target: NodeId) -> Self {
        PageEvent {
            trusted: false,
            bubbles: false,
            cancelable: false,
            ..PageEvent::user_gesture(kind, target)
        }
    }

    pub(crate) fn prevent_default(&mut self) {
        if self.cancelable {
            self.canceled = true;
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Listener {
    pub(crate) capture: bool,
    pub(crate) action: BehaviorAction,
}

/// Listener registrations keyed by node and event name.
#[derive(Debug, Clone, Default)]
pub(crate) struct ListenerTable {
    table: HashMap<(NodeId, String), Vec<Listener>>,
}

impl ListenerTable {
    pub(crate) fn register(
        &mut self,
        node: NodeId,
        kind: &str,
        capture: bool,
        action: BehaviorAction,
    ) {
        self.table
            .entry((node, kind.to_string()))
            .or_default()
            .push(Listener { capture, action });
    }

    // Dispatch runs on a copy of the registrations, so listeners
    // registered mid-flight wait for the next event.
    pub(crate) fn matching(&self, node: NodeId, kind: &str, capture: bool) -> Vec<Listener> {
        let Some(registered) = self.table.get(&(node, kind.to_string())) else {
            return Vec::new();
        };
        registered
            .iter()
            .filter(|listener| listener.capture == capture)
            .cloned()
            .collect()
    }
}
