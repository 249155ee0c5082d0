use super::*;
use crate::event::EventPhase;

impl Page {
    pub(crate) fn dispatch_event(&mut self, target: NodeId, kind: &str) -> Result<PageEvent> {
        let mut event = PageEvent::user_gesture(kind, target);
        self.propagate(&mut event)?;
        Ok(event)
    }

    pub(crate) fn dispatch_untrusted_event(
        &mut self,
        target: NodeId,
        kind: &str,
    ) -> Result<PageEvent> {
        let mut event = PageEvent::synthetic(kind, target);
        self.propagate(&mut event)?;
        Ok(event)
    }

    /// Walks capture, target, bubble for one event. The path is frozen
    /// up front, so a listener that reparents nodes cannot reroute the
    /// event mid-flight.
    fn propagate(&mut self, event: &mut PageEvent) -> Result<()> {
        let outcome = self.walk_phases(event)?;
        self.trace_event_outcome(event, outcome);
        Ok(())
    }

    fn walk_phases(&mut self, event: &mut PageEvent) -> Result<&'static str> {
        let mut above = Vec::new();
        let mut cursor = self.dom.parent(event.target);
        while let Some(node) = cursor {
            above.push(node);
            cursor = self.dom.parent(node);
        }
        above.reverse();

        for index in 0..above.len() {
            if !self.deliver(above[index], event, EventPhase::Capture, true)? {
                return Ok("propagation_stopped");
            }
        }

        // Capture registrations fire first at the target as well.
        if !self.deliver(event.target, event, EventPhase::AtTarget, true)? {
            return Ok("propagation_stopped");
        }
        if !self.deliver(event.target, event, EventPhase::AtTarget, false)? {
            return Ok("propagation_stopped");
        }

        if event.bubbles {
            for index in (0..above.len()).rev() {
                if !self.deliver(above[index], event, EventPhase::Bubble, false)? {
                    return Ok("propagation_stopped");
                }
            }
        }
        Ok("completed")
    }

    /// Fires the listeners for one node and reports whether the walk
    /// may continue past it.
    fn deliver(
        &mut self,
        node: NodeId,
        event: &mut PageEvent,
        phase: EventPhase,
        capture: bool,
    ) -> Result<bool> {
        event.phase = phase;
        event.current_target = node;
        for listener in self.listeners.matching(node, &event.kind, capture) {
            if self.trace.enabled && self.trace.events {
                self.trace_event(format!(
                    "[event] {} target={} current={} phase={} default_prevented={}",
                    event.kind,
                    self.trace_label(event.target),
                    self.trace_label(node),
                    event.phase.label(),
                    event.canceled
                ));
            }
            self.run_behavior_action(&listener.action, event)?;
            if event.halted_immediately {
                break;
            }
        }
        Ok(!event.halted)
    }
}
