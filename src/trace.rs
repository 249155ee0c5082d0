use crate::dom::NodeId;
use crate::event::PageEvent;
use crate::page::Page;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) events: bool,
    pub(crate) timers: bool,
    pub(crate) behaviors: bool,
    pub(crate) to_stderr: bool,
    pub(crate) log_limit: usize,
    pub(crate) logs: Vec<String>,
}

impl TraceState {
    pub(crate) fn new() -> Self {
        TraceState {
            enabled: false,
            events: true,
            timers: true,
            behaviors: true,
            to_stderr: true,
            log_limit: 10_000,
            logs: Vec::new(),
        }
    }
}

impl Page {
    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.enabled = enabled;
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace.to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace.events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace.timers = enabled;
    }

    pub fn set_trace_behaviors(&mut self, enabled: bool) {
        self.trace.behaviors = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::PageRuntime(
                "set_trace_log_limit requires at least 1 entry".to_string(),
            ));
        }
        self.trace.log_limit = max_entries;
        while self.trace.logs.len() > max_entries {
            self.trace.logs.remove(0);
        }
        Ok(())
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace.logs)
    }

    pub(crate) fn emit_trace(&mut self, line: String) {
        if !self.trace.enabled {
            return;
        }
        if self.trace.to_stderr {
            eprintln!("{line}");
        }
        if self.trace.logs.len() >= self.trace.log_limit {
            self.trace.logs.remove(0);
        }
        self.trace.logs.push(line);
    }

    pub(crate) fn trace_event(&mut self, line: String) {
        if self.trace.enabled && self.trace.events {
            self.emit_trace(line);
        }
    }

    pub(crate) fn trace_timer(&mut self, line: String) {
        if self.trace.enabled && self.trace.timers {
            self.emit_trace(line);
        }
    }

    pub(crate) fn trace_behavior(&mut self, line: String) {
        if self.trace.enabled && self.trace.behaviors {
            self.emit_trace(line);
        }
    }

    pub(crate) fn trace_label(&self, node: NodeId) -> String {
        match self.dom.attr(node, "id") {
            Some(id) if !id.is_empty() => format!("#{id}"),
            _ => match self.dom.tag_name(node) {
                Some(tag) => tag.to_string(),
                None => format!("node-{}", node.0),
            },
        }
    }

    pub(crate) fn trace_event_outcome(&mut self, event: &PageEvent, outcome: &str) {
        if !self.trace.enabled || !self.trace.events {
            return;
        }
        self.emit_trace(format!(
            "[event] done {} target={} current={} outcome={outcome} trusted={} default_prevented={} propagation_stopped={} immediate_stopped={}",
            event.kind,
            self.trace_label(event.target),
            self.trace_label(event.current_target),
            event.trusted,
            event.canceled,
            event.halted,
            event.halted_immediately
        ));
    }
}
