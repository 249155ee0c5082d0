use crate::dom::{
    is_checkbox_input, is_labelable_control, is_radio_input, is_reset_control, is_submit_control,
    Dom, NodeId,
};
use crate::event::{ListenerTable, PageEvent};
use crate::html::parse_html;
use crate::schedule::{PendingTimer, QueuedTimer, TimerTask, VirtualClock};
use crate::selector;
use crate::trace::TraceState;
use crate::{Error, Result};

mod actions;
mod dispatch;
mod queries;
mod timers;

/// One accepted form submission, captured instead of sent anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub form: String,
    pub fields: Vec<(String, String)>,
}

/// One recorded scroll request, captured instead of moving a viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRecord {
    pub target: String,
    pub behavior: String,
    pub block: String,
}

/// A parsed page with its wired behaviors, event listeners, and
/// virtual clock. All interaction goes through the gesture methods;
/// observation goes through selectors.
#[derive(Debug)]
pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerTable,
    pub(crate) clock: VirtualClock,
    pub(crate) trace: TraceState,
    pub(crate) active_element: Option<NodeId>,
    pub(crate) fragment: Option<String>,
    pub(crate) submissions: Vec<FormSubmission>,
    pub(crate) scrolls: Vec<ScrollRecord>,
}

impl Page {
    /// Parses the markup and wires every behavior whose anchor
    /// elements the page contains.
    pub fn from_html(html: &str) -> Result<Self> {
        stacker::grow(32 * 1024 * 1024, || Self::from_html_impl(html))
    }

    fn from_html_impl(html: &str) -> Result<Self> {
        let dom = parse_html(html)?;
        let mut page = Page {
            dom,
            listeners: ListenerTable::default(),
            clock: VirtualClock::new(),
            trace: TraceState::new(),
            active_element: None,
            fragment: None,
            submissions: Vec::new(),
            scrolls: Vec::new(),
        };
        page.wire_behaviors()?;
        Ok(page)
    }

    /// Clicks the first match, with full activation behavior: label
    /// forwarding, checkbox and radio state, submit and reset
    /// buttons, anchor fragments.
    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.click_node(target)
    }

    /// Replaces the control's value and fires `input`, as one gesture.
    /// Disabled and readonly controls swallow the gesture silently.
    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.is_effectively_disabled(target) {
            return Ok(());
        }
        let tag = match self.dom.tag_name(target) {
            Some(tag @ ("input" | "textarea")) => tag.to_string(),
            Some(other) => return Err(self.wrong_kind(selector, "input or textarea", other)),
            None => return Err(self.wrong_kind(selector, "input or textarea", "non-element")),
        };
        if tag == "input" && matches!(self.input_kind(target).as_str(), "hidden" | "image") {
            return Ok(());
        }
        if self.dom.readonly(target) {
            return Ok(());
        }
        stacker::grow(32 * 1024 * 1024, || {
            self.dom.set_value(target, text)?;
            self.dispatch_event(target, "input")?;
            Ok(())
        })
    }

    /// Sets a checkbox or radio directly, firing `input` and `change`
    /// only when the state actually flips.
    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        const WANTED: &str = "input[type=checkbox|radio]";
        let target = self.select_one(selector)?;
        if self.dom.is_effectively_disabled(target) {
            return Ok(());
        }
        match self.dom.tag_name(target) {
            Some("input") => {}
            Some(other) => return Err(self.wrong_kind(selector, WANTED, other)),
            None => return Err(self.wrong_kind(selector, WANTED, "non-element")),
        }
        let kind = self.input_kind(target);
        if !matches!(kind.as_str(), "checkbox" | "radio") {
            return Err(self.wrong_kind(selector, WANTED, format!("input[type={kind}]")));
        }
        stacker::grow(32 * 1024 * 1024, || {
            if self.dom.checked(target)? == checked {
                return Ok(());
            }
            if kind == "radio" && checked {
                self.uncheck_other_radios_in_group(target)?;
            }
            self.flip_checked(target, checked)
        })
    }

    /// Moves focus to the first match, blurring whatever held it.
    pub fn focus(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        stacker::grow(32 * 1024 * 1024, || self.focus_node(target))
    }

    /// Removes focus from the first match if it currently holds it.
    pub fn blur(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        stacker::grow(32 * 1024 * 1024, || self.blur_node(target))
    }

    /// Presses Enter on the first match: keydown, then the element's
    /// Enter activation (implicit form submission for single-line
    /// inputs, click for links and buttons), then keyup.
    pub fn press_enter(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        stacker::grow(32 * 1024 * 1024, || self.press_enter_node(target))
    }

    /// Requests submission of the form owning the first match. The
    /// gesture is a no-op when the match has no form owner.
    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        stacker::grow(32 * 1024 * 1024, || {
            let Some(form) = self.form_owner(target) else {
                return Ok(());
            };
            self.request_form_submit_node(form)
        })
    }

    /// Dispatches a synthetic, untrusted event at the first match.
    pub fn dispatch(&mut self, selector: &str, event_type: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        stacker::grow(32 * 1024 * 1024, || {
            self.dispatch_untrusted_event(target, event_type).map(|_| ())
        })
    }

    /// Accepted submissions in order, oldest first.
    pub fn submissions(&self) -> &[FormSubmission] {
        &self.submissions
    }

    /// Recorded scroll requests in order, oldest first.
    pub fn scroll_history(&self) -> &[ScrollRecord] {
        &self.scrolls
    }

    /// The fragment set by the last followed in-page anchor, without
    /// the leading `#`.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// The id of the focused element, if one is focused and has an id.
    pub fn active_element_id(&self) -> Option<String> {
        let active = self.active_element?;
        self.dom.attr(active, "id")
    }

    fn input_kind(&self, node: NodeId) -> String {
        self.dom
            .attr(node, "type")
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    fn wrong_kind(&self, selector: &str, expected: &str, actual: impl ToString) -> Error {
        Error::TypeMismatch {
            selector: selector.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
