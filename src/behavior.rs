use crate::dom::{is_radio_input, Dom, NodeId};
use crate::event::PageEvent;
use crate::page::{FormSubmission, Page, ScrollRecord};
use crate::schedule::TimerTask;
use crate::Result;

mod form_validation;
mod menu_search;
mod navigation;

/// Handler bodies for the listeners wired at page load. Each variant
/// carries the nodes its handler captured when it was registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BehaviorAction {
    ScrollNavLink,
    FilterMenu {
        items: Vec<NodeId>,
    },
    ValidateFieldOnBlur,
    ClearFieldErrorOnInput,
    HandleContactSubmit {
        fields: Vec<NodeId>,
        success: Option<NodeId>,
    },
}

impl Page {
    pub(crate) fn wire_behaviors(&mut self) -> Result<()> {
        self.wire_navigation_scroller()?;
        self.wire_menu_filter()?;
        self.wire_form_validator()?;
        Ok(())
    }

    pub(crate) fn run_behavior_action(
        &mut self,
        action: &BehaviorAction,
        event: &mut PageEvent,
    ) -> Result<()> {
        match action {
            BehaviorAction::ScrollNavLink => self.scroll_nav_link(event),
            BehaviorAction::FilterMenu { items } => self.filter_menu_items(items, event),
            BehaviorAction::ValidateFieldOnBlur => {
                self.validate_field(event.current_target).map(|_| ())
            }
            BehaviorAction::ClearFieldErrorOnInput => self.clear_field_error(event.current_target),
            BehaviorAction::HandleContactSubmit { fields, success } => {
                self.handle_contact_submit(fields, *success, event)
            }
        }
    }
}
