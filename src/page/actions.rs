use super::*;

impl Page {
    pub(crate) fn click_node(&mut self, target: NodeId) -> Result<()> {
        stacker::grow(32 * 1024 * 1024, || self.click_node_internal(target))
    }

    /// Dispatches `click` and then runs the target's activation
    /// behavior unless a listener prevented the default.
    fn click_node_internal(&mut self, target: NodeId) -> Result<()> {
        if self.dom.is_effectively_disabled(target) {
            return Ok(());
        }
        let event = self.dispatch_event(target, "click")?;
        if event.canceled {
            return Ok(());
        }
        if let Some(control) = self.resolve_label_control(target) {
            if control != target {
                return self.click_node_internal(control);
            }
        }
        if is_checkbox_input(&self.dom, target) {
            let flipped = !self.dom.checked(target)?;
            return self.flip_checked(target, flipped);
        }
        if is_radio_input(&self.dom, target) {
            if self.dom.checked(target)? {
                return Ok(());
            }
            self.uncheck_other_radios_in_group(target)?;
            return self.flip_checked(target, true);
        }
        if is_submit_control(&self.dom, target) {
            if let Some(form) = self.form_owner(target) {
                return self.request_form_submit_node(form);
            }
            return Ok(());
        }
        if is_reset_control(&self.dom, target) {
            if let Some(form) = self.form_owner(target) {
                return self.reset_form_node(form);
            }
            return Ok(());
        }
        self.follow_anchor_fragment(target)
    }

    /// A click on a label activates its control: the `for` target when
    /// present, otherwise the first labelable descendant.
    fn resolve_label_control(&self, target: NodeId) -> Option<NodeId> {
        if self.dom.tag_name(target) != Some("label") {
            return None;
        }
        if let Some(for_id) = self.dom.attr(target, "for") {
            let control = self.dom.by_id(&for_id)?;
            if is_labelable_control(&self.dom, control) {
                return Some(control);
            }
            return None;
        }
        self.dom
            .element_descendants(target)
            .into_iter()
            .find(|&node| is_labelable_control(&self.dom, node))
    }

    /// Toggles the live checked flag and announces the flip.
    pub(crate) fn flip_checked(&mut self, target: NodeId, checked: bool) -> Result<()> {
        self.dom.set_checked(target, checked)?;
        self.dispatch_event(target, "input")?;
        self.dispatch_event(target, "change")?;
        Ok(())
    }

    pub(crate) fn focus_node(&mut self, target: NodeId) -> Result<()> {
        let hidden_input =
            self.dom.tag_name(target) == Some("input") && self.input_kind(target) == "hidden";
        if hidden_input
            || self.dom.is_effectively_disabled(target)
            || self.active_element == Some(target)
        {
            return Ok(());
        }
        if let Some(previous) = self.active_element {
            self.dispatch_event(previous, "focusout")?;
            self.dispatch_event(previous, "blur")?;
        }
        self.active_element = Some(target);
        self.dispatch_event(target, "focusin")?;
        self.dispatch_event(target, "focus")?;
        Ok(())
    }

    pub(crate) fn blur_node(&mut self, target: NodeId) -> Result<()> {
        if self.active_element != Some(target) {
            return Ok(());
        }
        self.dispatch_event(target, "focusout")?;
        self.dispatch_event(target, "blur")?;
        self.active_element = None;
        Ok(())
    }

    pub(crate) fn press_enter_node(&mut self, target: NodeId) -> Result<()> {
        if self.dom.is_effectively_disabled(target) {
            return Ok(());
        }
        self.focus_node(target)?;
        let keydown = self.dispatch_event(target, "keydown")?;
        if !keydown.canceled {
            if self.is_single_line_text_input(target) {
                if let Some(form) = self.form_owner(target) {
                    self.request_form_submit_node(form)?;
                }
            } else if self.is_enter_click_target(target) {
                self.click_node_internal(target)?;
            }
        }
        self.dispatch_event(target, "keyup")?;
        Ok(())
    }

    fn is_enter_click_target(&self, target: NodeId) -> bool {
        match self.dom.tag_name(target) {
            Some("a") => self.dom.attr(target, "href").is_some(),
            Some("button") => true,
            _ => false,
        }
    }

    /// A missing type attribute counts as type=text.
    fn is_single_line_text_input(&self, target: NodeId) -> bool {
        if self.dom.tag_name(target) != Some("input") {
            return false;
        }
        self.dom.attr(target, "type").is_none_or(|kind| {
            matches!(
                kind.to_ascii_lowercase().as_str(),
                "text" | "search" | "url" | "tel" | "email" | "password" | "number"
            )
        })
    }

    pub(crate) fn request_form_submit_node(&mut self, form: NodeId) -> Result<()> {
        self.dispatch_event(form, "submit")?;
        Ok(())
    }

    /// Dispatches `reset` and, unless prevented, restores every
    /// control in the form to its markup default.
    pub(crate) fn reset_form_node(&mut self, form: NodeId) -> Result<()> {
        let event = self.dispatch_event(form, "reset")?;
        if event.canceled {
            return Ok(());
        }
        for control in self.dom.form_controls(form)? {
            if is_checkbox_input(&self.dom, control) || is_radio_input(&self.dom, control) {
                let default = self.dom.attr(control, "checked").is_some();
                self.dom.set_checked(control, default)?;
            } else if self.dom.tag_name(control) == Some("textarea") {
                let default = self.dom.text_content(control);
                self.dom.set_value(control, &default)?;
            } else {
                let default = self.dom.attr(control, "value").unwrap_or_default();
                self.dom.set_value(control, &default)?;
            }
        }
        Ok(())
    }

    pub(crate) fn form_owner(&self, node: NodeId) -> Option<NodeId> {
        if self.dom.tag_name(node) == Some("form") {
            return Some(node);
        }
        self.dom.find_ancestor_by_tag(node, "form")
    }

    /// Radio groups share a non-empty name and a form owner. Nameless
    /// radios never form a group.
    pub(crate) fn uncheck_other_radios_in_group(&mut self, target: NodeId) -> Result<()> {
        let Some(name) = self.dom.attr(target, "name").filter(|name| !name.is_empty()) else {
            return Ok(());
        };
        let owner = self.form_owner(target);
        let group: Vec<NodeId> = self
            .dom
            .all_element_nodes()
            .into_iter()
            .filter(|&node| node != target && is_radio_input(&self.dom, node))
            .filter(|&node| self.dom.attr(node, "name").as_deref() == Some(name.as_str()))
            .filter(|&node| self.form_owner(node) == owner)
            .collect();
        for node in group {
            if self.dom.checked(node)? {
                self.dom.set_checked(node, false)?;
            }
        }
        Ok(())
    }

    /// Default activation for anchors. Off-page hrefs only leave a
    /// trace line; fragment hrefs update the fragment and record an
    /// instant scroll when the addressed element exists.
    fn follow_anchor_fragment(&mut self, target: NodeId) -> Result<()> {
        if self.dom.tag_name(target) != Some("a") {
            return Ok(());
        }
        let Some(href) = self.dom.attr(target, "href") else {
            return Ok(());
        };
        let Some(fragment) = href.strip_prefix('#') else {
            self.trace_behavior(format!("[nav] navigate href={href}"));
            return Ok(());
        };
        self.fragment = Some(fragment.to_string());
        if fragment.is_empty() {
            self.trace_behavior("[nav] jump skipped empty fragment".to_string());
            return Ok(());
        }
        if self.dom.by_id(fragment).is_some() {
            self.scrolls.push(ScrollRecord {
                target: format!("#{fragment}"),
                behavior: "auto".to_string(),
                block: "start".to_string(),
            });
            self.trace_behavior(format!("[nav] jump target=#{fragment} behavior=auto"));
        } else {
            self.trace_behavior(format!("[nav] jump target=#{fragment} missing"));
        }
        Ok(())
    }
}
