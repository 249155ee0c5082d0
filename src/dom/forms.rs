use super::*;

fn is_form_control(dom: &Dom, node: NodeId) -> bool {
    matches!(dom.tag_name(node), Some("input" | "textarea" | "button"))
}

fn input_type_is(dom: &Dom, node: NodeId, expected: &str) -> bool {
    dom.attr(node, "type")
        .is_some_and(|kind| kind.eq_ignore_ascii_case(expected))
}

pub(crate) fn is_checkbox_input(dom: &Dom, node: NodeId) -> bool {
    dom.tag_name(node) == Some("input") && input_type_is(dom, node, "checkbox")
}

pub(crate) fn is_radio_input(dom: &Dom, node: NodeId) -> bool {
    dom.tag_name(node) == Some("input") && input_type_is(dom, node, "radio")
}

// A button element without a type attribute submits its form.
pub(crate) fn is_submit_control(dom: &Dom, node: NodeId) -> bool {
    match dom.tag_name(node) {
        Some("button") => dom
            .attr(node, "type")
            .is_none_or(|kind| kind.eq_ignore_ascii_case("submit")),
        Some("input") => input_type_is(dom, node, "submit"),
        _ => false,
    }
}

pub(crate) fn is_reset_control(dom: &Dom, node: NodeId) -> bool {
    matches!(dom.tag_name(node), Some("button" | "input")) && input_type_is(dom, node, "reset")
}

pub(crate) fn is_labelable_control(dom: &Dom, node: NodeId) -> bool {
    match dom.tag_name(node) {
        Some("button" | "textarea") => true,
        Some("input") => !input_type_is(dom, node, "hidden"),
        _ => false,
    }
}

impl Dom {
    pub(crate) fn form_controls(&self, form: NodeId) -> Result<Vec<NodeId>> {
        if self.tag_name(form) != Some("form") {
            return Err(Error::PageRuntime(
                "form elements target is not a form".to_string(),
            ));
        }
        let mut controls = Vec::new();
        self.collect_form_controls(form, &mut controls);
        Ok(controls)
    }

    fn collect_form_controls(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.node(node).children {
            if is_form_control(self, child) {
                out.push(child);
            }
            self.collect_form_controls(child, out);
        }
    }

    pub(crate) fn is_successful_form_data_control(&self, node: NodeId) -> bool {
        if self.is_effectively_disabled(node) {
            return false;
        }
        let name = self.attr(node, "name").unwrap_or_default();
        if name.is_empty() {
            return false;
        }
        match self.tag_name(node) {
            Some("textarea") => true,
            Some("input") => {
                let kind = self
                    .attr(node, "type")
                    .unwrap_or_else(|| "text".to_string())
                    .to_ascii_lowercase();
                match kind.as_str() {
                    "submit" | "reset" | "button" | "file" | "image" => false,
                    "checkbox" | "radio" => self.checked(node).unwrap_or(false),
                    _ => true,
                }
            }
            _ => false,
        }
    }

    pub(crate) fn form_data_control_value(&self, node: NodeId) -> Result<String> {
        let value = self.value(node)?;
        if (is_checkbox_input(self, node) || is_radio_input(self, node)) && value.is_empty() {
            return Ok("on".to_string());
        }
        Ok(value)
    }

    pub(crate) fn form_data_entries(&self, form: NodeId) -> Result<Vec<(String, String)>> {
        let mut entries = Vec::new();
        for control in self.form_controls(form)? {
            if !self.is_successful_form_data_control(control) {
                continue;
            }
            let name = self.attr(control, "name").unwrap_or_default();
            let value = self.form_data_control_value(control)?;
            entries.push((name, value));
        }
        Ok(entries)
    }
}
