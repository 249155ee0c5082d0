use fancy_regex::Regex;

use super::*;

const SUCCESS_REVERT_DELAY_MS: i64 = 3000;

/// The first failed constraint for a field, in check order. Message
/// text matches what the page shows next to the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConstraintIssue {
    ValueMissing,
    TypeMismatch { input_type: String },
    TooShort { minlength: usize },
    PatternMismatch,
}

impl ConstraintIssue {
    pub(crate) fn message(&self) -> String {
        match self {
            ConstraintIssue::ValueMissing => "This field is required".to_string(),
            ConstraintIssue::TypeMismatch { input_type } => {
                format!("Please enter a valid {input_type}")
            }
            ConstraintIssue::TooShort { minlength } => {
                format!("Minimum {minlength} characters required")
            }
            ConstraintIssue::PatternMismatch => "Please match the required format".to_string(),
        }
    }

    pub(crate) fn reason(&self) -> &'static str {
        match self {
            ConstraintIssue::ValueMissing => "value_missing",
            ConstraintIssue::TypeMismatch { .. } => "type_mismatch",
            ConstraintIssue::TooShort { .. } => "too_short",
            ConstraintIssue::PatternMismatch => "pattern_mismatch",
        }
    }
}

impl Page {
    pub(crate) fn wire_form_validator(&mut self) -> Result<()> {
        let Some(form) = self.select_all("#contact-form")?.into_iter().next() else {
            return Ok(());
        };
        let fields = self.select_all("#contact-form input, #contact-form textarea")?;
        for &field in &fields {
            self.listeners
                .register(field, "blur", false, BehaviorAction::ValidateFieldOnBlur);
            self.listeners
                .register(field, "input", false, BehaviorAction::ClearFieldErrorOnInput);
        }
        let success = self.select_all("#success-message")?.into_iter().next();
        self.listeners.register(
            form,
            "submit",
            false,
            BehaviorAction::HandleContactSubmit { fields, success },
        );
        Ok(())
    }

    pub(crate) fn validate_field(&mut self, field: NodeId) -> Result<bool> {
        match self.field_constraint_issue(field)? {
            Some(issue) => {
                self.dom.add_class(field, "error")?;
                if let Some(slot) = self.field_error_slot(field) {
                    self.dom.set_text_content(slot, &issue.message())?;
                }
                let label = self.trace_label(field);
                self.trace_behavior(format!(
                    "[form] invalid field={label} reason={}",
                    issue.reason()
                ));
                Ok(false)
            }
            None => {
                self.clear_field_error(field)?;
                Ok(true)
            }
        }
    }

    pub(crate) fn clear_field_error(&mut self, field: NodeId) -> Result<()> {
        self.dom.remove_class(field, "error")?;
        if let Some(slot) = self.field_error_slot(field) {
            self.dom.set_text_content(slot, "")?;
        }
        Ok(())
    }

    fn field_error_slot(&self, field: NodeId) -> Option<NodeId> {
        let parent = self.dom.parent(field)?;
        self.dom.first_descendant_with_class(parent, "error-message")
    }

    pub(crate) fn field_constraint_issue(&self, field: NodeId) -> Result<Option<ConstraintIssue>> {
        if self.dom.is_effectively_disabled(field) {
            return Ok(None);
        }
        let value = self.dom.value(field)?;
        match self.dom.tag_name(field) {
            Some("textarea") => self.textarea_constraint_issue(field, &value),
            Some("input") => self.input_constraint_issue(field, &value),
            _ => Ok(None),
        }
    }

    fn textarea_constraint_issue(
        &self,
        field: NodeId,
        value: &str,
    ) -> Result<Option<ConstraintIssue>> {
        if self.dom.required(field) && !self.dom.readonly(field) && value.is_empty() {
            return Ok(Some(ConstraintIssue::ValueMissing));
        }
        if value.is_empty() {
            return Ok(None);
        }
        if let Some(minlength) = attr_usize(&self.dom, field, "minlength") {
            if value.chars().count() < minlength {
                return Ok(Some(ConstraintIssue::TooShort { minlength }));
            }
        }
        Ok(None)
    }

    fn input_constraint_issue(
        &self,
        field: NodeId,
        value: &str,
    ) -> Result<Option<ConstraintIssue>> {
        let kind = match self.dom.attr(field, "type") {
            Some(kind) => kind.to_ascii_lowercase(),
            None => "text".to_string(),
        };
        if matches!(
            kind.as_str(),
            "button" | "submit" | "reset" | "hidden" | "image"
        ) {
            return Ok(None);
        }
        if self.dom.required(field) && !self.dom.readonly(field) {
            let missing = match kind.as_str() {
                "checkbox" => !self.dom.checked(field)?,
                "radio" => !self.radio_group_checked(field)?,
                _ => value.is_empty(),
            };
            if missing {
                return Ok(Some(ConstraintIssue::ValueMissing));
            }
        }
        if value.is_empty() {
            return Ok(None);
        }
        if kind == "email" && !is_simple_email(value) {
            return Ok(Some(ConstraintIssue::TypeMismatch { input_type: kind }));
        }
        if kind == "url" && !is_simple_url(value) {
            return Ok(Some(ConstraintIssue::TypeMismatch { input_type: kind }));
        }
        if supports_length_and_pattern(&kind) {
            if let Some(minlength) = attr_usize(&self.dom, field, "minlength") {
                if value.chars().count() < minlength {
                    return Ok(Some(ConstraintIssue::TooShort { minlength }));
                }
            }
            if let Some(pattern) = self.dom.attr(field, "pattern") {
                // An unparseable pattern constrains nothing, as in browsers.
                if let Ok(regex) = Regex::new(&format!("^(?:{pattern})$")) {
                    if let Ok(false) = regex.is_match(value) {
                        return Ok(Some(ConstraintIssue::PatternMismatch));
                    }
                }
            }
        }
        Ok(None)
    }

    /// A required radio is satisfied by any checked member of its
    /// group, not just the field being validated.
    fn radio_group_checked(&self, radio: NodeId) -> Result<bool> {
        let Some(name) = self.dom.attr(radio, "name").filter(|name| !name.is_empty()) else {
            return self.dom.checked(radio);
        };
        let owner = self.form_owner(radio);
        let group = self
            .dom
            .all_element_nodes()
            .into_iter()
            .filter(|&node| is_radio_input(&self.dom, node))
            .filter(|&node| self.dom.attr(node, "name").as_deref() == Some(name.as_str()))
            .filter(|&node| self.form_owner(node) == owner);
        for node in group {
            if self.dom.checked(node)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub(crate) fn handle_contact_submit(
        &mut self,
        fields: &[NodeId],
        success: Option<NodeId>,
        event: &mut PageEvent,
    ) -> Result<()> {
        event.prevent_default();
        let form = event.current_target;
        let mut all_valid = true;
        for &field in fields {
            if !self.validate_field(field)? {
                all_valid = false;
            }
        }
        if !all_valid {
            let form_label = self.trace_label(form);
            let first_error = fields
                .iter()
                .copied()
                .find(|&field| self.dom.has_class(field, "error"));
            match first_error {
                Some(field) => {
                    let field_label = self.trace_label(field);
                    self.trace_behavior(format!(
                        "[form] submit rejected form={form_label} first_error={field_label}"
                    ));
                    self.focus_node(field)?;
                }
                None => {
                    self.trace_behavior(format!(
                        "[form] submit rejected form={form_label} first_error=none"
                    ));
                }
            }
            return Ok(());
        }
        let record = self.dom.form_data_entries(form)?;
        let form_label = self.trace_label(form);
        self.trace_behavior(format!(
            "[form] submit accepted form={form_label} fields={}",
            record.len()
        ));
        self.submissions.push(FormSubmission {
            form: form_label,
            fields: record,
        });
        self.dom.set_style_value(form, "display", "none")?;
        if let Some(success) = success {
            self.dom.remove_class(success, "hidden")?;
        }
        // A resubmission supersedes any revert still pending for this
        // form, so the notice always stays up for the full delay.
        let stale = self.clock.ids_where(|task| {
            matches!(
                task,
                TimerTask::RevertSubmitNotice { form: pending, .. } if *pending == form
            )
        });
        for id in stale {
            self.trace_behavior(format!("[form] revert canceled id={id}"));
            self.clear_timeout(id);
        }
        let id = self.schedule_timeout(
            TimerTask::RevertSubmitNotice { form, success },
            SUCCESS_REVERT_DELAY_MS,
        );
        self.trace_behavior(format!(
            "[form] revert scheduled id={id} delay_ms={SUCCESS_REVERT_DELAY_MS}"
        ));
        Ok(())
    }

    pub(crate) fn revert_submit_notice(
        &mut self,
        form: NodeId,
        success: Option<NodeId>,
    ) -> Result<()> {
        self.reset_form_node(form)?;
        self.dom.set_style_value(form, "display", "block")?;
        if let Some(success) = success {
            self.dom.add_class(success, "hidden")?;
        }
        let label = self.trace_label(form);
        self.trace_behavior(format!("[form] revert fired form={label}"));
        Ok(())
    }
}

fn attr_usize(dom: &Dom, node: NodeId, name: &str) -> Option<usize> {
    let value = dom.attr(node, name)?;
    value.trim().parse().ok()
}

fn supports_length_and_pattern(kind: &str) -> bool {
    matches!(
        kind,
        "text" | "search" | "url" | "tel" | "email" | "password"
    )
}

fn is_simple_email(value: &str) -> bool {
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    let local_ok = local
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ".!#$%&'*+/=?^_`{|}~-".contains(ch));
    if !local_ok {
        return false;
    }
    domain.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

fn is_simple_url(value: &str) -> bool {
    let Some((scheme, rest)) = value.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let scheme_ok = match chars.next() {
        Some(first) => {
            first.is_ascii_alphabetic()
                && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
        }
        None => false,
    };
    if !scheme_ok {
        return false;
    }
    match rest.strip_prefix("//") {
        Some(after) => {
            let authority = after.split(['/', '?', '#']).next().unwrap_or("");
            !authority.is_empty()
        }
        None => !rest.is_empty(),
    }
}
