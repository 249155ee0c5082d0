use super::*;

impl Page {
    pub(crate) fn select_all(&self, selector_text: &str) -> Result<Vec<NodeId>> {
        selector::select_all(&self.dom, selector_text)
    }

    pub(crate) fn select_one(&self, selector_text: &str) -> Result<NodeId> {
        self.select_all(selector_text)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::SelectorNotFound(selector_text.to_string()))
    }

    /// Concatenated text of the first match.
    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    /// Current value of the first match, which must be a form control.
    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.value(target)
    }

    /// Checkedness of the first match, which must be a form control.
    pub fn checked(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.dom.checked(target)
    }

    /// Whether the first match is visible: no inline `display: none`
    /// and no `hidden` class on it or any ancestor.
    pub fn visible(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.is_visible(target))
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let found = self.dom.text_content(target);
        if found == expected {
            Ok(())
        } else {
            Err(self.mismatch(target, selector, expected, found))
        }
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let found = self.dom.value(target)?;
        if found == expected {
            Ok(())
        } else {
            Err(self.mismatch(target, selector, expected, found))
        }
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let found = self.dom.checked(target)?;
        if found == expected {
            Ok(())
        } else {
            Err(self.mismatch(target, selector, expected, found))
        }
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        self.select_one(selector).map(|_| ())
    }

    pub fn assert_visible(&self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.is_visible(target) {
            Ok(())
        } else {
            Err(self.mismatch(target, selector, "visible", "hidden"))
        }
    }

    pub fn assert_hidden(&self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.is_visible(target) {
            Err(self.mismatch(target, selector, "hidden", "visible"))
        } else {
            Ok(())
        }
    }

    /// Serialized markup of the first match, for debugging.
    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.serialize_node(target))
    }

    fn mismatch(
        &self,
        node: NodeId,
        selector: &str,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Error {
        Error::AssertionFailed {
            selector: selector.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            dom_snippet: self.snippet_for(node),
        }
    }

    fn snippet_for(&self, node: NodeId) -> String {
        clip_chars(&self.dom.serialize_node(node), 200)
    }
}

fn clip_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
