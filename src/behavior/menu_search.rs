use unicode_normalization::UnicodeNormalization;

use super::*;

impl Page {
    pub(crate) fn wire_menu_filter(&mut self) -> Result<()> {
        let Some(search) = self.select_all("#menu-search")?.into_iter().next() else {
            return Ok(());
        };
        let items = self.select_all(".menu-item")?;
        self.listeners
            .register(search, "input", false, BehaviorAction::FilterMenu { items });
        Ok(())
    }

    /// Recomputes visibility for every captured menu item against the
    /// current search box value. An item stays visible when the folded
    /// term occurs in its data-name, title, or description.
    pub(crate) fn filter_menu_items(
        &mut self,
        items: &[NodeId],
        event: &mut PageEvent,
    ) -> Result<()> {
        let term_source = self.dom.value(event.current_target)?;
        let folded = fold_for_search(&term_source);
        let term = folded.trim();
        let total = items.len();
        let mut matched = 0usize;
        for &item in items {
            let name = self.dom.attr(item, "data-name").unwrap_or_default();
            let title = self
                .dom
                .first_descendant_by_tag(item, "h3")
                .map(|node| self.dom.text_content(node))
                .unwrap_or_default();
            let description = self
                .dom
                .first_descendant_by_tag(item, "p")
                .map(|node| self.dom.text_content(node))
                .unwrap_or_default();
            let shown = fold_for_search(&name).contains(term)
                || fold_for_search(&title).contains(term)
                || fold_for_search(&description).contains(term);
            if shown {
                matched += 1;
            }
            let display = if shown { "block" } else { "none" };
            self.dom.set_style_value(item, "display", display)?;
        }
        self.trace_behavior(format!(
            "[filter] term={term:?} matched={matched} total={total}"
        ));
        Ok(())
    }
}

fn fold_for_search(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}
