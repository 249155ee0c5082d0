use super::*;

impl Page {
    pub(crate) fn wire_navigation_scroller(&mut self) -> Result<()> {
        for link in self.select_all("nav a[href^='#']")? {
            self.listeners
                .register(link, "click", false, BehaviorAction::ScrollNavLink);
        }
        Ok(())
    }

    /// In-page nav links suppress navigation and record a smooth scroll
    /// to the addressed section. A dangling fragment scrolls nowhere.
    pub(crate) fn scroll_nav_link(&mut self, event: &mut PageEvent) -> Result<()> {
        event.prevent_default();
        let link = event.current_target;
        let href = self.dom.attr(link, "href").unwrap_or_default();
        let fragment = href.strip_prefix('#').unwrap_or_default();
        if fragment.is_empty() {
            self.trace_behavior(format!("[nav] scroll skipped href={href}"));
            return Ok(());
        }
        if self.dom.by_id(fragment).is_some() {
            self.scrolls.push(ScrollRecord {
                target: format!("#{fragment}"),
                behavior: "smooth".to_string(),
                block: "start".to_string(),
            });
            self.trace_behavior(format!(
                "[nav] scroll target=#{fragment} behavior=smooth block=start"
            ));
        } else {
            self.trace_behavior(format!("[nav] scroll target=#{fragment} missing"));
        }
        Ok(())
    }
}
