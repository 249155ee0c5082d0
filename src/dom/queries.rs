use super::*;

impl Dom {
    pub(crate) fn is_element(&self, node: NodeId) -> bool {
        matches!(self.node(node).kind, NodeKind::Element(_))
    }

    pub(crate) fn all_element_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_element_nodes(self.root, &mut out);
        out
    }

    pub(crate) fn element_descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &child in &self.node(node).children {
            self.collect_element_nodes(child, &mut out);
        }
        out
    }

    fn collect_element_nodes(&self, node: NodeId, out: &mut Vec<NodeId>) {
        if self.is_element(node) {
            out.push(node);
        }
        for &child in &self.node(node).children {
            self.collect_element_nodes(child, out);
        }
    }

    pub(crate) fn find_ancestor_by_tag(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = self.parent(node);
        while let Some(ancestor) = current {
            if self.tag_name(ancestor) == Some(tag) {
                return Some(ancestor);
            }
            current = self.parent(ancestor);
        }
        None
    }

    pub(crate) fn first_descendant_by_tag(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        self.element_descendants(node)
            .into_iter()
            .find(|&child| self.tag_name(child) == Some(tag))
    }

    pub(crate) fn first_descendant_with_class(
        &self,
        node: NodeId,
        class_name: &str,
    ) -> Option<NodeId> {
        self.element_descendants(node)
            .into_iter()
            .find(|&child| self.has_class(child, class_name))
    }

    pub(crate) fn is_effectively_disabled(&self, node: NodeId) -> bool {
        if self.disabled(node) {
            return true;
        }
        let mut current = self.parent(node);
        while let Some(ancestor) = current {
            if self.tag_name(ancestor) == Some("fieldset") && self.disabled(ancestor) {
                return true;
            }
            current = self.parent(ancestor);
        }
        false
    }

    pub(crate) fn is_connected(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// A node is visible unless it or an ancestor carries an inline
    /// `display: none` or the `hidden` class.
    pub(crate) fn is_visible(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.is_element(candidate)
                && (self.has_inline_display_none(candidate) || self.has_class(candidate, "hidden"))
            {
                return false;
            }
            current = self.parent(candidate);
        }
        true
    }
}
