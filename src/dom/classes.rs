use super::*;

impl Dom {
    pub(crate) fn class_tokens(&self, node: NodeId) -> Vec<String> {
        self.attr(node, "class")
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub(crate) fn set_class_tokens(&mut self, node: NodeId, tokens: &[String]) -> Result<()> {
        if tokens.is_empty() {
            self.remove_attr(node, "class")
        } else {
            self.set_attr(node, "class", &tokens.join(" "))
        }
    }

    pub(crate) fn has_class(&self, node: NodeId, class_name: &str) -> bool {
        self.attr(node, "class")
            .is_some_and(|value| value.split_whitespace().any(|token| token == class_name))
    }

    pub(crate) fn add_class(&mut self, node: NodeId, class_name: &str) -> Result<()> {
        let mut tokens = self.class_tokens(node);
        if tokens.iter().any(|token| token == class_name) {
            return Ok(());
        }
        tokens.push(class_name.to_string());
        self.set_class_tokens(node, &tokens)
    }

    pub(crate) fn remove_class(&mut self, node: NodeId, class_name: &str) -> Result<()> {
        let tokens = self.class_tokens(node);
        let remaining = tokens
            .into_iter()
            .filter(|token| token != class_name)
            .collect::<Vec<_>>();
        self.set_class_tokens(node, &remaining)
    }
}
