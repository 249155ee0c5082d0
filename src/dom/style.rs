use super::*;

impl Dom {
    pub(crate) fn style_value(&self, node: NodeId, name: &str) -> Option<String> {
        let style = self.attr(node, "style")?;
        let name = name.to_ascii_lowercase();
        parse_style_declarations(&style)
            .into_iter()
            .find(|(declared, _)| *declared == name)
            .map(|(_, value)| value)
    }

    pub(crate) fn set_style_value(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let style = self.attr(node, "style").unwrap_or_default();
        let mut declarations = parse_style_declarations(&style);
        declarations.retain(|(declared, _)| *declared != name);
        if !value.is_empty() {
            declarations.push((name, value.to_string()));
        }
        self.set_attr(node, "style", &serialize_style_declarations(&declarations))
    }

    pub(crate) fn has_inline_display_none(&self, node: NodeId) -> bool {
        self.style_value(node, "display")
            .is_some_and(|value| value == "none")
    }
}

pub(crate) fn parse_style_declarations(style: &str) -> Vec<(String, String)> {
    split_declarations(style)
        .into_iter()
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            Some((name, value.trim().to_string()))
        })
        .collect()
}

pub(crate) fn serialize_style_declarations(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

// Declarations split on ';' only outside quotes and url(...) parentheses.
fn split_declarations(style: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut piece_start = 0;
    let mut quote: Option<char> = None;
    let mut parens = 0usize;
    for (offset, ch) in style.char_indices() {
        match (quote, ch) {
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '(') => parens += 1,
            (None, ')') => parens = parens.saturating_sub(1),
            (None, ';') if parens == 0 => {
                parts.push(style[piece_start..offset].to_string());
                piece_start = offset + 1;
            }
            (None, _) => {}
        }
    }
    let tail = &style[piece_start..];
    if !tail.trim().is_empty() {
        parts.push(tail.to_string());
    }
    parts
}
