use std::collections::HashMap;
use std::fmt::Write as _;

use crate::{Error, Result};

mod classes;
mod forms;
mod queries;
mod style;

pub(crate) use forms::{
    is_checkbox_input, is_labelable_control, is_radio_input, is_reset_control, is_submit_control,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) checked: bool,
    pub(crate) disabled: bool,
    pub(crate) readonly: bool,
    pub(crate) required: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
}

/// Flat node arena. Ids are indices into `nodes` and stay valid for
/// the life of the page; nothing is ever deallocated.
#[derive(Debug, Clone)]
pub(crate) struct Dom {
    nodes: Vec<Node>,
    pub(crate) root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let document = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Document,
        };
        Dom {
            nodes: vec![document],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn allocate(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { parent, children: Vec::new(), kind });
        if let Some(parent) = parent {
            self.node_mut(parent).children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: Option<NodeId>,
        tag_name: &str,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let id_attr = attrs.get("id").cloned();
        let element = Element {
            tag_name: tag_name.to_string(),
            value: attrs.get("value").cloned().unwrap_or_default(),
            checked: attrs.contains_key("checked"),
            disabled: attrs.contains_key("disabled"),
            readonly: attrs.contains_key("readonly"),
            required: attrs.contains_key("required"),
            attrs,
        };
        let node = self.allocate(parent, NodeKind::Element(element));
        if let Some(id) = id_attr {
            self.id_index.insert(id, node);
        }
        node
    }

    pub(crate) fn create_text(&mut self, parent: Option<NodeId>, text: String) -> NodeId {
        self.allocate(parent, NodeKind::Text(text))
    }

    pub(crate) fn element(&self, node: NodeId) -> Option<&Element> {
        if let NodeKind::Element(element) = &self.node(node).kind {
            Some(element)
        } else {
            None
        }
    }

    pub(crate) fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        if let NodeKind::Element(element) = &mut self.node_mut(node).kind {
            Some(element)
        } else {
            None
        }
    }

    fn element_or_err(&self, node: NodeId, what: &str) -> Result<&Element> {
        self.element(node)
            .ok_or_else(|| Error::PageRuntime(format!("{what} target is not an element")))
    }

    fn element_mut_or_err(&mut self, node: NodeId, what: &str) -> Result<&mut Element> {
        match self.element_mut(node) {
            Some(element) => Ok(element),
            None => Err(Error::PageRuntime(format!(
                "{what} target is not an element"
            ))),
        }
    }

    pub(crate) fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|element| element.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub(crate) fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let previous_id = if name == "id" { self.attr(node, "id") } else { None };
        let element = self.element_mut_or_err(node, "setAttribute")?;
        element.attrs.insert(name.clone(), value.to_string());
        sync_mirrored_field(element, &name, Some(value));
        if name == "id" && self.is_connected(node) {
            if let Some(old) = previous_id {
                self.drop_id_mapping(node, &old);
            }
            self.id_index.insert(value.to_string(), node);
        }
        Ok(())
    }

    pub(crate) fn remove_attr(&mut self, node: NodeId, name: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let previous_id = if name == "id" { self.attr(node, "id") } else { None };
        let element = self.element_mut_or_err(node, "removeAttribute")?;
        element.attrs.remove(&name);
        sync_mirrored_field(element, &name, None);
        if let Some(old) = previous_id {
            self.drop_id_mapping(node, &old);
        }
        Ok(())
    }

    fn drop_id_mapping(&mut self, node: NodeId, id: &str) {
        if self.id_index.get(id) == Some(&node) {
            self.id_index.remove(id);
        }
    }

    pub(crate) fn value(&self, node: NodeId) -> Result<String> {
        Ok(self.element_or_err(node, "value")?.value.clone())
    }

    pub(crate) fn set_value(&mut self, node: NodeId, text: &str) -> Result<()> {
        self.element_mut_or_err(node, "value")?.value = text.to_string();
        Ok(())
    }

    pub(crate) fn checked(&self, node: NodeId) -> Result<bool> {
        Ok(self.element_or_err(node, "checked")?.checked)
    }

    pub(crate) fn set_checked(&mut self, node: NodeId, on: bool) -> Result<()> {
        self.element_mut_or_err(node, "checked")?.checked = on;
        Ok(())
    }

    pub(crate) fn disabled(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|element| element.disabled)
    }

    pub(crate) fn readonly(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|element| element.readonly)
    }

    pub(crate) fn required(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|element| element.required)
    }

    pub(crate) fn text_content(&self, node: NodeId) -> String {
        match &self.node(node).kind {
            NodeKind::Text(text) => text.clone(),
            _ => self
                .node(node)
                .children
                .iter()
                .map(|&child| self.text_content(child))
                .collect(),
        }
    }

    pub(crate) fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()> {
        self.element_or_err(node, "textContent")?;
        self.node_mut(node).children.clear();
        if !text.is_empty() {
            self.create_text(Some(node), text.to_string());
        }
        Ok(())
    }

    pub(crate) fn serialize_node(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.dump_into(node, &mut out);
        out
    }

    fn dump_into(&self, node: NodeId, out: &mut String) {
        match &self.node(node).kind {
            NodeKind::Document => {
                for &child in &self.node(node).children {
                    self.dump_into(child, out);
                }
            }
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(element) => {
                let _ = write!(out, "<{}", element.tag_name);
                let mut attrs: Vec<_> = element.attrs.iter().collect();
                attrs.sort();
                for (name, value) in attrs {
                    let _ = write!(out, " {name}=\"{value}\"");
                }
                out.push('>');
                for &child in &self.node(node).children {
                    self.dump_into(child, out);
                }
                let _ = write!(out, "</{}>", element.tag_name);
            }
        }
    }

    /// Seeds control values that live in markup rather than in a value
    /// attribute, currently the textarea body text.
    pub(crate) fn initialize_form_control_values(&mut self) {
        let textareas: Vec<NodeId> = self
            .all_element_nodes()
            .into_iter()
            .filter(|&node| self.tag_name(node) == Some("textarea"))
            .collect();
        for node in textareas {
            let body = self.text_content(node);
            if let Some(element) = self.element_mut(node) {
                element.value = body;
            }
        }
    }
}

/// Attribute writes mirror into the live control state; removals reset
/// the boolean flags. The live value only follows the attribute when
/// one is written, never when it is removed.
fn sync_mirrored_field(element: &mut Element, name: &str, new_value: Option<&str>) {
    match name {
        "value" => {
            if let Some(text) = new_value {
                element.value = text.to_string();
            }
        }
        "checked" => element.checked = new_value.is_some(),
        "disabled" => element.disabled = new_value.is_some(),
        "readonly" => element.readonly = new_value.is_some(),
        "required" => element.required = new_value.is_some(),
        _ => {}
    }
}
