use std::collections::HashMap;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) default_value: String,
    pub(crate) disabled: bool,
    pub(crate) style: HashMap<String, String>,
    // Modeled layout: real geometry does not exist in this runtime, so the
    // page API lets tests declare the metrics the behaviors read.
    pub(crate) offset_top: i64,
    pub(crate) scroll_height: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let value = attrs.get("value").cloned().unwrap_or_default();
        let disabled = attrs.contains_key("disabled");
        let element = Element {
            tag_name,
            default_value: value.clone(),
            value,
            disabled,
            attrs,
            style: HashMap::new(),
            offset_top: 0,
            scroll_height: 0,
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            self.id_index.insert(id_attr, id);
        }
        id
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn find_ancestor_by_tag(&self, node_id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if self
                .tag_name(current)
                .map(|t| t.eq_ignore_ascii_case(tag))
                .unwrap_or(false)
            {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    pub(crate) fn all_element_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements(self.root, &mut out);
        out
    }

    pub(crate) fn descendant_elements(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements(scope, &mut out);
        out
    }

    fn collect_elements(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[node_id.0].children {
            if self.element(*child).is_some() {
                out.push(*child);
            }
            self.collect_elements(*child, out);
        }
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub(crate) fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("attribute target is not an element".into()))?;
        element.attrs.insert(name.to_string(), value.to_string());
        if name == "id" {
            self.id_index.insert(value.to_string(), node_id);
        }
        Ok(())
    }

    pub(crate) fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id)
            .map(|element| element.disabled)
            .unwrap_or(false)
    }

    pub(crate) fn value(&self, node_id: NodeId) -> Result<String> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Runtime("value target is not an element".into()))?;
        Ok(element.value.clone())
    }

    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("value target is not an element".into()))?;
        element.value = value.to_string();
        Ok(())
    }

    pub(crate) fn reset_control(&mut self, node_id: NodeId) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("reset target is not an element".into()))?;
        element.value = element.default_value.clone();
        Ok(())
    }

    // Textarea values come from content, not a value attribute; capture them
    // (and their defaults) once the whole tree is parsed.
    pub(crate) fn initialize_form_control_values(&mut self) {
        for node_id in self.all_element_nodes() {
            let is_textarea = self
                .tag_name(node_id)
                .map(|t| t.eq_ignore_ascii_case("textarea"))
                .unwrap_or(false);
            if !is_textarea {
                continue;
            }
            let text = self.text_content(node_id);
            if let Some(element) = self.element_mut(node_id) {
                element.value = text.clone();
                element.default_value = text;
            }
        }
    }

    pub(crate) fn class_contains(&self, node_id: NodeId, class_name: &str) -> Result<bool> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Runtime("class target is not an element".into()))?;
        Ok(has_class(element, class_name))
    }

    pub(crate) fn class_add(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("class target is not an element".into()))?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        if !classes.iter().any(|name| name == class_name) {
            classes.push(class_name.to_string());
        }
        set_class_attr(element, &classes);
        Ok(())
    }

    pub(crate) fn class_remove(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("class target is not an element".into()))?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        classes.retain(|name| name != class_name);
        set_class_attr(element, &classes);
        Ok(())
    }

    pub(crate) fn class_toggle(&mut self, node_id: NodeId, class_name: &str) -> Result<bool> {
        let has = self.class_contains(node_id, class_name)?;
        if has {
            self.class_remove(node_id, class_name)?;
            Ok(false)
        } else {
            self.class_add(node_id, class_name)?;
            Ok(true)
        }
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document | NodeType::Element(_) => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
        }
    }

    pub(crate) fn set_text_content(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        if self.element(node_id).is_none() {
            return Err(Error::Runtime("text content target is not an element".into()));
        }
        self.nodes[node_id.0].children.clear();
        if !value.is_empty() {
            self.create_text(node_id, value.to_string());
        }
        Ok(())
    }

    pub(crate) fn style_property(&self, node_id: NodeId, name: &str) -> Result<Option<String>> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Runtime("style target is not an element".into()))?;
        Ok(element.style.get(name).cloned())
    }

    pub(crate) fn set_style_property(
        &mut self,
        node_id: NodeId,
        name: &str,
        value: &str,
    ) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("style target is not an element".into()))?;
        element.style.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub(crate) fn clear_style_property(&mut self, node_id: NodeId, name: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("style target is not an element".into()))?;
        element.style.remove(name);
        Ok(())
    }

    pub(crate) fn offset_top(&self, node_id: NodeId) -> Result<i64> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Runtime("offset target is not an element".into()))?;
        Ok(element.offset_top)
    }

    pub(crate) fn set_offset_top(&mut self, node_id: NodeId, value: i64) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("offset target is not an element".into()))?;
        element.offset_top = value;
        Ok(())
    }

    pub(crate) fn scroll_height(&self, node_id: NodeId) -> Result<i64> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Runtime("scroll metrics target is not an element".into()))?;
        Ok(element.scroll_height)
    }

    pub(crate) fn set_scroll_height(&mut self, node_id: NodeId, value: i64) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Runtime("scroll metrics target is not an element".into()))?;
        element.scroll_height = value;
        Ok(())
    }

    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Text(text) => text.clone(),
            NodeType::Document => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out
            }
            NodeType::Element(element) => {
                let mut out = format!("<{}", element.tag_name);
                let mut attr_names = element.attrs.keys().collect::<Vec<_>>();
                attr_names.sort();
                for name in attr_names {
                    if let Some(value) = element.attrs.get(name) {
                        out.push_str(&format!(" {name}='{value}'"));
                    }
                }
                if !element.style.is_empty() {
                    let mut props = element.style.iter().collect::<Vec<_>>();
                    props.sort();
                    let rendered = props
                        .iter()
                        .map(|(name, value)| format!("{name}: {value}"))
                        .collect::<Vec<_>>()
                        .join("; ");
                    out.push_str(&format!(" style='{rendered}'"));
                }
                out.push('>');
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out.push_str(&format!("</{}>", element.tag_name));
                out
            }
        }
    }
}

pub(crate) fn has_class(element: &Element, class_name: &str) -> bool {
    class_tokens(element.attrs.get("class").map(String::as_str))
        .iter()
        .any(|name| name == class_name)
}

pub(crate) fn class_tokens(attr: Option<&str>) -> Vec<String> {
    attr.map(|value| {
        value
            .split_ascii_whitespace()
            .map(str::to_string)
            .collect::<Vec<_>>()
    })
    .unwrap_or_default()
}

fn set_class_attr(element: &mut Element, classes: &[String]) {
    if classes.is_empty() {
        element.attrs.remove("class");
    } else {
        element.attrs.insert("class".into(), classes.join(" "));
    }
}

pub(crate) fn is_submit_control(dom: &Dom, node_id: NodeId) -> bool {
    let Some(element) = dom.element(node_id) else {
        return false;
    };

    if element.tag_name.eq_ignore_ascii_case("button") {
        return element
            .attrs
            .get("type")
            .map(|kind| kind.eq_ignore_ascii_case("submit"))
            .unwrap_or(true);
    }

    if element.tag_name.eq_ignore_ascii_case("input") {
        return element
            .attrs
            .get("type")
            .map(|kind| kind.eq_ignore_ascii_case("submit") || kind.eq_ignore_ascii_case("image"))
            .unwrap_or(false);
    }

    false
}

pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for (count, ch) in value.chars().enumerate() {
        if count >= max_chars {
            out.push('…');
            break;
        }
        out.push(ch);
    }
    out
}
