//! Document boundary: ordered attribute maps in, ordered attribute maps out.
//!
//! The engine does not parse markup. An external parser hands over one
//! [`ElementData`] per source element (root first, children in document
//! order) and receives the same shape back for re-emission. Building and
//! serializing follow the protocol-file conventions:
//!
//! - the element tag doubles as the input type for current-version files;
//!   version-1 files carried a legacy `inputType` attribute instead, which is
//!   normalized on load ("Fixed Step" becomes "FixedStep")
//! - a missing `elementName` falls back to the tag name
//! - element text content is kept in the `textNodeValue` attribute
//! - on output the `inputType` attribute is never emitted (the tag carries
//!   it), custom elements serialize under their `elementName` and drop the
//!   bookkeeping attributes, and empty values are omitted

use crate::arena::{Arena, NodeId};
use crate::field::{
    Field, InputType, ELEMENT_NAME, INPUT_TYPE, SUBSTEPS_COLLAPSED, TEXT_NODE_VALUE,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tag name of last resort for elements with no usable name.
pub const ELEMENT: &str = "element";

/// One parsed source element: tag name, attributes in document order,
/// optional text content, children in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementData {
    pub name: String,
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<ElementData>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: ElementData) -> Self {
        self.children.push(child);
        self
    }
}

/// Build a tree from a parsed document, returning the root node.
pub fn build_tree(arena: &mut Arena, element: &ElementData) -> NodeId {
    let root = arena.alloc(field_from_element(element));
    build_children(arena, root, element);
    root
}

fn build_children(arena: &mut Arena, parent: NodeId, element: &ElementData) {
    for child in &element.children {
        let node = arena.alloc(field_from_element(child));
        arena.push_child(parent, node);
        arena.set_parent(node, Some(parent));
        build_children(arena, node, child);
    }
}

fn field_from_element(element: &ElementData) -> Field {
    let mut field = Field::from_attributes(element.attributes.clone());

    match field.get(INPUT_TYPE) {
        // Version-1 file: normalize the legacy attribute value. Values that
        // are not legacy names are kept as-is and classify as custom.
        Some(legacy) => {
            if let Some(input_type) = InputType::from_legacy_name(legacy) {
                // tag() is always Some for non-custom types
                field.set(INPUT_TYPE, input_type.tag());
            }
        }
        // Current file: the tag name is the input type. Unrecognized tags
        // classify as custom when the field is read.
        None => {
            field.set(INPUT_TYPE, Some(&element.name));
        }
    }

    if field.get(ELEMENT_NAME).is_none() {
        field.set(ELEMENT_NAME, Some(&element.name));
    }

    if let Some(text) = &element.text {
        if !text.trim().is_empty() {
            field.set(TEXT_NODE_VALUE, Some(text));
        }
    }

    field
}

/// Serialize the subtree rooted at `node` back to the boundary shape.
pub fn serialize_tree(arena: &Arena, node: NodeId) -> ElementData {
    let field = arena.field(node);
    let custom = field.is_custom();

    let name = if custom {
        field.name().unwrap_or(ELEMENT).to_string()
    } else {
        field
            .input_type()
            .tag()
            .unwrap_or(ELEMENT)
            .to_string()
    };

    let mut element = ElementData::new(name);

    for (key, value) in field.attributes() {
        // The tag carries the input type; never emit it as an attribute.
        if key == INPUT_TYPE {
            continue;
        }
        // Custom elements round-trip foreign markup: keep bookkeeping
        // attributes out of it.
        if custom
            && (key == ELEMENT_NAME || key == SUBSTEPS_COLLAPSED || key == TEXT_NODE_VALUE)
        {
            continue;
        }
        if value.is_empty() {
            continue;
        }
        element.attributes.insert(key.clone(), value.clone());
    }

    if custom {
        element.text = field.get(TEXT_NODE_VALUE).map(String::from);
    }

    for &child in arena.children(node) {
        element.children.push(serialize_tree(arena, child));
    }

    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::VALUE;

    #[test]
    fn test_build_assigns_tag_as_input_type_and_name() {
        let mut arena = Arena::new();
        let element = ElementData::new("FixedStep").with_child(ElementData::new("TextField"));
        let root = build_tree(&mut arena, &element);

        assert_eq!(arena.field(root).input_type(), InputType::FixedStep);
        assert_eq!(arena.field(root).name(), Some("FixedStep"));

        let child = arena.child_at(root, 0).unwrap();
        assert_eq!(arena.parent(child), Some(root));
        assert_eq!(arena.field(child).input_type(), InputType::TextField);
    }

    #[test]
    fn test_build_normalizes_legacy_input_type() {
        let mut arena = Arena::new();
        let element = ElementData::new("step").with_attribute(INPUT_TYPE, "Fixed Step");
        let root = build_tree(&mut arena, &element);

        assert_eq!(arena.field(root).get(INPUT_TYPE), Some("FixedStep"));
        assert_eq!(arena.field(root).input_type(), InputType::FixedStep);
    }

    #[test]
    fn test_round_trip_preserves_attribute_order_and_drops_empty_values() {
        let mut arena = Arena::new();
        let element = ElementData::new("FixedStep")
            .with_attribute(ELEMENT_NAME, "Wash")
            .with_attribute("zeta", "1")
            .with_attribute("alpha", "2")
            .with_attribute(VALUE, "");
        let root = build_tree(&mut arena, &element);

        let out = serialize_tree(&arena, root);
        assert_eq!(out.name, "FixedStep");
        let keys: Vec<&str> = out.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec![ELEMENT_NAME, "zeta", "alpha"]);
    }

    #[test]
    fn test_custom_element_round_trips_under_element_name_with_text() {
        let mut arena = Arena::new();
        let element = ElementData {
            name: "foreignTag".to_string(),
            attributes: IndexMap::from([("colour".to_string(), "red".to_string())]),
            text: Some("free text".to_string()),
            children: vec![],
        };
        let root = build_tree(&mut arena, &element);
        assert!(arena.field(root).is_custom());

        let out = serialize_tree(&arena, root);
        assert_eq!(out.name, "foreignTag");
        assert_eq!(out.text.as_deref(), Some("free text"));
        assert!(!out.attributes.contains_key(INPUT_TYPE));
        assert!(!out.attributes.contains_key(ELEMENT_NAME));
        assert_eq!(out.attributes.get("colour").map(String::as_str), Some("red"));
    }

    #[test]
    fn test_element_data_serde_round_trip() {
        let element = ElementData::new("FixedStep")
            .with_attribute(ELEMENT_NAME, "Incubate")
            .with_child(ElementData::new("NumberField").with_attribute(VALUE, "37"));

        let json = serde_json::to_string(&element).unwrap();
        let back: ElementData = serde_json::from_str(&json).unwrap();
        assert_eq!(element, back);
    }
}
