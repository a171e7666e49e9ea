//! Field attributes and input-type classification.
//!
//! A field is the data payload of one tree node: an insertion-ordered map of
//! string attributes. Attribute order is significant: serializing a document
//! must reproduce the attribute order it was parsed with.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Attribute key holding the field's input type tag.
pub const INPUT_TYPE: &str = "inputType";
/// Attribute key holding the field's display name.
pub const ELEMENT_NAME: &str = "elementName";
/// Attribute key holding the field's current value.
pub const VALUE: &str = "value";
/// Attribute key holding the field's default value.
pub const DEFAULT: &str = "default";
/// Attribute key holding element text content for custom elements.
pub const TEXT_NODE_VALUE: &str = "textNodeValue";
/// Attribute key remembering whether a field's child steps are collapsed.
pub const SUBSTEPS_COLLAPSED: &str = "substepsCollapsed";

/// Semantic kind of a field, derived from its `inputType` attribute.
///
/// Unrecognized tags classify as `Custom`: the document came from foreign
/// markup and the field round-trips through its `elementName` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputType {
    ProtocolTitle,
    FixedStep,
    TextField,
    MemoEntry,
    NumberField,
    DropDownMenu,
    CheckBoxField,
    DateField,
    TableField,
    Custom,
}

impl InputType {
    /// Tag name used in serialized documents. `Custom` has no tag of its own.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            InputType::ProtocolTitle => Some("ProtocolTitle"),
            InputType::FixedStep => Some("FixedStep"),
            InputType::TextField => Some("TextField"),
            InputType::MemoEntry => Some("MemoEntry"),
            InputType::NumberField => Some("NumberField"),
            InputType::DropDownMenu => Some("DropDownMenu"),
            InputType::CheckBoxField => Some("CheckBoxField"),
            InputType::DateField => Some("DateField"),
            InputType::TableField => Some("TableField"),
            InputType::Custom => None,
        }
    }

    /// Parse a serialized tag. Unknown tags are `Custom`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ProtocolTitle" => InputType::ProtocolTitle,
            "FixedStep" => InputType::FixedStep,
            "TextField" => InputType::TextField,
            "MemoEntry" => InputType::MemoEntry,
            "NumberField" => InputType::NumberField,
            "DropDownMenu" => InputType::DropDownMenu,
            "CheckBoxField" => InputType::CheckBoxField,
            "DateField" => InputType::DateField,
            "TableField" => InputType::TableField,
            _ => InputType::Custom,
        }
    }

    /// Map a version-1 `inputType` attribute value ("Fixed Step") to the
    /// current tag ("FixedStep"). Returns `None` for values that are not
    /// legacy names.
    pub fn from_legacy_name(name: &str) -> Option<Self> {
        match name {
            "Protocol Title" => Some(InputType::ProtocolTitle),
            "Fixed Step" => Some(InputType::FixedStep),
            "Text Field" => Some(InputType::TextField),
            "Memo Entry" => Some(InputType::MemoEntry),
            "Number Field" => Some(InputType::NumberField),
            "Drop-down Menu" => Some(InputType::DropDownMenu),
            "Check-Box Field" => Some(InputType::CheckBoxField),
            "Date Field" => Some(InputType::DateField),
            "Table Field" => Some(InputType::TableField),
            _ => None,
        }
    }
}

/// Ordered attribute map for one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    attributes: IndexMap<String, String>,
}

impl Field {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank field of the given type, the shape produced by "add new field".
    pub fn blank(input_type: InputType) -> Self {
        let mut field = Field::new();
        if let Some(tag) = input_type.tag() {
            field.set(INPUT_TYPE, Some(tag));
        }
        field
    }

    pub fn from_attributes(attributes: IndexMap<String, String>) -> Self {
        Self { attributes }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Set or remove one attribute, returning the prior value.
    ///
    /// Setting an existing key keeps its position in the map; removal shifts
    /// later keys up so order stays contiguous.
    pub fn set(&mut self, key: &str, value: Option<&str>) -> Option<String> {
        match value {
            Some(value) => self.attributes.insert(key.to_string(), value.to_string()),
            None => self.attributes.shift_remove(key),
        }
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn input_type(&self) -> InputType {
        match self.get(INPUT_TYPE) {
            Some(tag) => InputType::from_tag(tag),
            None => InputType::Custom,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.input_type() == InputType::Custom
    }

    /// Display name (the `elementName` attribute).
    pub fn name(&self) -> Option<&str> {
        self.get(ELEMENT_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_returns_prior_value() {
        let mut field = Field::new();
        assert_eq!(field.set(VALUE, Some("5")), None);
        assert_eq!(field.set(VALUE, Some("6")), Some("5".to_string()));
        assert_eq!(field.set(VALUE, None), Some("6".to_string()));
        assert_eq!(field.get(VALUE), None);
    }

    #[test]
    fn test_attribute_order_is_insertion_order() {
        let mut field = Field::new();
        field.set("b", Some("1"));
        field.set("a", Some("2"));
        field.set("c", Some("3"));
        field.set("a", Some("4")); // update keeps position

        let keys: Vec<&str> = field.attributes().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_unknown_tag_classifies_as_custom() {
        let mut field = Field::new();
        field.set(INPUT_TYPE, Some("someForeignElement"));
        assert_eq!(field.input_type(), InputType::Custom);
        assert!(field.is_custom());
    }

    #[test]
    fn test_legacy_names_map_to_current_tags() {
        assert_eq!(
            InputType::from_legacy_name("Fixed Step"),
            Some(InputType::FixedStep)
        );
        assert_eq!(InputType::from_legacy_name("FixedStep"), None);
        assert_eq!(InputType::FixedStep.tag(), Some("FixedStep"));
    }
}
