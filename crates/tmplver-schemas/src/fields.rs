//! Template input field descriptors
//!
//! Copyright (c) 2025 Tmplver Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported input kinds for a template field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Date,
    Boolean,
    Select,
    Address,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Boolean => "boolean",
            FieldKind::Select => "select",
            FieldKind::Address => "address",
        };
        f.write_str(name)
    }
}

/// One input field of a template snapshot, matched across versions by `id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: String,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Choices offered by a `select` field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FieldDescriptor {
    /// Create a field with no presentation attributes
    pub fn new(id: impl Into<String>, kind: FieldKind, required: bool) -> Self {
        Self {
            id: id.into(),
            kind,
            required,
            label: None,
            placeholder: None,
            tooltip: None,
            options: Vec::new(),
        }
    }

    pub fn required(id: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(id, kind, true)
    }

    pub fn optional(id: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(id, kind, false)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_serialization_shape() {
        let field = FieldDescriptor::required("q1", FieldKind::Text).with_label("Company Name");
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(
            value,
            json!({"id": "q1", "kind": "text", "required": true, "label": "Company Name"})
        );
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result = serde_json::from_value::<FieldDescriptor>(json!({
            "id": "q1",
            "kind": "txet",
            "required": true
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_helpers() {
        let field = FieldDescriptor::optional("state", FieldKind::Select)
            .with_options(["CA", "NY"])
            .with_placeholder("Pick one")
            .with_tooltip("Governing state");
        assert!(!field.required);
        assert_eq!(field.options, vec!["CA".to_string(), "NY".to_string()]);
        assert_eq!(field.placeholder.as_deref(), Some("Pick one"));
        assert_eq!(FieldKind::Textarea.to_string(), "textarea");
    }
}
