//! Declarative input schemas
//!
//! Each tool describes its input as a static list of properties. The list is
//! rendered to the JSON-schema object shape model gateways expect:
//! `{"type": "object", "properties": {name: {"type", "description"}}}`.

use serde_json::{json, Map, Value};

/// JSON type of a single input property
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyType {
    String,
    Boolean,
}

impl PropertyType {
    fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }
}

/// One named input property
#[derive(Clone, Copy, Debug)]
pub struct Property {
    pub name: &'static str,
    pub kind: PropertyType,
    pub description: &'static str,
}

impl Property {
    pub const fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: PropertyType::String,
            description,
        }
    }

    pub const fn boolean(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: PropertyType::Boolean,
            description,
        }
    }
}

/// Hand-written schema for a tool's input object
#[derive(Clone, Copy, Debug)]
pub struct ToolSchema {
    properties: &'static [Property],
}

impl ToolSchema {
    pub const fn object(properties: &'static [Property]) -> Self {
        Self { properties }
    }

    #[must_use]
    pub fn properties(&self) -> &'static [Property] {
        self.properties
    }

    /// Render as a JSON-schema object
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        for prop in self.properties {
            properties.insert(
                prop.name.to_string(),
                json!({
                    "type": prop.kind.as_str(),
                    "description": prop.description,
                }),
            );
        }
        json!({
            "type": "object",
            "properties": properties,
        })
    }
}
