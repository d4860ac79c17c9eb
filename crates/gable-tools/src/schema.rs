//! Builder for tool JSON schemas.

use gable_core::tools::{ToolDefinition, ToolParameterSchema};
use serde_json::{Map, Value};

/// Fluent builder for a tool's definition.
pub struct ToolSchemaBuilder {
    name: String,
    description: String,
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl ToolSchemaBuilder {
    /// Start a schema for `name`.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            properties: Map::new(),
            required: Vec::new(),
        }
    }

    /// Add an optional property.
    pub fn property(mut self, name: &str, schema: Value) -> Self {
        let _ = self.properties.insert(name.to_owned(), schema);
        self
    }

    /// Add a required property.
    pub fn required_property(mut self, name: &str, schema: Value) -> Self {
        self.required.push(name.to_owned());
        self.property(name, schema)
    }

    /// Finish the definition.
    pub fn build(self) -> ToolDefinition {
        ToolDefinition {
            name: self.name,
            description: self.description,
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: Some(self.properties),
                required: if self.required.is_empty() {
                    None
                } else {
                    Some(self.required)
                },
            },
        }
    }
}
