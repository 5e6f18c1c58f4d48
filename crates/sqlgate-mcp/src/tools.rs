//! Tool registry for MCP tools.
//!
//! Stores tool definitions in listing order together with a compiled
//! validator for each input schema.

use crate::catalog;
use crate::error::McpError;
use crate::protocol::ToolDefinition;
use serde_json::Value;

struct RegisteredTool {
    definition: ToolDefinition,
    validator: jsonschema::Validator,
}

/// Registry of available MCP tools.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry holding the gateway's tool catalog.
    pub fn with_catalog() -> Result<Self, McpError> {
        let mut registry = Self::new();
        for tool in catalog::tool_definitions() {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: ToolDefinition) -> Result<(), McpError> {
        let validator =
            jsonschema::validator_for(&tool.input_schema).map_err(|e| McpError::InvalidSchema {
                tool: tool.name.clone(),
                reason: e.to_string(),
            })?;

        let entry = RegisteredTool {
            definition: tool,
            validator,
        };
        match self
            .tools
            .iter_mut()
            .find(|t| t.definition.name == entry.definition.name)
        {
            Some(existing) => *existing = entry,
            None => self.tools.push(entry),
        }
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools
            .iter()
            .find(|t| t.definition.name == name)
            .map(|t| &t.definition)
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// List all tools in registration order.
    pub fn list(&self) -> Vec<&ToolDefinition> {
        self.tools.iter().map(|t| &t.definition).collect()
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.definition.name.as_str()).collect()
    }

    /// Validate `arguments` against the tool's input schema.
    pub fn validate(&self, name: &str, arguments: &Value) -> Result<(), McpError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.definition.name == name)
            .ok_or_else(|| McpError::ToolNotFound {
                name: name.to_string(),
            })?;

        let messages: Vec<String> = tool
            .validator
            .iter_errors(arguments)
            .take(10)
            .map(|error| {
                let path = error.instance_path().to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{}: {}", path, error)
                }
            })
            .collect();

        if messages.is_empty() {
            Ok(())
        } else {
            Err(McpError::InvalidArguments {
                tool: name.to_string(),
                reason: messages.join("; "),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_tool(name: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            description: Some(format!("Test tool: {}", name)),
            input_schema: json!({"type": "object"}),
            annotations: None,
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ToolRegistry::new();
        registry.register(create_test_tool("test")).unwrap();

        assert!(registry.get("test").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ToolRegistry::new();
        registry.register(create_test_tool("tool1")).unwrap();
        registry.register(create_test_tool("tool2")).unwrap();
        registry.register(create_test_tool("tool1")).unwrap();

        assert_eq!(registry.names(), vec!["tool1", "tool2"]);
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let mut registry = ToolRegistry::new();
        let mut tool = create_test_tool("broken");
        tool.input_schema = json!({"type": 12});

        let err = registry.register(tool).unwrap_err();
        assert!(matches!(err, McpError::InvalidSchema { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_catalog_validation() {
        let registry = ToolRegistry::with_catalog().unwrap();
        assert_eq!(registry.len(), 5);

        assert!(registry
            .validate("ask_database", &json!({"question": "how many rows"}))
            .is_ok());

        let err = registry.validate("ask_database", &json!({})).unwrap_err();
        assert!(err.to_string().contains("question"));

        let err = registry
            .validate("ask_database", &json!({"question": "q", "auto_execute": "yes"}))
            .unwrap_err();
        assert!(err.to_string().contains("/auto_execute"));

        let err = registry
            .validate("train_vanna", &json!({"training_type": "embedding"}))
            .unwrap_err();
        assert!(matches!(err, McpError::InvalidArguments { .. }));
    }

    #[test]
    fn test_validate_unknown_tool() {
        let registry = ToolRegistry::with_catalog().unwrap();
        let err = registry.validate("drop_database", &json!({})).unwrap_err();
        assert!(matches!(err, McpError::ToolNotFound { .. }));
    }
}
