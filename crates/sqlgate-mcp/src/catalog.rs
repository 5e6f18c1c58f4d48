//! The fixed tool catalog offered to agents.

use crate::protocol::{ToolAnnotations, ToolDefinition};
use serde_json::json;

pub const ASK_DATABASE: &str = "ask_database";
pub const TRAIN_VANNA: &str = "train_vanna";
pub const GET_TABLES: &str = "get_tables";
pub const GET_SCHEMA: &str = "get_schema";
pub const EXECUTE_SQL: &str = "execute_sql";

/// All tools, in the order they are listed.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: ASK_DATABASE.to_string(),
            description: Some(
                "Ask a natural language question about the database. It is converted to SQL \
                 and, unless auto_execute is false, executed."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "Natural language question about the data"
                    },
                    "auto_execute": {
                        "type": "boolean",
                        "description": "Whether to automatically execute the generated SQL",
                        "default": true
                    }
                },
                "required": ["question"]
            }),
            annotations: None,
        },
        ToolDefinition {
            name: TRAIN_VANNA.to_string(),
            description: Some(
                "Train the translator with DDL, documentation, or example queries to improve accuracy"
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "training_type": {
                        "type": "string",
                        "enum": ["ddl", "documentation", "question_sql"],
                        "description": "Type of training data"
                    },
                    "ddl": {
                        "type": "string",
                        "description": "DDL statement (CREATE TABLE, etc.)"
                    },
                    "documentation": {
                        "type": "string",
                        "description": "Documentation about tables or columns"
                    },
                    "question": {
                        "type": "string",
                        "description": "Example question"
                    },
                    "sql": {
                        "type": "string",
                        "description": "Corresponding SQL query"
                    }
                },
                "required": ["training_type"]
            }),
            annotations: None,
        },
        ToolDefinition {
            name: GET_TABLES.to_string(),
            description: Some("Get a list of all tables in the database".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
            annotations: Some(ToolAnnotations {
                read_only: Some(true),
                destructive: None,
            }),
        },
        ToolDefinition {
            name: GET_SCHEMA.to_string(),
            description: Some("Get the schema/structure of a specific table".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "table_name": {
                        "type": "string",
                        "description": "Name of the table to get schema for"
                    }
                },
                "required": ["table_name"]
            }),
            annotations: Some(ToolAnnotations {
                read_only: Some(true),
                destructive: None,
            }),
        },
        ToolDefinition {
            name: EXECUTE_SQL.to_string(),
            description: Some(
                "Directly execute a SQL query (use with caution - read-only recommended)"
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "sql": {
                        "type": "string",
                        "description": "SQL query to execute"
                    }
                },
                "required": ["sql"]
            }),
            annotations: Some(ToolAnnotations {
                read_only: Some(false),
                destructive: Some(true),
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_in_order() {
        let names: Vec<String> = tool_definitions().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec!["ask_database", "train_vanna", "get_tables", "get_schema", "execute_sql"]
        );
    }

    #[test]
    fn test_required_fields() {
        let required = |name: &str| {
            tool_definitions()
                .into_iter()
                .find(|t| t.name == name)
                .and_then(|t| t.input_schema.get("required").cloned())
        };
        assert_eq!(required(ASK_DATABASE), Some(json!(["question"])));
        assert_eq!(required(TRAIN_VANNA), Some(json!(["training_type"])));
        assert_eq!(required(GET_TABLES), None);
        assert_eq!(required(GET_SCHEMA), Some(json!(["table_name"])));
        assert_eq!(required(EXECUTE_SQL), Some(json!(["sql"])));
    }

    #[test]
    fn test_every_schema_is_an_object_schema() {
        for tool in tool_definitions() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(jsonschema::validator_for(&tool.input_schema).is_ok());
        }
    }
}
