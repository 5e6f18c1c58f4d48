//! Typed operations decoded from tool calls, and their results.

use crate::catalog::{ASK_DATABASE, EXECUTE_SQL, GET_SCHEMA, GET_TABLES, TRAIN_VANNA};
use crate::error::McpError;
use crate::protocol::CallToolResponse;
use serde_json::{Map, Value};
use sqlgate_translate::TrainingExample;

/// One unit of work requested by an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Ask { question: String, auto_execute: bool },
    Train(TrainingExample),
    ListTables,
    DescribeSchema { table_name: String },
    Execute { sql: String },
}

impl Operation {
    /// Decode a tool call whose arguments already passed schema validation.
    ///
    /// Also enforces what the schema cannot: the field named by
    /// `training_type` must be present.
    pub fn from_tool_call(name: &str, arguments: &Value) -> Result<Self, McpError> {
        let empty = Map::new();
        let args = arguments.as_object().unwrap_or(&empty);
        let invalid = |reason: String| McpError::InvalidArguments {
            tool: name.to_string(),
            reason,
        };
        let required = |field: &str| -> Result<String, McpError> {
            args.get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| invalid(format!("'{}' is required", field)))
        };

        match name {
            ASK_DATABASE => Ok(Operation::Ask {
                question: required("question")?,
                auto_execute: args
                    .get("auto_execute")
                    .and_then(Value::as_bool)
                    .unwrap_or(true),
            }),
            TRAIN_VANNA => {
                let training_type = required("training_type")?;
                let needs = |field: &str| {
                    required(field).map_err(|_| {
                        invalid(format!(
                            "'{}' is required when training_type is '{}'",
                            field, training_type
                        ))
                    })
                };
                let example = match training_type.as_str() {
                    "ddl" => TrainingExample::Ddl { ddl: needs("ddl")? },
                    "documentation" => TrainingExample::Documentation {
                        documentation: needs("documentation")?,
                    },
                    "question_sql" => TrainingExample::QuestionSql {
                        question: needs("question")?,
                        sql: needs("sql")?,
                    },
                    other => {
                        return Err(invalid(format!("unknown training_type '{}'", other)));
                    }
                };
                Ok(Operation::Train(example))
            }
            GET_TABLES => Ok(Operation::ListTables),
            GET_SCHEMA => Ok(Operation::DescribeSchema {
                table_name: required("table_name")?,
            }),
            EXECUTE_SQL => Ok(Operation::Execute {
                sql: required("sql")?,
            }),
            _ => Err(McpError::ToolNotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Ask { .. } => "ask",
            Operation::Train(_) => "train",
            Operation::ListTables => "list_tables",
            Operation::DescribeSchema { .. } => "describe_schema",
            Operation::Execute { .. } => "execute",
        }
    }
}

/// Outcome of one dispatched operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    Ok { text: String },
    Err { message: String },
}

impl OperationResult {
    pub fn ok(text: impl Into<String>) -> Self {
        OperationResult::Ok { text: text.into() }
    }

    pub fn err(message: impl Into<String>) -> Self {
        OperationResult::Err {
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, OperationResult::Ok { .. })
    }

    /// Text shown to the agent. Failures read `Error: <cause>`.
    pub fn text(&self) -> String {
        match self {
            OperationResult::Ok { text } => text.clone(),
            OperationResult::Err { message } => format!("Error: {}", message),
        }
    }
}

impl From<OperationResult> for CallToolResponse {
    fn from(result: OperationResult) -> Self {
        let text = result.text();
        if result.is_ok() {
            CallToolResponse::text(text)
        } else {
            CallToolResponse::error(text)
        }
    }
}
