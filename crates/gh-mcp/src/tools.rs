//! MCP tool listing and result shapes
//!
//! Tool definitions are derived from the `gh-tools` registry, so the
//! advertised schemas are exactly the ones the dispatcher validates against.

use gh_tools::{Registry, ToolCallResult, ToolDescriptor};
use serde::{Deserialize, Serialize};

/// Tool definition for MCP protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

impl From<&ToolDescriptor> for ToolDefinition {
    fn from(descriptor: &ToolDescriptor) -> Self {
        Self {
            name: descriptor.name.to_string(),
            description: descriptor.description.to_string(),
            input_schema: descriptor.input_schema(),
        }
    }
}

/// Result from a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Content types for tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }
}

impl From<ToolCallResult> for ToolResult {
    fn from(result: ToolCallResult) -> Self {
        ToolResult::text(result.text())
    }
}

/// Definitions for every registered tool, in registry order
pub fn get_tool_definitions(registry: &Registry) -> Vec<ToolDefinition> {
    registry.list().iter().map(ToolDefinition::from).collect()
}
