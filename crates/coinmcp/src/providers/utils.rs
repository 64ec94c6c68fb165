use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::models::tool::Tool;

/// Convert internal Tool definitions to OpenAI's function-calling format
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    check_unique_names(tools)?;
    Ok(tools
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.input_schema,
                }
            })
        })
        .collect())
}

/// Convert internal Tool definitions to Anthropic's tool-use format
pub fn tools_to_anthropic_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    check_unique_names(tools)?;
    Ok(tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "input_schema": tool.input_schema,
            })
        })
        .collect())
}

fn check_unique_names(tools: &[Tool]) -> Result<()> {
    let mut tool_names = HashSet::new();
    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }
    }
    Ok(())
}

/// Pull the assistant text out of a chat response at the given JSON pointer
pub fn response_text(response: &Value, pointer: &str) -> Result<String> {
    response
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("No message content at {} in response", pointer))
}
