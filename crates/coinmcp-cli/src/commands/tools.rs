use anyhow::Result;
use clap::ValueEnum;
use coinmcp::models::tool::Tool;
use coinmcp::providers::utils::{tools_to_anthropic_spec, tools_to_openai_spec};
use serde_json::Value;

use crate::client::McpClient;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToolFormat {
    /// Tool definitions exactly as the server lists them
    #[default]
    Mcp,
    /// OpenAI function-calling definitions
    Openai,
    /// Anthropic tool-use definitions
    Anthropic,
}

pub fn render(tools: &[Tool], format: ToolFormat) -> Result<Value> {
    let rendered = match format {
        ToolFormat::Mcp => serde_json::to_value(tools)?,
        ToolFormat::Openai => Value::Array(tools_to_openai_spec(tools)?),
        ToolFormat::Anthropic => Value::Array(tools_to_anthropic_spec(tools)?),
    };
    Ok(rendered)
}

pub async fn execute(client: &McpClient, format: ToolFormat) -> Result<()> {
    let tools = client.list_tools().await?;
    println!("{}", serde_json::to_string_pretty(&render(&tools, format)?)?);
    Ok(())
}
