use anyhow::{bail, Result};
use console::style;

use crate::client::{parse_arguments, McpClient};

pub async fn execute(client: &McpClient, name: &str, args: Option<&str>) -> Result<()> {
    let arguments = parse_arguments(args)?;
    let response = client.call_tool(name, arguments).await?;

    if response.is_error {
        bail!("{} {}", style("Tool error:").red().bold(), response.text());
    }

    // pretty-print JSON payloads, pass anything else through untouched
    match serde_json::from_str::<serde_json::Value>(response.text()) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", response.text()),
    }
    Ok(())
}
