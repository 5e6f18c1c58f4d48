//! `sqlgate tools` - print the tool catalog agents will see.

use anyhow::Result;
use sqlgate_mcp::catalog::tool_definitions;

pub fn list(verbose: bool) -> Result<()> {
    let tools = tool_definitions();

    println!("\nAvailable Tools ({}):", tools.len());

    for tool in &tools {
        let read_only = tool
            .annotations
            .as_ref()
            .is_some_and(|a| a.read_only == Some(true));

        println!(
            "   • {} ({})",
            tool.name,
            if read_only { "read" } else { "write" }
        );

        if let Some(desc) = &tool.description {
            println!("     {}", desc);
        }

        if verbose {
            println!(
                "     Schema: {}",
                serde_json::to_string_pretty(&tool.input_schema)?
            );
        }
    }

    println!();

    Ok(())
}
