//! Built-in static resources.

use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::mcp::protocol::SERVER_NAME;
use crate::registry::{ResourceDescriptor, ResourceEntry};
use crate::tools::ToolFault;

/// URI of the welcome text.
pub const WELCOME_URI: &str = "text://welcome";

/// URI of the server information document.
pub const SERVER_INFO_URI: &str = "json://server_info";

const WELCOME_TEXT: &str = "Welcome to the basic MCP server!

This server is a learning example and provides:
- echo: return a message unchanged
- add: add two numbers
- hello: a simple greeting
- calculate: evaluate an arithmetic expression
- current_time: the current date and time

See tools/list for the full argument schemas.";

/// All built-in resources, in advertisement order.
#[must_use]
pub fn entries() -> Vec<ResourceEntry> {
    vec![
        ResourceEntry {
            descriptor: ResourceDescriptor {
                uri: WELCOME_URI.to_string(),
                name: "Welcome message".to_string(),
                description: "The server's welcome message".to_string(),
                mime_type: "text/plain".to_string(),
            },
            reader: read_welcome,
        },
        ResourceEntry {
            descriptor: ResourceDescriptor {
                uri: SERVER_INFO_URI.to_string(),
                name: "Server information".to_string(),
                description: "Details about this MCP server".to_string(),
                mime_type: "application/json".to_string(),
            },
            reader: read_server_info,
        },
    ]
}

#[allow(clippy::unnecessary_wraps)] // must match ResourceReader
fn read_welcome() -> Result<String, ToolFault> {
    Ok(WELCOME_TEXT.to_string())
}

fn read_server_info() -> Result<String, ToolFault> {
    let info = json!({
        "name": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "capabilities": ["tools", "resources", "prompts"],
        "supported_languages": ["English", "Japanese"],
        "created_at": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    });

    serde_json::to_string_pretty(&info).map_err(|e| ToolFault::Failed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_is_non_empty() {
        let text = read_welcome().unwrap();
        assert!(!text.trim().is_empty());
        assert!(text.contains("calculate"));
    }

    #[test]
    fn server_info_is_json() {
        let text = read_server_info().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["name"], SERVER_NAME);
        assert_eq!(value["capabilities"].as_array().unwrap().len(), 3);
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn uris_have_scheme() {
        for entry in entries() {
            assert!(entry.descriptor.uri.contains("://"));
        }
    }
}
