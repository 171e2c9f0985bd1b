//! MCP server setup and lifecycle.
//!
//! Provides [`run_server`] which starts the stdio-based MCP server,
//! registering the impact-analysis tool and blocking until the client
//! disconnects.

use std::path::PathBuf;

use ripple_core::{RippleConfig, RippleError};
use rmcp::{model::*, tool_handler, transport::stdio, ServerHandler, ServiceExt};

use crate::tools::RippleServer;

const SERVER_INSTRUCTIONS: &str = "\
Ripple predicts co-changes from git history. Use the tool to avoid incomplete edits:\n\
- impact_analysis: given the files already modified in the current change, returns the \
files that historically change together with them, ranked by confidence (co-change \
probability) and support (occurrence count)";

#[tool_handler]
impl ServerHandler for RippleServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "ripple".to_string(),
                title: Some("Ripple Impact Analysis".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "Co-change impact analysis mined from git history".to_string(),
                ),
                icons: None,
                website_url: None,
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }
    }
}

/// Start the MCP server on stdio transport.
///
/// This is called by the `ripple mcp` CLI subcommand. It blocks until the
/// client closes stdin. Results go to stdout; diagnostics must stay on
/// stderr.
///
/// # Errors
///
/// Returns [`RippleError`] if the server fails to initialize or encounters
/// a transport error.
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
///
/// # async fn example() -> Result<(), ripple_core::RippleError> {
/// ripple_mcp::server::run_server(PathBuf::from("."), ripple_core::RippleConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_server(repo_path: PathBuf, config: RippleConfig) -> Result<(), RippleError> {
    let server = RippleServer::new(repo_path, config);
    let service = server
        .serve(stdio())
        .await
        .map_err(|e| RippleError::Config(format!("MCP server failed to start: {e}")))?;

    service
        .waiting()
        .await
        .map_err(|e| RippleError::Config(format!("MCP server error: {e}")))?;

    Ok(())
}
