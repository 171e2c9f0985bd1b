//! MCP server interface exposing Ripple to IDEs and coding agents.
//!
//! Implements a Model Context Protocol server using rmcp that exposes the
//! `impact_analysis` tool over stdio transport: given the files already
//! modified in the working change, it returns the files history says are
//! likely to change with them.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), ripple_core::RippleError> {
//! ripple_mcp::server::run_server(PathBuf::from("."), ripple_core::RippleConfig::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod server;
pub mod tools;
