//! MCP (Model Context Protocol) server
//!
//! Exposes `search_in_file` to MCP clients via JSON-RPC over stdio.

pub mod catalog;
mod protocol;
mod server;

pub use server::{McpServer, SERVER_NAME};
