//! basic-mcp-server: a minimal Model Context Protocol server
//!
//! This library serves a fixed set of tools, resources and prompts to an MCP
//! client over stdio.
//!
//! # Architecture
//!
//! - **Registry**: Capabilities keyed by category and name, each with a
//!   descriptor and a handler
//! - **Dispatcher**: Maps JSON-RPC requests onto registry entries and
//!   separates protocol errors from tool faults
//! - **Transport**: Newline-delimited JSON over stdin/stdout
//!
//! # Modules
//!
//! - [`catalog`]: The built-in capability set
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Error types
//! - [`mcp`]: MCP protocol implementation
//! - [`prompts`]: Prompt templates
//! - [`registry`]: Capability registry and argument schemas
//! - [`resources`]: Static resources
//! - [`tools`]: Tool handlers, including the arithmetic evaluator

pub mod catalog;
pub mod config;
pub mod error;
pub mod mcp;
pub mod prompts;
pub mod registry;
pub mod resources;
pub mod tools;
