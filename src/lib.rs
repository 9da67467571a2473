//! Taiga bridge: MCP tools and a REST action proxy over the Taiga API.
//!
//! Both surfaces feed the same [`actions::Actions`] handlers, which talk to
//! Taiga through the [`taiga::TaigaApi`] trait.

pub mod actions;
pub mod api;
pub mod config;
pub mod error;
pub mod idempotency;
pub mod mcp;
pub mod models;
pub mod taiga;
