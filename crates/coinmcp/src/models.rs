//! These models represent the objects exchanged over the tool-call protocol
//!
//! There are a few related formats we need to interact with:
//! - MCP tool listings and tool calls, sent by LLM clients to the server
//! - the `{content, isError}` envelope, sent back from every tool call
//! - openai and anthropic tool specs, derived from the MCP listing by clients
//!
//! We always immediately convert those payloads into the internal structs. The
//! serialized field names follow the MCP wire format (`inputSchema`, `isError`).
pub mod content;
pub mod tool;
