//! Blocks proposed through calendar tool calls.
//!
//! When an agent works through a calendar tool, its schedule is the
//! argument list of its final "propose" call rather than prose. Earlier
//! proposals may have been withdrawn and retried, so only the last one
//! counts.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::entry::blocks_from_value;
use crate::models::ScheduledBlock;

/// Tool names whose `events` argument is a proposed schedule.
pub const PROPOSE_TOOLS: [&str; 2] = ["propose_events", "propose_and_commit"];

/// A tool invocation made by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name.
    pub name: String,
    /// Arguments as sent.
    #[serde(default)]
    pub input: Value,
}

impl ToolCall {
    /// Creates a tool call.
    pub fn new(name: impl Into<String>, input: Value) -> Self {
        Self {
            name: name.into(),
            input,
        }
    }

    /// Whether this call proposes a schedule.
    pub fn is_proposal(&self) -> bool {
        PROPOSE_TOOLS.contains(&self.name.as_str())
    }
}

/// Reads blocks from a proposal's arguments (`{"events": [...]}`).
///
/// A missing or non-array `events` yields no blocks.
pub fn blocks_from_proposal(input: &Value) -> Vec<ScheduledBlock> {
    match input.get("events") {
        Some(events @ Value::Array(_)) => blocks_from_value(events),
        _ => Vec::new(),
    }
}

/// Reads blocks from the last proposal among `calls`.
pub fn blocks_from_tool_calls(calls: &[ToolCall]) -> Vec<ScheduledBlock> {
    let Some(last) = calls.iter().rev().find(|c| c.is_proposal()) else {
        debug!(calls = calls.len(), "no proposal among tool calls");
        return Vec::new();
    };
    let blocks = blocks_from_proposal(&last.input);
    debug!(tool = %last.name, blocks = blocks.len(), "read proposal");
    blocks
}
