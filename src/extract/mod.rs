//! Response extractor.
//!
//! Recovers a list of [`ScheduledBlock`]s from an agent's free-form
//! reply. Extraction is best-effort and never fails: anything that
//! cannot be understood yields fewer blocks, possibly none.
//!
//! # Pipeline
//!
//! 1. Locate a candidate payload ([`strategy::locate_payload`]): a
//!    `json` fence, else the first balanced `[...]`, else the first
//!    balanced `{...}`.
//! 2. Parse it as JSON. Failure means no blocks.
//! 3. Unwrap a container object (`schedule`, `blocks`, `events`,
//!    `focus_blocks`), or treat a bare object as a one-entry list.
//! 4. Resolve each entry's title/start/end through their aliases.
//!
//! Replies that go through a calendar tool instead of free text are
//! read by [`blocks_from_tool_calls`], which shares step 4.

mod entry;
pub mod strategy;
mod tool_call;

pub use entry::{block_from_entry, blocks_from_value};
pub use strategy::{locate_payload, PayloadSource};
pub use tool_call::{blocks_from_proposal, blocks_from_tool_calls, ToolCall, PROPOSE_TOOLS};

use serde_json::Value;
use tracing::debug;

use crate::models::ScheduledBlock;

/// Extracts proposed blocks from free-form text.
///
/// # Example
/// ```
/// use u_schedule_judge::extract::extract_blocks;
///
/// let reply = "Sure!\n```json\n[{\"title\": \"Deep work\", \
///              \"start\": \"2025-01-20T09:00:00Z\", \"end\": \"2025-01-20T11:00:00Z\"}]\n```";
/// let blocks = extract_blocks(reply);
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].title, "Deep work");
/// ```
pub fn extract_blocks(text: &str) -> Vec<ScheduledBlock> {
    let Some((source, payload)) = strategy::locate_payload(text) else {
        debug!("no structured payload in response");
        return Vec::new();
    };
    let value: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => {
            debug!(?source, error = %e, "candidate payload is not JSON");
            return Vec::new();
        }
    };
    let blocks = blocks_from_value(&value);
    debug!(?source, blocks = blocks.len(), "extracted blocks from response");
    blocks
}
