// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-line encoding of user actions raised inside the canvas.
//
// The agent side reads these lines out of a chat transcript and splits them on
// whitespace, so every identifier field is squeezed into one token. Key order
// and spelling are part of the contract.

use serde_json::Value;

use crate::error::{CanvasError, Result};

/// Prefix that marks a line as a canvas action.
pub const MESSAGE_PREFIX: &str = "CANVAS_A2UI";

/// Fixed trailer telling the agent what to do when it has no better idea.
pub const MESSAGE_SUFFIX: &str = "default=update_canvas";

/// Surface id assumed when the page does not name one.
pub const DEFAULT_SURFACE_ID: &str = "main";

/// Make `value` safe to use as a single whitespace-delimited token.
///
/// Surrounding whitespace is dropped, then every character outside
/// `[A-Za-z0-9.-]` becomes `_`. Input that is empty after trimming maps to
/// `"-"`, so the result is never empty.
pub fn sanitize_tag_value(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "-".to_string();
    }
    trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Compose the action line. `context_json` is inserted verbatim.
pub fn format_agent_message(
    action_name: &str,
    session_key: &str,
    surface_id: &str,
    source_component_id: &str,
    host: &str,
    instance_id: &str,
    context_json: &str,
) -> String {
    format!(
        "{MESSAGE_PREFIX} action={} session={} surface={} component={} host={} instance={} ctx={} {MESSAGE_SUFFIX}",
        sanitize_tag_value(action_name),
        sanitize_tag_value(session_key),
        sanitize_tag_value(surface_id),
        sanitize_tag_value(source_component_id),
        sanitize_tag_value(host),
        sanitize_tag_value(instance_id),
        context_json,
    )
}

/// A user action raised by a component inside the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMessage {
    pub action_name: String,
    pub session_key: String,
    pub surface_id: String,
    pub source_component_id: String,
    pub host: String,
    pub instance_id: String,
    /// Raw JSON object text describing the action's context.
    pub context_json: String,
}

impl ActionMessage {
    /// Build a message from the JSON payload the page posts through its
    /// action bridge: `{"name", "surfaceId"?, "sourceComponentId"?, "context"?}`.
    ///
    /// The session, host and instance come from the node, not the page.
    pub fn from_user_action(
        payload: &str,
        session_key: &str,
        host: &str,
        instance_id: &str,
    ) -> Result<Self> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| CanvasError::InvalidParams(format!("action payload: {e}")))?;
        let obj = value
            .as_object()
            .ok_or_else(|| CanvasError::InvalidParams("action payload must be an object".into()))?;

        let action_name = obj
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| CanvasError::InvalidParams("action name required".into()))?;
        let surface_id = obj
            .get("surfaceId")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_SURFACE_ID);
        let source_component_id = obj
            .get("sourceComponentId")
            .and_then(Value::as_str)
            .unwrap_or("-");
        let context_json = match obj.get("context") {
            Some(ctx @ Value::Object(_)) => serde_json::to_string(ctx)?,
            _ => "{}".to_string(),
        };

        Ok(Self {
            action_name: action_name.to_string(),
            session_key: session_key.to_string(),
            surface_id: surface_id.to_string(),
            source_component_id: source_component_id.to_string(),
            host: host.to_string(),
            instance_id: instance_id.to_string(),
            context_json,
        })
    }

    /// Encode as a single agent-readable line.
    pub fn to_line(&self) -> String {
        format_agent_message(
            &self.action_name,
            &self.session_key,
            &self.surface_id,
            &self.source_component_id,
            &self.host,
            &self.instance_id,
            &self.context_json,
        )
    }
}

impl std::fmt::Display for ActionMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_line())
    }
}
