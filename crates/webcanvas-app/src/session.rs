// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line protocol spoken on stdin/stdout.
//
// Each request is one line: a command name, optionally followed by whitespace
// and a JSON params blob. Each reply is one line of JSON. Blank lines and
// lines starting with `#` are skipped.

use serde_json::{Value, json};
use webcanvas_canvas::CanvasController;
use webcanvas_canvas::commands::{self, error_reply};
use webcanvas_core::ActionMessage;

/// Command that turns a page-posted action payload into an agent line.
pub const USER_ACTION: &str = "canvas.userAction";

/// Who this node is, as stamped into action messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub session_key: String,
    pub host: String,
    pub instance_id: String,
}

impl HostIdentity {
    /// Read from `WEBCANVAS_SESSION`, `HOSTNAME` and `WEBCANVAS_INSTANCE`.
    pub fn from_env() -> Self {
        let var = |name: &str, default: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            session_key: var("WEBCANVAS_SESSION", "main"),
            host: var("HOSTNAME", "webcanvas"),
            instance_id: var("WEBCANVAS_INSTANCE", "headless"),
        }
    }
}

/// Split a request line into command name and params. `None` for lines that
/// carry no request.
pub fn parse_line(line: &str) -> Option<(&str, Option<&str>)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((name, params)) => Some((name, Some(params.trim()))),
        None => Some((line, None)),
    }
}

/// Serve one request line.
pub async fn serve_line(
    controller: &CanvasController,
    identity: &HostIdentity,
    line: &str,
) -> Option<Value> {
    let (name, params) = parse_line(line)?;
    if name == USER_ACTION {
        return Some(user_action(identity, params.unwrap_or("")));
    }
    Some(commands::handle(controller, name, params).await)
}

fn user_action(identity: &HostIdentity, payload: &str) -> Value {
    match ActionMessage::from_user_action(
        payload,
        &identity.session_key,
        &identity.host,
        &identity.instance_id,
    ) {
        Ok(message) => json!({ "ok": true, "message": message.to_line() }),
        Err(e) => error_reply(&e),
    }
}
