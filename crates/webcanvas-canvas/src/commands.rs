// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `canvas.*` command dispatch.
//
// Agents address the canvas by command name plus a raw JSON params blob. The
// params are read with the tolerant helpers from `webcanvas_core::params`; only
// commands that cannot do anything without a field (`navigate`, `eval`) reject
// its absence.

use serde_json::{Value, json};
use tracing::{info, warn};
use webcanvas_core::error::{CanvasError, Result};
use webcanvas_core::params::{parse_eval_js, parse_mode, parse_navigate_url, parse_snapshot_max_width};
use webcanvas_core::types::Mode;

use crate::controller::CanvasController;

pub const SET_MODE: &str = "canvas.setMode";
pub const NAVIGATE: &str = "canvas.navigate";
pub const EVAL: &str = "canvas.eval";
pub const SNAPSHOT: &str = "canvas.snapshot";

/// A validated canvas command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasCommand {
    SetMode(Mode),
    Navigate(String),
    Eval(String),
    Snapshot { max_width: Option<u32> },
}

impl CanvasCommand {
    /// Resolve `name` and pull its arguments out of `params_json`.
    pub fn parse(name: &str, params_json: Option<&str>) -> Result<Self> {
        match name {
            SET_MODE => Ok(Self::SetMode(parse_mode(params_json))),
            NAVIGATE => parse_navigate_url(params_json)
                .map(Self::Navigate)
                .ok_or_else(|| CanvasError::InvalidParams("url required".into())),
            EVAL => parse_eval_js(params_json)
                .map(Self::Eval)
                .ok_or_else(|| CanvasError::InvalidParams("javaScript required".into())),
            SNAPSHOT => Ok(Self::Snapshot {
                max_width: parse_snapshot_max_width(params_json),
            }),
            other => Err(CanvasError::UnknownCommand(other.to_string())),
        }
    }

    /// Run against `controller`, returning the success payload.
    pub async fn execute(self, controller: &CanvasController) -> Result<Value> {
        match self {
            Self::SetMode(mode) => {
                controller.set_mode(mode);
                Ok(json!({ "ok": true, "mode": controller.mode() }))
            }
            Self::Navigate(url) => {
                controller.navigate(&url);
                Ok(json!({ "ok": true, "mode": controller.mode(), "url": url }))
            }
            Self::Eval(java_script) => {
                let result = controller.evaluate_script(&java_script).await?;
                Ok(json!({ "ok": true, "result": result }))
            }
            Self::Snapshot { max_width } => {
                let base64 = controller.capture_snapshot(max_width).await?;
                Ok(json!({ "ok": true, "format": "png", "base64": base64 }))
            }
        }
    }
}

/// Reply payload for a failed command.
pub fn error_reply(err: &CanvasError) -> Value {
    json!({
        "ok": false,
        "error": { "code": err.code(), "message": err.to_string() },
    })
}

/// Parse, execute and serialise one command. Never fails; errors become
/// `{"ok":false,...}` replies.
pub async fn handle(controller: &CanvasController, name: &str, params_json: Option<&str>) -> Value {
    info!(command = name, "canvas command");
    let outcome = match CanvasCommand::parse(name, params_json) {
        Ok(command) => command.execute(controller).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(reply) => reply,
        Err(e) => {
            warn!(command = name, error = %e, "canvas command failed");
            error_reply(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use webcanvas_bridge::{HeadlessSurface, PumpedQueue};
    use webcanvas_core::CanvasConfig;

    fn controller() -> CanvasController {
        let queue = PumpedQueue::new();
        queue.bind_current_thread();
        CanvasController::new(Arc::new(queue), &CanvasConfig::default())
    }

    #[test]
    fn parse_known_commands() {
        assert_eq!(
            CanvasCommand::parse(SET_MODE, Some(r#"{"mode":"web"}"#)).expect("parse"),
            CanvasCommand::SetMode(Mode::Web)
        );
        assert_eq!(
            CanvasCommand::parse(SET_MODE, None).expect("parse"),
            CanvasCommand::SetMode(Mode::Canvas)
        );
        assert_eq!(
            CanvasCommand::parse(NAVIGATE, Some(r#"{"url":" https://x "}"#)).expect("parse"),
            CanvasCommand::Navigate("https://x".into())
        );
        assert_eq!(
            CanvasCommand::parse(SNAPSHOT, Some(r#"{"maxWidth":0}"#)).expect("parse"),
            CanvasCommand::Snapshot { max_width: None }
        );
    }

    #[test]
    fn parse_rejects_missing_required_fields() {
        let err = CanvasCommand::parse(NAVIGATE, Some(r#"{"url":"  "}"#)).expect_err("blank url");
        assert_eq!(err.code(), "INVALID_REQUEST");
        let err = CanvasCommand::parse(EVAL, Some("garbage")).expect_err("no script");
        assert_eq!(err.to_string(), "invalid request: javaScript required");
    }

    #[test]
    fn parse_rejects_unknown_command() {
        let err = CanvasCommand::parse("canvas.explode", None).expect_err("unknown");
        assert!(matches!(err, CanvasError::UnknownCommand(name) if name == "canvas.explode"));
    }

    #[tokio::test]
    async fn handle_navigate_then_eval() {
        let controller = controller();
        let surface = Arc::new(HeadlessSurface::default());
        surface.set_script_responder(Arc::new(|_: &str| Some("\"Example\"".into())));
        controller.attach(surface.clone());

        let reply = handle(&controller, NAVIGATE, Some(r#"{"url":"https://example.com"}"#)).await;
        assert_eq!(reply, json!({ "ok": true, "mode": "web", "url": "https://example.com" }));
        assert_eq!(surface.current_url().as_deref(), Some("https://example.com"));

        let reply = handle(&controller, EVAL, Some(r#"{"javaScript":"document.title"}"#)).await;
        assert_eq!(reply, json!({ "ok": true, "result": "\"Example\"" }));
    }

    #[tokio::test]
    async fn handle_reports_missing_surface() {
        let controller = controller();
        let reply = handle(&controller, SNAPSHOT, None).await;
        assert_eq!(reply["ok"], json!(false));
        assert_eq!(reply["error"]["code"], json!("NO_SURFACE"));
    }

    #[tokio::test]
    async fn handle_snapshot_returns_png() {
        let controller = controller();
        controller.attach(Arc::new(HeadlessSurface::new(40, 20)));
        let reply = handle(&controller, SNAPSHOT, Some(r#"{"maxWidth":20}"#)).await;
        assert_eq!(reply["format"], json!("png"));
        assert!(reply["base64"].as_str().is_some_and(|b64| !b64.is_empty()));
    }
}
