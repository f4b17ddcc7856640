// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tolerant extraction of `canvas.*` command parameters.
//
// Every helper takes the raw params blob as sent by the caller and pulls out
// exactly one field. Missing blobs, malformed JSON, non-object roots and
// wrongly-typed fields all collapse into the default/absent outcome; nothing
// here ever returns an error.

use serde_json::{Map, Value};

use crate::types::Mode;

/// `"mode"`: `Web` only for a string equal to `"web"` ignoring case.
pub fn parse_mode(params_json: Option<&str>) -> Mode {
    let is_web = params_object(params_json)
        .as_ref()
        .and_then(|obj| string_field(obj, "mode"))
        .is_some_and(|mode| mode.eq_ignore_ascii_case("web"));
    if is_web { Mode::Web } else { Mode::Canvas }
}

/// `"url"`: trimmed, and only when something is left after trimming.
pub fn parse_navigate_url(params_json: Option<&str>) -> Option<String> {
    let obj = params_object(params_json)?;
    let url = string_field(&obj, "url")?.trim();
    (!url.is_empty()).then(|| url.to_string())
}

/// `"javaScript"`: returned untrimmed, but blank scripts count as absent.
pub fn parse_eval_js(params_json: Option<&str>) -> Option<String> {
    let obj = params_object(params_json)?;
    let js = string_field(&obj, "javaScript")?;
    (!js.trim().is_empty()).then(|| js.to_string())
}

/// `"maxWidth"`: a positive number. Fractions truncate toward zero, so
/// `0.5` is treated as absent.
pub fn parse_snapshot_max_width(params_json: Option<&str>) -> Option<u32> {
    let obj = params_object(params_json)?;
    let value = obj.get("maxWidth")?;
    let width = match value.as_i64() {
        Some(w) => w,
        None => value.as_f64().filter(|w| w.is_finite())?.trunc() as i64,
    };
    if width <= 0 {
        return None;
    }
    u32::try_from(width).ok()
}

fn params_object(params_json: Option<&str>) -> Option<Map<String, Value>> {
    let raw = params_json?.trim();
    if raw.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(obj)) => Some(obj),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unparsable params");
            None
        }
    }
}

fn string_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)?.as_str()
}
