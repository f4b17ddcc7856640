// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// webcanvas — Core types, errors, parameter parsing and action encoding shared
// across all crates.

pub mod action;
pub mod config;
pub mod error;
pub mod params;
pub mod types;

pub use action::{ActionMessage, format_agent_message, sanitize_tag_value};
pub use config::CanvasConfig;
pub use error::CanvasError;
pub use params::{parse_eval_js, parse_mode, parse_navigate_url, parse_snapshot_max_width};
pub use types::*;
