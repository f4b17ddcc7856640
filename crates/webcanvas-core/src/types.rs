// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the webcanvas bridge.

use serde::{Deserialize, Serialize};

/// What the attached surface should display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The bundled scaffold document.
    #[default]
    Canvas,
    /// The URL last given to `navigate`.
    Web,
}

impl Mode {
    /// Lowercase wire name (`"canvas"` / `"web"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Canvas => "canvas",
            Mode::Web => "web",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
