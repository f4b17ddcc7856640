// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration and data directory resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// File name of the persisted configuration inside the data directory.
pub const CONFIG_FILE: &str = "canvas.json";

/// Scaffold document bundled with the host application.
pub const DEFAULT_SCAFFOLD_URL: &str = "file:///android_asset/webcanvas/scaffold.html";

/// Resampling filter used when a snapshot is downscaled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFilter {
    Nearest,
    /// Bilinear. Matches the platform's filtered bitmap scaling.
    #[default]
    Triangle,
    Lanczos3,
}

/// Persistent bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// URL loaded whenever the controller is in canvas mode.
    pub scaffold_url: String,
    /// Filter applied when `maxWidth` forces a downscale.
    pub snapshot_filter: SnapshotFilter,
    /// Fallback `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            scaffold_url: DEFAULT_SCAFFOLD_URL.to_string(),
            snapshot_filter: SnapshotFilter::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl CanvasConfig {
    /// Load `canvas.json` from `dir`, falling back to defaults when the file
    /// is missing or malformed.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&data) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "malformed config, using defaults");
                Self::default()
            }
        }
    }

    /// Write the configuration to `canvas.json` in `dir`.
    pub fn persist(&self, dir: &Path) -> Result<()> {
        let path = dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(())
    }
}

/// Return the application data directory, creating it if needed.
///
/// `WEBCANVAS_DATA_DIR` wins; otherwise the XDG data dir, then
/// `~/.local/share`, then `/tmp`.
pub fn data_dir() -> PathBuf {
    let dir = match std::env::var_os("WEBCANVAS_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => dirs_fallback().join("webcanvas"),
    };
    std::fs::create_dir_all(&dir).ok();
    dir
}

fn dirs_fallback() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort
    PathBuf::from("/tmp")
}
