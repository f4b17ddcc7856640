// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for webcanvas.

use thiserror::Error;

/// Top-level error type for all webcanvas operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    // -- Surface errors --
    #[error("no surface attached")]
    NoSurfaceAttached,

    #[error("surface bridge error: {0}")]
    Bridge(String),

    // -- Command errors --
    #[error("invalid request: {0}")]
    InvalidParams(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    // -- Snapshot errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CanvasError {
    /// Stable machine-readable code used in command replies.
    pub fn code(&self) -> &'static str {
        match self {
            CanvasError::NoSurfaceAttached => "NO_SURFACE",
            CanvasError::InvalidParams(_) => "INVALID_REQUEST",
            CanvasError::UnknownCommand(_) => "UNKNOWN_COMMAND",
            CanvasError::Bridge(_)
            | CanvasError::ImageError(_)
            | CanvasError::Io(_)
            | CanvasError::Serialization(_) => "UNAVAILABLE",
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CanvasError>;
