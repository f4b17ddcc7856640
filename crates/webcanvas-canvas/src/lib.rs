// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// webcanvas-canvas — Drives an embedded web view for the agent canvas.
//
// Provides the canvas controller (scaffold vs. web rendering, script
// evaluation, snapshot capture), the snapshot encoding pipeline, and the
// `canvas.*` command dispatcher.

pub mod commands;
pub mod controller;
pub mod snapshot;

// Re-export the primary types so callers can use `webcanvas_canvas::CanvasController` etc.
pub use commands::CanvasCommand;
pub use controller::CanvasController;
pub use snapshot::Snapshot;
