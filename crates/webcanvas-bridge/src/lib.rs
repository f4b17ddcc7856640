// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! webcanvas — Embedded web-view surface abstractions.
//!
//! This crate defines the `Surface` seam the canvas controller drives, the
//! `UiExecutor` seam that keeps every surface call on its owning thread, and
//! the per-platform surfaces. Android wraps `android.webkit.WebView` over JNI;
//! every other target gets the in-memory `HeadlessSurface`.

pub mod executor;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

pub mod stub;

pub use executor::{PumpedQueue, WorkerThread};
pub use stub::HeadlessSurface;
pub use traits::{ScriptCallback, Surface, UiExecutor, UiTask};
