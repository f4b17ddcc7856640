// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the embedded web-view surface and
// the execution context its methods must run on.

use image::RgbaImage;
use webcanvas_core::error::Result;

use crate::executor::run_guarded;

/// Completion for [`Surface::evaluate_script`]. Called exactly once with the
/// serialized script result, or `None` when the engine reported nothing.
pub type ScriptCallback = Box<dyn FnOnce(Option<String>) + Send + 'static>;

/// Unit of work scheduled onto the UI execution context.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// An embedded web-rendering view.
///
/// Every method must be called from the UI execution context that owns the
/// view. Callers go through a [`UiExecutor`] to guarantee that.
pub trait Surface: Send + Sync {
    /// Human-readable platform name (e.g. "Android WebView").
    fn platform_name(&self) -> &str;

    /// Start a full navigation to `url`.
    fn load_url(&self, url: &str) -> Result<()>;

    /// Run `java_script` in the current page. `done` fires later, possibly
    /// from a subsequent turn of the UI loop.
    fn evaluate_script(&self, java_script: &str, done: ScriptCallback) -> Result<()>;

    /// Current layout size in pixels. Either dimension may be 0 before the
    /// first layout pass.
    fn layout_size(&self) -> (u32, u32);

    /// Copy the rendered pixels into `target`, whose dimensions the caller
    /// has already fixed. Content outside the view is left untouched.
    fn draw(&self, target: &mut RgbaImage) -> Result<()>;
}

/// The single execution context that owns all surfaces.
pub trait UiExecutor: Send + Sync {
    /// Whether the calling thread is the UI thread.
    fn is_ui_thread(&self) -> bool;

    /// Queue `task` without waiting for it. Tasks run in posting order.
    fn post(&self, task: UiTask);

    /// Run `task` right away on the UI thread, otherwise hand it off. A panic
    /// in an inline task is contained the same way as in a posted one.
    fn dispatch(&self, task: UiTask) {
        if self.is_ui_thread() {
            run_guarded(task);
        } else {
            self.post(task);
        }
    }
}
