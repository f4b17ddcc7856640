// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Headless surface for desktop/CI builds where no native web view exists.
//
// It keeps a log of everything the controller asked it to do, paints a solid
// colour when drawn, and answers scripts through an optional responder.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use image::{Rgba, RgbaImage};
use webcanvas_core::error::Result;

use crate::traits::{ScriptCallback, Surface};

/// Produces the result for an evaluated script.
pub type ScriptResponder = Arc<dyn Fn(&str) -> Option<String> + Send + Sync + 'static>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory stand-in for an embedded web view.
pub struct HeadlessSurface {
    size: Mutex<(u32, u32)>,
    fill: Mutex<Rgba<u8>>,
    loads: Mutex<Vec<String>>,
    scripts: Mutex<Vec<String>>,
    responder: Mutex<Option<ScriptResponder>>,
}

impl HeadlessSurface {
    /// Create a surface laid out at `width` x `height`, painted white.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Mutex::new((width, height)),
            fill: Mutex::new(Rgba([255, 255, 255, 255])),
            loads: Mutex::new(Vec::new()),
            scripts: Mutex::new(Vec::new()),
            responder: Mutex::new(None),
        }
    }

    pub fn set_layout_size(&self, width: u32, height: u32) {
        *lock(&self.size) = (width, height);
    }

    pub fn set_fill(&self, rgba: [u8; 4]) {
        *lock(&self.fill) = Rgba(rgba);
    }

    pub fn set_script_responder(&self, responder: ScriptResponder) {
        *lock(&self.responder) = Some(responder);
    }

    /// Every URL passed to `load_url`, oldest first.
    pub fn loaded_urls(&self) -> Vec<String> {
        lock(&self.loads).clone()
    }

    /// The URL currently displayed, if anything was ever loaded.
    pub fn current_url(&self) -> Option<String> {
        lock(&self.loads).last().cloned()
    }

    /// Every script passed to `evaluate_script`, oldest first.
    pub fn evaluated_scripts(&self) -> Vec<String> {
        lock(&self.scripts).clone()
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(390, 844)
    }
}

impl Surface for HeadlessSurface {
    fn platform_name(&self) -> &str {
        "Headless (stub)"
    }

    fn load_url(&self, url: &str) -> Result<()> {
        tracing::debug!(url, "headless surface: load");
        lock(&self.loads).push(url.to_string());
        Ok(())
    }

    fn evaluate_script(&self, java_script: &str, done: ScriptCallback) -> Result<()> {
        lock(&self.scripts).push(java_script.to_string());
        let responder = lock(&self.responder).clone();
        done(responder.and_then(|respond| respond(java_script)));
        Ok(())
    }

    fn layout_size(&self) -> (u32, u32) {
        *lock(&self.size)
    }

    fn draw(&self, target: &mut RgbaImage) -> Result<()> {
        let (width, height) = self.layout_size();
        let fill = *lock(&self.fill);
        for (x, y, pixel) in target.enumerate_pixels_mut() {
            if x < width && y < height {
                *pixel = fill;
            }
        }
        Ok(())
    }
}
