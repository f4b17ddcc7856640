// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canvas controller — reflects `(mode, url)` onto the attached surface and
// exposes script evaluation and snapshot capture against it.
//
// Each field is synchronised on its own; a reader may observe a new mode with
// an old url. Rendering re-reads both right before acting, so the torn pair is
// never acted on for long.
//
// Rendering is not queued. A mutation made before any surface is attached only
// becomes visible through the render `attach` itself performs, which is why
// `attach` reads the live mode/url rather than anything captured earlier.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use webcanvas_bridge::{Surface, UiExecutor};
use webcanvas_core::config::{CanvasConfig, SnapshotFilter};
use webcanvas_core::error::{CanvasError, Result};
use webcanvas_core::types::Mode;

use crate::snapshot::Snapshot;

const MODE_CANVAS: u8 = 0;
const MODE_WEB: u8 = 1;

fn encode_mode(mode: Mode) -> u8 {
    match mode {
        Mode::Canvas => MODE_CANVAS,
        Mode::Web => MODE_WEB,
    }
}

fn decode_mode(raw: u8) -> Mode {
    if raw == MODE_WEB { Mode::Web } else { Mode::Canvas }
}

/// One-shot sender that can be completed from whichever path finishes first.
struct Completion<T>(Arc<Mutex<Option<oneshot::Sender<T>>>>);

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Completion<T> {
    fn new(tx: oneshot::Sender<T>) -> Self {
        Self(Arc::new(Mutex::new(Some(tx))))
    }

    fn complete(&self, value: T) {
        let tx = self.0.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(tx) = tx {
            // The caller may have given up waiting.
            let _ = tx.send(value);
        }
    }
}

/// Drives a single embedded web-view surface.
pub struct CanvasController {
    executor: Arc<dyn UiExecutor>,
    scaffold_url: String,
    snapshot_filter: SnapshotFilter,
    surface: RwLock<Option<Arc<dyn Surface>>>,
    mode: AtomicU8,
    url: RwLock<String>,
}

impl CanvasController {
    /// Create a controller in canvas mode with no surface attached.
    pub fn new(executor: Arc<dyn UiExecutor>, config: &CanvasConfig) -> Self {
        Self {
            executor,
            scaffold_url: config.scaffold_url.clone(),
            snapshot_filter: config.snapshot_filter,
            surface: RwLock::new(None),
            mode: AtomicU8::new(MODE_CANVAS),
            url: RwLock::new(String::new()),
        }
    }

    // -- State ----------------------------------------------------------------

    pub fn mode(&self) -> Mode {
        decode_mode(self.mode.load(Ordering::SeqCst))
    }

    /// The trimmed url from the last [`navigate`](Self::navigate).
    pub fn url(&self) -> String {
        self.url.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_attached(&self) -> bool {
        self.current_surface().is_some()
    }

    pub fn scaffold_url(&self) -> &str {
        &self.scaffold_url
    }

    fn current_surface(&self) -> Option<Arc<dyn Surface>> {
        self.surface
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // -- Mutations ------------------------------------------------------------

    /// Take over `surface` and render the current state onto it.
    ///
    /// A previously attached surface is dropped from the controller but not
    /// otherwise released.
    pub fn attach(&self, surface: Arc<dyn Surface>) {
        info!(platform = surface.platform_name(), "attaching surface");
        *self.surface.write().unwrap_or_else(PoisonError::into_inner) = Some(surface);
        self.render();
    }

    pub fn set_mode(&self, mode: Mode) {
        info!(%mode, "canvas mode changed");
        self.mode.store(encode_mode(mode), Ordering::SeqCst);
        self.render();
    }

    /// Store `url` and render. A non-blank url also switches to web mode, so
    /// navigating always shows the page even if no mode was set first.
    pub fn navigate(&self, url: &str) {
        let url = url.trim();
        *self.url.write().unwrap_or_else(PoisonError::into_inner) = url.to_string();
        if !url.is_empty() {
            self.mode.store(MODE_WEB, Ordering::SeqCst);
        }
        info!(url, mode = %self.mode(), "canvas navigate");
        self.render();
    }

    /// Push the current state onto the surface, if there is one.
    fn render(&self) {
        let Some(surface) = self.current_surface() else {
            debug!("no surface attached, render deferred");
            return;
        };

        let target = match self.mode() {
            Mode::Web => {
                let trimmed = self.url().trim().to_string();
                if trimmed.is_empty() {
                    // Keep whatever is showing (normally the scaffold).
                    debug!("web mode without url, leaving surface as is");
                    return;
                }
                trimmed
            }
            Mode::Canvas => self.scaffold_url.clone(),
        };

        debug!(url = %target, "render dispatched");
        self.executor.dispatch(Box::new(move || {
            if let Err(e) = surface.load_url(&target) {
                warn!(url = %target, error = %e, "surface load failed");
            }
        }));
    }

    // -- Surface queries ------------------------------------------------------

    /// Run `java_script` in the surface and return its serialized result.
    ///
    /// The surface is touched only on the UI context; this future just waits
    /// for the completion. A missing result comes back as `""`.
    pub async fn evaluate_script(&self, java_script: &str) -> Result<String> {
        let surface = self
            .current_surface()
            .ok_or(CanvasError::NoSurfaceAttached)?;
        let (tx, rx) = oneshot::channel::<Result<String>>();
        let completion = Completion::new(tx);
        let java_script = java_script.to_string();

        debug!(len = java_script.len(), "evaluating script");
        self.executor.dispatch(Box::new(move || {
            let on_result = completion.clone();
            let started = surface.evaluate_script(
                &java_script,
                Box::new(move |result| on_result.complete(Ok(result.unwrap_or_default()))),
            );
            if let Err(e) = started {
                completion.complete(Err(e));
            }
        }));

        rx.await
            .map_err(|_| CanvasError::Bridge("ui task dropped".into()))?
    }

    /// Capture the surface as base64 PNG, downscaled to `max_width` when the
    /// capture is wider than that.
    pub async fn capture_snapshot(&self, max_width: Option<u32>) -> Result<String> {
        let surface = self
            .current_surface()
            .ok_or(CanvasError::NoSurfaceAttached)?;
        let filter = self.snapshot_filter;
        let (tx, rx) = oneshot::channel::<Result<String>>();

        debug!(?max_width, "capturing snapshot");
        self.executor.dispatch(Box::new(move || {
            let encoded = Snapshot::capture(surface.as_ref())
                .and_then(|snap| snap.fit_width(max_width, filter).to_base64_png());
            let _ = tx.send(encoded);
        }));

        rx.await
            .map_err(|_| CanvasError::Bridge("ui task dropped".into()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use std::sync::mpsc;
    use webcanvas_bridge::executor::{PumpedQueue, WorkerThread};
    use webcanvas_bridge::{HeadlessSurface, UiTask};

    const SCAFFOLD: &str = "file:///scaffold.html";

    fn config() -> CanvasConfig {
        CanvasConfig {
            scaffold_url: SCAFFOLD.into(),
            ..CanvasConfig::default()
        }
    }

    /// Controller whose UI thread is the test thread, so renders run inline.
    fn inline_controller() -> CanvasController {
        let queue = PumpedQueue::new();
        queue.bind_current_thread();
        CanvasController::new(Arc::new(queue), &config())
    }

    fn flush(worker: &WorkerThread) {
        let (tx, rx) = mpsc::channel();
        worker.post(Box::new(move || tx.send(()).expect("send")));
        rx.recv().expect("flush");
    }

    /// Executor that silently discards everything.
    struct Blackhole;

    impl UiExecutor for Blackhole {
        fn is_ui_thread(&self) -> bool {
            false
        }

        fn post(&self, _task: UiTask) {}
    }

    fn png_dims(b64: &str) -> (u32, u32) {
        let png = base64::engine::general_purpose::STANDARD
            .decode(b64)
            .expect("base64");
        let img = image::load_from_memory(&png).expect("png");
        (img.width(), img.height())
    }

    #[test]
    fn starts_in_canvas_mode_detached() {
        let controller = inline_controller();
        assert_eq!(controller.mode(), Mode::Canvas);
        assert_eq!(controller.url(), "");
        assert!(!controller.is_attached());
    }

    #[test]
    fn attach_renders_scaffold() {
        let controller = inline_controller();
        let surface = Arc::new(HeadlessSurface::default());
        controller.attach(surface.clone());
        assert!(controller.is_attached());
        assert_eq!(surface.loaded_urls(), vec![SCAFFOLD]);
    }

    #[test]
    fn blank_navigate_keeps_canvas_mode() {
        let controller = inline_controller();
        controller.navigate("  ");
        assert_eq!(controller.mode(), Mode::Canvas);

        let surface = Arc::new(HeadlessSurface::default());
        controller.attach(surface.clone());
        assert_eq!(surface.loaded_urls(), vec![SCAFFOLD]);
    }

    #[test]
    fn navigate_before_attach_is_applied_on_attach() {
        let controller = inline_controller();
        controller.navigate("http://example.com");
        assert_eq!(controller.mode(), Mode::Web);

        let surface = Arc::new(HeadlessSurface::default());
        controller.attach(surface.clone());
        assert_eq!(surface.loaded_urls(), vec!["http://example.com"]);
        assert_eq!(controller.mode(), Mode::Web);
    }

    #[test]
    fn navigate_trims_before_loading() {
        let controller = inline_controller();
        let surface = Arc::new(HeadlessSurface::default());
        controller.attach(surface.clone());
        controller.navigate("  https://example.org/a  ");
        assert_eq!(controller.url(), "https://example.org/a");
        assert_eq!(surface.current_url().as_deref(), Some("https://example.org/a"));
    }

    #[test]
    fn web_mode_without_url_leaves_page_alone() {
        let controller = inline_controller();
        let surface = Arc::new(HeadlessSurface::default());
        controller.attach(surface.clone());
        controller.set_mode(Mode::Web);
        assert_eq!(controller.mode(), Mode::Web);
        assert_eq!(surface.loaded_urls(), vec![SCAFFOLD]);
    }

    #[test]
    fn blank_navigate_in_web_mode_keeps_previous_page() {
        let controller = inline_controller();
        let surface = Arc::new(HeadlessSurface::default());
        controller.attach(surface.clone());
        controller.navigate("https://a.example");
        controller.navigate("");
        assert_eq!(controller.mode(), Mode::Web);
        assert_eq!(surface.loaded_urls(), vec![SCAFFOLD, "https://a.example"]);
    }

    #[test]
    fn switching_back_to_canvas_reloads_scaffold() {
        let controller = inline_controller();
        let surface = Arc::new(HeadlessSurface::default());
        controller.attach(surface.clone());
        controller.navigate("https://a.example");
        controller.set_mode(Mode::Canvas);
        assert_eq!(surface.current_url().as_deref(), Some(SCAFFOLD));
        // The url survives the mode switch.
        controller.set_mode(Mode::Web);
        assert_eq!(surface.current_url().as_deref(), Some("https://a.example"));
    }

    #[test]
    fn reattach_replaces_surface() {
        let controller = inline_controller();
        let first = Arc::new(HeadlessSurface::default());
        let second = Arc::new(HeadlessSurface::default());
        controller.attach(first.clone());
        controller.attach(second.clone());
        controller.navigate("https://b.example");
        assert_eq!(first.loaded_urls(), vec![SCAFFOLD]);
        assert_eq!(second.loaded_urls(), vec![SCAFFOLD, "https://b.example"]);
    }

    #[test]
    fn renders_are_handed_to_the_worker() {
        let worker = Arc::new(WorkerThread::spawn().expect("spawn"));
        let controller = CanvasController::new(worker.clone(), &config());
        let surface = Arc::new(HeadlessSurface::default());
        controller.attach(surface.clone());
        controller.navigate("https://c.example");
        flush(&worker);
        assert_eq!(surface.loaded_urls(), vec![SCAFFOLD, "https://c.example"]);
    }

    #[tokio::test]
    async fn evaluate_without_surface_fails() {
        let controller = inline_controller();
        let err = controller.evaluate_script("1+1").await.expect_err("no surface");
        assert!(matches!(err, CanvasError::NoSurfaceAttached));
    }

    #[tokio::test]
    async fn snapshot_without_surface_fails() {
        let controller = inline_controller();
        let err = controller.capture_snapshot(None).await.expect_err("no surface");
        assert!(matches!(err, CanvasError::NoSurfaceAttached));
    }

    #[tokio::test]
    async fn evaluate_null_result_is_empty_string() {
        let controller = inline_controller();
        controller.attach(Arc::new(HeadlessSurface::default()));
        assert_eq!(controller.evaluate_script("void 0").await.expect("eval"), "");
    }

    #[tokio::test]
    async fn evaluate_runs_on_worker_thread() {
        let worker = Arc::new(WorkerThread::spawn().expect("spawn"));
        let controller = CanvasController::new(worker, &config());
        let surface = Arc::new(HeadlessSurface::default());
        surface.set_script_responder(Arc::new(|_: &str| {
            std::thread::current().name().map(|name| format!("\"{name}\""))
        }));
        controller.attach(surface.clone());

        let result = controller.evaluate_script("whoami()").await.expect("eval");
        assert_eq!(result, "\"webcanvas-ui\"");
        assert_eq!(surface.evaluated_scripts(), vec!["whoami()"]);
    }

    #[tokio::test]
    async fn dropped_task_surfaces_bridge_error() {
        let controller = CanvasController::new(Arc::new(Blackhole), &config());
        controller.attach(Arc::new(HeadlessSurface::default()));
        let err = controller.evaluate_script("1").await.expect_err("dropped");
        assert!(matches!(err, CanvasError::Bridge(_)));
    }

    #[tokio::test]
    async fn snapshot_respects_max_width() {
        let controller = inline_controller();
        controller.attach(Arc::new(HeadlessSurface::new(200, 100)));

        let full = controller.capture_snapshot(None).await.expect("snapshot");
        let scaled = controller.capture_snapshot(Some(50)).await.expect("snapshot");
        let wider = controller.capture_snapshot(Some(500)).await.expect("snapshot");

        assert_eq!(png_dims(&full), (200, 100));
        assert_eq!(png_dims(&scaled), (50, 25));
        assert_eq!(png_dims(&wider), (200, 100));
    }

    #[tokio::test]
    async fn snapshot_follows_layout_changes() {
        let controller = inline_controller();
        let surface = Arc::new(HeadlessSurface::new(120, 60));
        controller.attach(surface.clone());
        let before = controller.capture_snapshot(None).await.expect("snapshot");

        surface.set_layout_size(80, 160);
        let after = controller.capture_snapshot(Some(40)).await.expect("snapshot");

        assert_eq!(png_dims(&before), (120, 60));
        assert_eq!(png_dims(&after), (40, 80));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_controller() {
        let worker = Arc::new(WorkerThread::spawn().expect("spawn"));
        let controller = Arc::new(CanvasController::new(worker.clone(), &config()));
        let surface = Arc::new(HeadlessSurface::new(32, 16));
        surface.set_script_responder(Arc::new(|js: &str| Some(js.len().to_string())));
        controller.attach(surface.clone());

        let urls: Vec<String> = (0..8).map(|i| format!("https://host{i}.example")).collect();
        let mut tasks = Vec::new();
        for (i, url) in urls.iter().cloned().enumerate() {
            let controller = Arc::clone(&controller);
            tasks.push(tokio::spawn(async move {
                for round in 0..25 {
                    if (i + round) % 3 == 0 {
                        controller.set_mode(Mode::Canvas);
                    } else {
                        controller.navigate(&url);
                    }
                    let result = controller.evaluate_script("abcd").await.expect("eval");
                    assert_eq!(result, "4");
                    let b64 = controller.capture_snapshot(Some(8)).await.expect("snapshot");
                    assert_eq!(png_dims(&b64), (8, 4));
                }
            }));
        }
        for task in tasks {
            task.await.expect("task completes");
        }
        flush(&worker);

        let loads = surface.loaded_urls();
        assert!(loads.len() > 1);
        for load in &loads {
            assert!(load == SCAFFOLD || urls.contains(load), "unexpected load {load}");
        }
        assert_eq!(surface.evaluated_scripts().len(), 8 * 25);
    }

    #[tokio::test]
    async fn snapshot_on_worker_thread() {
        let worker = Arc::new(WorkerThread::spawn().expect("spawn"));
        let controller = CanvasController::new(worker, &config());
        controller.attach(Arc::new(HeadlessSurface::new(0, 0)));
        let b64 = controller.capture_snapshot(Some(10)).await.expect("snapshot");
        assert_eq!(png_dims(&b64), (1, 1));
    }
}
