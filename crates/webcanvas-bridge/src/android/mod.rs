// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android surface backed by `android.webkit.WebView` via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Every method must run on the Android main
// thread; the host drives a `PumpedQueue` from a main-looper `Handler` so the
// controller's UI tasks land there.
//
// ## Script results
//
// `WebView.evaluateJavascript` reports through a `ValueCallback<String>`,
// which cannot be implemented from native code. The host ships a tiny Java
// class (`SCRIPT_CALLBACK_CLASS`) with a `(long token)` constructor whose
// `onReceiveValue` calls the static native `nativeOnScriptResult(token, value)`
// exported below. Pending completions are parked in a token-keyed table until
// that call arrives.
//
// ## Snapshots
//
// `PixelCopy` does not accept a `WebView`, so capture draws the view into an
// ARGB_8888 `Bitmap` through a `Canvas` and copies the pixels out.

#![cfg(target_os = "android")]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use image::RgbaImage;
use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::jlong;
use jni::{AttachGuard, JNIEnv, JavaVM};

use webcanvas_core::error::{CanvasError, Result};

use crate::traits::{ScriptCallback, Surface};

/// Host-provided `ValueCallback<String>` implementation.
pub const SCRIPT_CALLBACK_CLASS: &str = "dev/webcanvas/ScriptCallback";

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// Obtain the process-wide [`JavaVM`] registered by the NDK glue.
fn java_vm() -> Result<JavaVM> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is guaranteed valid for the lifetime of the process.
    unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| CanvasError::Bridge(format!("failed to obtain JavaVM: {e}")))
}

/// Convenience: map any `jni::errors::Error` into `CanvasError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> CanvasError {
    CanvasError::Bridge(format!("{context}: {e}"))
}

// ---------------------------------------------------------------------------
// Pending script completions
// ---------------------------------------------------------------------------

static NEXT_TOKEN: AtomicI64 = AtomicI64::new(1);

fn pending() -> MutexGuard<'static, HashMap<jlong, ScriptCallback>> {
    static PENDING: OnceLock<Mutex<HashMap<jlong, ScriptCallback>>> = OnceLock::new();
    PENDING
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn park(done: ScriptCallback) -> jlong {
    let token = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
    pending().insert(token, done);
    token
}

/// Called by the host's `ScriptCallback.onReceiveValue`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_webcanvas_ScriptCallback_nativeOnScriptResult(
    mut env: JNIEnv,
    _class: JClass,
    token: jlong,
    value: JString,
) {
    let result = if value.is_null() {
        None
    } else {
        match env.get_string(&value) {
            Ok(s) => Some(String::from(s)),
            Err(e) => {
                tracing::warn!(token, error = %e, "unreadable script result");
                None
            }
        }
    };

    // Release the table lock before running the completion.
    let done = pending().remove(&token);
    match done {
        Some(done) => done(result),
        None => tracing::warn!(token, "script result for unknown token"),
    }
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// An Android `WebView` held through global references.
pub struct AndroidWebView {
    vm: JavaVM,
    view: GlobalRef,
    callback_class: GlobalRef,
}

impl AndroidWebView {
    /// Wrap `web_view`. Must be called on the main thread so the host's
    /// callback class resolves through the application class loader.
    pub fn new(web_view: &JObject) -> Result<Self> {
        let vm = java_vm()?;
        let (view, callback_class) = {
            let mut env = vm
                .attach_current_thread()
                .map_err(|e| jni_err("attach_current_thread", e))?;
            let view = env
                .new_global_ref(web_view)
                .map_err(|e| jni_err("new_global_ref(webView)", e))?;
            let class = env
                .find_class(SCRIPT_CALLBACK_CLASS)
                .map_err(|e| jni_err("find_class(ScriptCallback)", e))?;
            let callback_class = env
                .new_global_ref(class)
                .map_err(|e| jni_err("new_global_ref(ScriptCallback)", e))?;
            (view, callback_class)
        };
        tracing::info!("Android: WebView surface wrapped");
        Ok(Self {
            vm,
            view,
            callback_class,
        })
    }

    fn env(&self) -> Result<AttachGuard<'_>> {
        self.vm
            .attach_current_thread()
            .map_err(|e| jni_err("attach_current_thread", e))
    }

    fn view_dimension(&self, getter: &str) -> Result<u32> {
        let mut env = self.env()?;
        let value = env
            .call_method(&self.view, getter, "()I", &[])
            .map_err(|e| jni_err(getter, e))?
            .i()
            .map_err(|e| jni_err(getter, e))?;
        Ok(value.max(0) as u32)
    }
}

impl Surface for AndroidWebView {
    fn platform_name(&self) -> &str {
        "Android WebView"
    }

    fn load_url(&self, url: &str) -> Result<()> {
        let mut env = self.env()?;
        tracing::info!(url, "Android: WebView.loadUrl");
        let j_url: JString = env
            .new_string(url)
            .map_err(|e| jni_err("new_string(url)", e))?;
        env.call_method(
            &self.view,
            "loadUrl",
            "(Ljava/lang/String;)V",
            &[JValue::Object(&j_url)],
        )
        .map_err(|e| jni_err("WebView.loadUrl", e))?;
        Ok(())
    }

    fn evaluate_script(&self, java_script: &str, done: ScriptCallback) -> Result<()> {
        let mut env = self.env()?;
        let token = park(done);

        let outcome = (|| -> Result<()> {
            let j_script: JString = env
                .new_string(java_script)
                .map_err(|e| jni_err("new_string(script)", e))?;
            let class = <&JClass>::from(self.callback_class.as_obj());
            let callback = env
                .new_object(class, "(J)V", &[JValue::Long(token)])
                .map_err(|e| jni_err("new ScriptCallback", e))?;
            env.call_method(
                &self.view,
                "evaluateJavascript",
                "(Ljava/lang/String;Landroid/webkit/ValueCallback;)V",
                &[JValue::Object(&j_script), JValue::Object(&callback)],
            )
            .map_err(|e| jni_err("WebView.evaluateJavascript", e))?;
            Ok(())
        })();

        if outcome.is_err() {
            pending().remove(&token);
        }
        outcome
    }

    fn layout_size(&self) -> (u32, u32) {
        match (self.view_dimension("getWidth"), self.view_dimension("getHeight")) {
            (Ok(width), Ok(height)) => (width, height),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Android: failed to read WebView size");
                (0, 0)
            }
        }
    }

    fn draw(&self, target: &mut RgbaImage) -> Result<()> {
        let (width, height) = target.dimensions();
        let mut env = self.env()?;

        let config = env
            .get_static_field(
                "android/graphics/Bitmap$Config",
                "ARGB_8888",
                "Landroid/graphics/Bitmap$Config;",
            )
            .map_err(|e| jni_err("Bitmap.Config.ARGB_8888", e))?
            .l()
            .map_err(|e| jni_err("ARGB_8888->l", e))?;

        let bitmap = env
            .call_static_method(
                "android/graphics/Bitmap",
                "createBitmap",
                "(IILandroid/graphics/Bitmap$Config;)Landroid/graphics/Bitmap;",
                &[
                    JValue::Int(width as i32),
                    JValue::Int(height as i32),
                    JValue::Object(&config),
                ],
            )
            .map_err(|e| jni_err("Bitmap.createBitmap", e))?
            .l()
            .map_err(|e| jni_err("createBitmap->l", e))?;

        let canvas = env
            .new_object(
                "android/graphics/Canvas",
                "(Landroid/graphics/Bitmap;)V",
                &[JValue::Object(&bitmap)],
            )
            .map_err(|e| jni_err("new Canvas", e))?;

        env.call_method(
            &self.view,
            "draw",
            "(Landroid/graphics/Canvas;)V",
            &[JValue::Object(&canvas)],
        )
        .map_err(|e| jni_err("WebView.draw", e))?;

        // ARGB_8888 is laid out R, G, B, A in memory, which is exactly RGBA8.
        let len = target.as_raw().len();
        let array = env
            .new_byte_array(len as i32)
            .map_err(|e| jni_err("new_byte_array", e))?;
        let buffer = env
            .call_static_method(
                "java/nio/ByteBuffer",
                "wrap",
                "([B)Ljava/nio/ByteBuffer;",
                &[JValue::Object(&array)],
            )
            .map_err(|e| jni_err("ByteBuffer.wrap", e))?
            .l()
            .map_err(|e| jni_err("ByteBuffer.wrap->l", e))?;
        env.call_method(
            &bitmap,
            "copyPixelsToBuffer",
            "(Ljava/nio/Buffer;)V",
            &[JValue::Object(&buffer)],
        )
        .map_err(|e| jni_err("Bitmap.copyPixelsToBuffer", e))?;
        env.call_method(&bitmap, "recycle", "()V", &[])
            .map_err(|e| jni_err("Bitmap.recycle", e))?;

        let pixels = env
            .convert_byte_array(&array)
            .map_err(|e| jni_err("convert_byte_array", e))?;
        if pixels.len() != len {
            return Err(CanvasError::Bridge(format!(
                "bitmap copy returned {} bytes, expected {len}",
                pixels.len()
            )));
        }
        target.copy_from_slice(&pixels);

        tracing::debug!(width, height, "Android: WebView drawn into bitmap");
        Ok(())
    }
}
