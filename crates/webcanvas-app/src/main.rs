// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// webcanvas — headless canvas host.
//
// Entry point. Initialises logging and configuration, attaches a headless
// surface to a canvas controller, and serves `canvas.*` commands line by line
// from stdin. Replies go to stdout; logs go to stderr.

mod session;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use webcanvas_bridge::{HeadlessSurface, WorkerThread};
use webcanvas_canvas::CanvasController;
use webcanvas_core::config::{CanvasConfig, data_dir};

use session::HostIdentity;

#[tokio::main]
async fn main() {
    let dir = data_dir();
    let config = CanvasConfig::load(&dir);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!(data_dir = %dir.display(), "webcanvas starting");

    let executor = match WorkerThread::spawn() {
        Ok(worker) => Arc::new(worker),
        Err(e) => {
            tracing::error!(error = %e, "failed to start ui thread");
            std::process::exit(1);
        }
    };

    let controller = CanvasController::new(executor, &config);
    controller.attach(Arc::new(HeadlessSurface::default()));
    let identity = HostIdentity::from_env();

    if let Err(e) = serve(&controller, &identity).await {
        tracing::error!(error = %e, "stdio closed with error");
        std::process::exit(1);
    }

    tracing::info!("webcanvas stopped");
}

async fn serve(controller: &CanvasController, identity: &HostIdentity) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let Some(reply) = session::serve_line(controller, identity, &line).await else {
            continue;
        };
        let mut out = reply.to_string();
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(())
}
